use std::fs;
use std::path::{Path, PathBuf};

use cmsync_core::discovery::SourceFileSet;
use cmsync_core::sync::{plan, synchronize, synchronize_with, SyncOptions, DEFAULT_BUILD_FILE};
use tempfile::TempDir;

fn project(name: &str, build: &str, sources: &[&str]) -> (TempDir, PathBuf) {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join(name);
    fs::create_dir_all(&root).expect("mkdir root");
    fs::write(root.join(DEFAULT_BUILD_FILE), build).expect("write build file");

    for rel in sources {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, b"int x;\n").expect("write source");
    }

    (temp, root)
}

fn build_text(root: &Path) -> String {
    fs::read_to_string(root.join(DEFAULT_BUILD_FILE)).expect("read build file")
}

#[test]
fn firmware_app_scenario() {
    let (_temp, root) = project(
        "firmware-app",
        "cmake_minimum_required(VERSION 3.20)\nproject(old_name)\ntarget_sources(app PRIVATE)\n",
        &["src/main.c", "src/drivers/uart.c"],
    );

    let mut out = Vec::new();
    let report = synchronize(&SyncOptions::new(&root), &mut out).expect("sync");

    assert_eq!(
        build_text(&root),
        "cmake_minimum_required(VERSION 3.20)\n\
         project(firmware-app)\n\
         target_sources(app PRIVATE\n    src/drivers/uart.c\n    src/main.c\n)\n"
    );
    assert_eq!(report.project_name, "firmware-app");
    assert_eq!(report.blocks_removed, 1);
    assert!(report.changed);
    assert!(report.written);

    let progress = String::from_utf8(out).expect("utf8");
    let lines: Vec<&str> = progress.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Project name: firmware-app",
            "Found 2 .c files",
            "CMakeLists.txt update done",
        ]
    );
}

#[test]
fn second_run_is_byte_identical() {
    let (_temp, root) = project(
        "blinky",
        "project(blinky)\n\ntarget_sources(app PRIVATE\n  stale.c\n)\n\nzephyr_library()\n",
        &["src/main.c", "src/a/b/c/deep.c"],
    );

    synchronize(&SyncOptions::new(&root), std::io::sink()).expect("first sync");
    let first = build_text(&root);

    let report = synchronize(&SyncOptions::new(&root), std::io::sink()).expect("second sync");
    let second = build_text(&root);

    assert_eq!(first, second);
    assert!(!report.changed);
}

#[test]
fn empty_tree_produces_empty_block() {
    let (_temp, root) = project("empty", "project(empty)\n", &[]);

    let report = synchronize(&SyncOptions::new(&root), std::io::sink()).expect("sync");

    assert!(report.files.is_empty());
    assert_eq!(
        build_text(&root),
        "project(empty)\ntarget_sources(app PRIVATE\n)\n"
    );
}

#[test]
fn two_blocks_collapse_into_one_at_the_end() {
    let (_temp, root) = project(
        "merge",
        "target_sources(app PRIVATE one.c)\nproject(merge)\nTarget_Sources( app PRIVATE\n two.c )\nadd_definitions(-DX)\n",
        &["src/new.c"],
    );

    let report = synchronize(&SyncOptions::new(&root), std::io::sink()).expect("sync");
    let text = build_text(&root);

    assert_eq!(report.blocks_removed, 2);
    assert!(!text.contains("one.c"));
    assert!(!text.contains("two.c"));
    assert_eq!(text.to_lowercase().matches("target_sources").count(), 1);
    assert!(text.ends_with("target_sources(app PRIVATE\n    src/new.c\n)\n"));
}

#[test]
fn project_name_appears_exactly_once() {
    let (_temp, root) = project("renamed", "project(previous)\nmessage(hello)\n", &[]);

    synchronize(&SyncOptions::new(&root), std::io::sink()).expect("sync");
    let text = build_text(&root);

    assert_eq!(text.matches("project(renamed)").count(), 1);
    assert!(!text.contains("previous"));
}

#[test]
fn missing_project_declaration_is_tolerated() {
    let (_temp, root) = project("noname", "add_executable(app)\n", &["src/x.c"]);

    synchronize(&SyncOptions::new(&root), std::io::sink()).expect("sync");

    assert_eq!(
        build_text(&root),
        "add_executable(app)\ntarget_sources(app PRIVATE\n    src/x.c\n)\n"
    );
}

#[test]
fn missing_build_file_is_an_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let err = synchronize(&SyncOptions::new(temp.path()), std::io::sink())
        .expect_err("missing build file must fail");

    assert!(format!("{err:#}").contains("CMakeLists.txt"));
    assert!(!temp.path().join(DEFAULT_BUILD_FILE).exists());
}

#[test]
fn custom_layout_and_extensions() {
    let (_temp, root) = project(
        "mixed",
        "project(mixed)\n",
        &["lib/core.c", "lib/start.S", "lib/notes.txt", "src/ignored.c"],
    );
    fs::rename(root.join(DEFAULT_BUILD_FILE), root.join("app.cmake")).expect("rename");

    let opts = SyncOptions::new(&root)
        .with_build_file("app.cmake")
        .with_source_dir("lib")
        .with_extensions(vec!["c".into(), "S".into()]);

    let mut out = Vec::new();
    let report = synchronize(&opts, &mut out).expect("sync");

    assert_eq!(report.files.as_slice(), &["lib/core.c".to_string(), "lib/start.S".to_string()]);
    let progress = String::from_utf8(out).expect("utf8");
    assert!(progress.contains("Found 2 .c/.S files"));
    assert!(progress.contains("app.cmake update done"));
}

#[test]
fn injected_discovery_bypasses_the_filesystem_walk() {
    let (_temp, root) = project("virtual", "project(virtual)\n", &["src/real.c"]);
    let fixed = SourceFileSet::new(["gen/b.c", "gen/a.c"]);

    synchronize_with(&fixed, &SyncOptions::new(&root), std::io::sink()).expect("sync");

    assert!(build_text(&root).ends_with("target_sources(app PRIVATE\n    gen/a.c\n    gen/b.c\n)\n"));
}

#[test]
fn plan_reports_up_to_date_after_sync() {
    let (_temp, root) = project("check", "project(check)\n", &["src/m.c"]);
    let opts = SyncOptions::new(&root);

    assert!(!plan(&opts).expect("plan").is_up_to_date());
    synchronize(&opts, std::io::sink()).expect("sync");
    assert!(plan(&opts).expect("plan").is_up_to_date());
}
