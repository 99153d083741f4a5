//! Synchronization pipeline (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::discovery::{
    PathDiscovery, SourceDiscovery, SourceFileSet, DEFAULT_EXTENSION, DEFAULT_SOURCE_DIR,
};
use crate::rewrite::Rewriter;

/// Default build-file name, relative to the working directory.
pub const DEFAULT_BUILD_FILE: &str = "CMakeLists.txt";

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Working directory; its last path segment names the project.
    pub root: PathBuf,
    pub build_file: PathBuf,
    pub source_dir: PathBuf,
    pub extensions: Vec<String>,
    pub follow_symlinks: bool,
    pub include_hidden: bool,
}

impl SyncOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            build_file: PathBuf::from(DEFAULT_BUILD_FILE),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            follow_symlinks: false,
            include_hidden: false,
        }
    }

    pub fn with_build_file(mut self, build_file: impl Into<PathBuf>) -> Self {
        self.build_file = build_file.into();
        self
    }

    pub fn with_source_dir(mut self, source_dir: impl Into<PathBuf>) -> Self {
        self.source_dir = source_dir.into();
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn build_file_path(&self) -> PathBuf {
        self.root.join(&self.build_file)
    }

    /// Filesystem discovery configured from these options.
    pub fn discovery(&self) -> PathDiscovery {
        PathDiscovery::new(&self.root, &self.source_dir)
            .with_extensions(self.extensions.clone())
            .follow_symlinks(self.follow_symlinks)
            .include_hidden(self.include_hidden)
    }

    fn extension_label(&self) -> String {
        self.extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Everything computed for a run before the build file is touched.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub project_name: String,
    pub build_file: PathBuf,
    pub files: SourceFileSet,
    pub blocks_removed: usize,
    pub original: String,
    pub updated: String,
}

impl SyncPlan {
    pub fn is_up_to_date(&self) -> bool {
        self.original == self.updated
    }

    /// Overwrite the build file with the rewritten text.
    pub fn apply(&self) -> Result<()> {
        fs::write(&self.build_file, &self.updated)
            .with_context(|| format!("writing build file {}", self.build_file.display()))
    }

    pub fn report(&self, written: bool) -> SyncReport {
        SyncReport {
            project_name: self.project_name.clone(),
            build_file: self.build_file.clone(),
            files: self.files.clone(),
            blocks_removed: self.blocks_removed,
            changed: !self.is_up_to_date(),
            written,
        }
    }
}

/// Outcome of a run, suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub project_name: String,
    pub build_file: PathBuf,
    pub files: SourceFileSet,
    pub blocks_removed: usize,
    pub changed: bool,
    pub written: bool,
}

/// Derive the project name from the final segment of `root`.
pub fn project_name(root: &Path) -> Result<String> {
    if let Some(name) = root.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }

    // `.` and `..` have no file name until resolved.
    let resolved = root
        .canonicalize()
        .with_context(|| format!("resolving working directory {}", root.display()))?;
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("cannot derive a project name from {}", root.display()))
}

/// Compute the rewritten build file using filesystem discovery, without writing it.
pub fn plan(opts: &SyncOptions) -> Result<SyncPlan> {
    plan_with(&opts.discovery(), opts)
}

/// Compute the rewritten build file using any discovery backend, without writing it.
pub fn plan_with(discovery: &impl SourceDiscovery, opts: &SyncOptions) -> Result<SyncPlan> {
    let project_name = project_name(&opts.root)?;
    let files = discovery.discover()?;
    let build_file = opts.build_file_path();
    debug!(project = %project_name, files = files.len(), "planning rewrite");

    let original = fs::read_to_string(&build_file)
        .with_context(|| format!("reading build file {}", build_file.display()))?;

    let rewriter = Rewriter::new()?;
    let blocks_removed = rewriter.count_source_blocks(&original);
    let updated = rewriter.rewrite(&original, &project_name, &files);

    Ok(SyncPlan {
        project_name,
        build_file,
        files,
        blocks_removed,
        original,
        updated,
    })
}

/// Rewrite the build file under `opts.root`, reporting progress to `out`.
pub fn synchronize(opts: &SyncOptions, out: impl Write) -> Result<SyncReport> {
    synchronize_with(&opts.discovery(), opts, out)
}

/// Same as [`synchronize`], with sources supplied by `discovery`.
pub fn synchronize_with(
    discovery: &impl SourceDiscovery,
    opts: &SyncOptions,
    mut out: impl Write,
) -> Result<SyncReport> {
    let plan = plan_with(discovery, opts)?;

    writeln!(out, "Project name: {}", plan.project_name)?;
    writeln!(out, "Found {} {} files", plan.files.len(), opts.extension_label())?;

    plan.apply()?;
    info!(
        file = %plan.build_file.display(),
        changed = !plan.is_up_to_date(),
        "build file rewritten"
    );

    writeln!(out, "{} update done", opts.build_file.display())?;
    Ok(plan.report(true))
}
