//! Source discovery helpers for cmsync-core (made by FontLab https://www.fontlab.com/)

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Default subdirectory scanned for sources.
pub const DEFAULT_SOURCE_DIR: &str = "src";

/// Default extension of compilable files.
pub const DEFAULT_EXTENSION: &str = "c";

/// Sorted, deduplicated list of source paths relative to the working directory.
///
/// Paths always use `/` as the separator so the rendered build file is the
/// same on every platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SourceFileSet {
    files: Vec<String>,
}

impl SourceFileSet {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files: Vec<String> = files.into_iter().map(Into::into).collect();
        files.sort();
        files.dedup();
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.files
    }
}

impl From<Vec<String>> for SourceFileSet {
    fn from(files: Vec<String>) -> Self {
        Self::new(files)
    }
}

impl From<SourceFileSet> for Vec<String> {
    fn from(set: SourceFileSet) -> Self {
        set.files
    }
}

/// Trait for enumerating sources from some backing store (filesystem, fixed list, etc.).
pub trait SourceDiscovery {
    fn discover(&self) -> Result<SourceFileSet>;
}

impl SourceDiscovery for SourceFileSet {
    fn discover(&self) -> Result<SourceFileSet> {
        Ok(self.clone())
    }
}

/// Recursive filesystem walker that collects files with the configured extensions.
#[derive(Debug, Clone)]
pub struct PathDiscovery {
    root: PathBuf,
    source_dir: PathBuf,
    extensions: Vec<String>,
    follow_symlinks: bool,
    include_hidden: bool,
}

impl PathDiscovery {
    /// Walk `root/source_dir`, reporting paths relative to `root`.
    pub fn new(root: impl Into<PathBuf>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source_dir: source_dir.into(),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            follow_symlinks: false,
            include_hidden: false,
        }
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

    fn scan_root(&self) -> PathBuf {
        self.root.join(&self.source_dir)
    }
}

impl SourceDiscovery for PathDiscovery {
    fn discover(&self) -> Result<SourceFileSet> {
        let base = self.scan_root();
        if !base.is_dir() {
            debug!(dir = %base.display(), "source directory missing, listing no files");
            return Ok(SourceFileSet::default());
        }

        let include_hidden = self.include_hidden;
        let walker = WalkDir::new(&base)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(move |entry| include_hidden || entry.depth() == 0 || !is_hidden(entry));

        let mut found = Vec::new();
        for entry in walker {
            let entry = entry.with_context(|| format!("walking {}", base.display()))?;
            if !is_regular_file(&entry) || !has_extension(entry.path(), &self.extensions) {
                continue;
            }

            let rel = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            let rendered = render_relative(rel);
            debug!(path = %rendered, "discovered source");
            found.push(rendered);
        }

        Ok(SourceFileSet::new(found))
    }
}

/// Normalise user-supplied extensions (`c`, `.c`, ` cpp `) into bare suffixes.
pub fn parse_extension_list(raw: &[String]) -> Result<Vec<String>> {
    let mut exts = Vec::with_capacity(raw.len());
    for item in raw {
        let trimmed = item.trim();
        let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if bare.is_empty() {
            return Err(anyhow!("extension must not be empty"));
        }
        if bare.contains(['/', '\\']) {
            return Err(anyhow!("extension must not contain a path separator: {trimmed}"));
        }
        if !exts.iter().any(|e: &String| e == bare) {
            exts.push(bare.to_string());
        }
    }

    if exts.is_empty() {
        exts.push(DEFAULT_EXTENSION.to_string());
    }

    Ok(exts)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

// Symlinked files count even when directory links are not followed.
fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };

    extensions.iter().any(|ext| {
        name.len() > ext.len() + 1
            && name.ends_with(ext.as_str())
            && name[..name.len() - ext.len()].ends_with('.')
    })
}

fn render_relative(path: &Path) -> String {
    let raw = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        raw.into_owned()
    } else {
        raw.replace(MAIN_SEPARATOR, "/")
    }
}
