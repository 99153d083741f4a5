//! Pattern-based rewriting of build-file text (made by FontLab https://www.fontlab.com/)
//!
//! The build file is never parsed. Two shapes are recognised and everything
//! else passes through byte for byte:
//!
//! - the project declaration, `project(<name>)`
//! - the source-list block, `target_sources(app PRIVATE ...)`

use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use tracing::debug;

use crate::discovery::SourceFileSet;

/// Opening line of a generated source-list block.
pub const SOURCE_BLOCK_HEADER: &str = "target_sources(app PRIVATE";

/// Indentation placed before every listed file.
pub const SOURCE_LINE_INDENT: &str = "    ";

// A bare token, or a quoted argument as written by `render_project_declaration`.
const PROJECT_PATTERN: &str =
    r##"\bproject\s*\(\s*(?:"(?:[^"\\]|\\.)*"|[^\s()"#\\;]+)\s*\)"##;

// Stops at the first `)`, so nested parentheses inside a block are not supported.
const SOURCE_BLOCK_PATTERN: &str = r"(?i)\btarget_sources\s*\(\s*app\s+PRIVATE[^)]*\)[ \t]*(?:\r?\n)?";

/// Compiled patterns for the two recognised shapes.
#[derive(Debug, Clone)]
pub struct Rewriter {
    project: Regex,
    source_block: Regex,
}

impl Rewriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            project: Regex::new(PROJECT_PATTERN).context("compiling project pattern")?,
            source_block: Regex::new(SOURCE_BLOCK_PATTERN)
                .context("compiling source block pattern")?,
        })
    }

    /// Rewrite the first `project(<name>)` with `name`; text without one is returned untouched.
    pub fn replace_project_name(&self, text: &str, name: &str) -> String {
        if !self.project.is_match(text) {
            debug!("no project declaration found, leaving name as is");
            return text.to_string();
        }

        let replacement = render_project_declaration(name);
        self.project
            .replacen(text, 1, NoExpand(&replacement))
            .into_owned()
    }

    /// Number of source-list blocks currently present in `text`.
    pub fn count_source_blocks(&self, text: &str) -> usize {
        self.source_block.find_iter(text).count()
    }

    /// Delete every source-list block together with its trailing line break.
    ///
    /// A block ends at the first `)` after its opening keyword. Anything past
    /// that, such as the tail of a generator expression like `$<...:x.c>)`,
    /// stays in the text.
    pub fn strip_source_blocks(&self, text: &str) -> String {
        let removed = self.count_source_blocks(text);
        if removed == 0 {
            return text.to_string();
        }

        debug!(removed, "dropping existing source blocks");
        self.source_block.replace_all(text, "").into_owned()
    }

    /// Full in-memory transformation: rename, strip, normalise, append.
    pub fn rewrite(&self, text: &str, project_name: &str, files: &SourceFileSet) -> String {
        let renamed = self.replace_project_name(text, project_name);
        let mut stripped = self.strip_source_blocks(&renamed);
        ensure_single_trailing_newline(&mut stripped);
        stripped.push_str(&render_source_block(files));
        stripped
    }
}

/// Convenience wrapper compiling a fresh [`Rewriter`] for a single rewrite.
pub fn rewrite_build_file(text: &str, project_name: &str, files: &SourceFileSet) -> Result<String> {
    Ok(Rewriter::new()?.rewrite(text, project_name, files))
}

/// Render `project(<name>)`, quoting names that would not survive as a bare token.
///
/// Names holding whitespace, parentheses, `"`, `#`, `\` or `;` are written as a
/// quoted argument with `"` and `\` escaped, so the project pattern matches
/// exactly what was written on the next run.
pub fn render_project_declaration(name: &str) -> String {
    if !needs_quoting(name) {
        return format!("project({name})");
    }

    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("project(\"{escaped}\")")
}

fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '#' | '\\' | ';'))
}

/// Collapse trailing `\n`s into exactly one (an empty text becomes `"\n"`).
pub fn ensure_single_trailing_newline(text: &mut String) {
    let keep = text.trim_end_matches('\n').len();
    text.truncate(keep);
    text.push('\n');
}

/// Render the block appended at the end of the build file.
pub fn render_source_block(files: &SourceFileSet) -> String {
    let mut block = String::from(SOURCE_BLOCK_HEADER);
    block.push('\n');
    for file in files.iter() {
        block.push_str(SOURCE_LINE_INDENT);
        block.push_str(file);
        block.push('\n');
    }
    block.push_str(")\n");
    block
}
