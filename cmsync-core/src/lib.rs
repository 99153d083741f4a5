//! cmsync-core: the quiet bookkeeper of CMake source lists
//!
//! Every C project eventually grows a `CMakeLists.txt` whose file list has
//! drifted away from what actually lives under `src/`. This library walks
//! the tree, takes stock of every compilable file, and rewrites the build
//! file so the two agree again.
//!
//! ## The Three Moves
//!
//! **Discovery**: find every `*.c` file under the source root, at any depth,
//! and line them up in plain lexicographic order.
//!
//! **Rewriting**: rename the `project(...)` declaration after the working
//! directory, drop every stale `target_sources(app PRIVATE ...)` block and
//! append a fresh one at the end of the file.
//!
//! **Writing back**: overwrite the build file in one go.
//!
//! ## A Sample Run
//!
//! ```rust,no_run
//! use cmsync_core::sync::{synchronize, SyncOptions};
//!
//! let root = std::env::current_dir()?;
//! let report = synchronize(&SyncOptions::new(root), std::io::stdout())?;
//!
//! println!("{} files listed for {}", report.files.len(), report.project_name);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## The Cast of Characters
//!
//! - [`discovery::PathDiscovery`]: the walker that finds sources
//! - [`discovery::SourceFileSet`]: the sorted, deduplicated result
//! - [`rewrite::rewrite_build_file`]: the pure text transformation
//! - [`sync::synchronize`]: the whole run, from walk to write
//! - [`sync::SyncReport`]: what happened, for humans or JSON
//!
//! The rewrite is pattern based on purpose: nothing outside the two
//! recognised shapes is ever touched.
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod discovery;
pub mod output;
pub mod rewrite;
pub mod sync;
