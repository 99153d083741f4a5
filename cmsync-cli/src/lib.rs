//! cmsync CLI (made by FontLab https://www.fontlab.com/)

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use cmsync_core::discovery::{parse_extension_list, DEFAULT_EXTENSION, DEFAULT_SOURCE_DIR};
use cmsync_core::output::{write_json_pretty, write_rendered};
use cmsync_core::sync::{plan, synchronize, SyncOptions, DEFAULT_BUILD_FILE};

/// CLI entrypoint for cmsync.
#[derive(Debug, Parser)]
#[command(
    name = "cmsync",
    about = "Regenerate the CMakeLists.txt source list from the tree (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// Working directory; its name becomes the project name
    #[arg(short = 'C', long = "directory", value_hint = ValueHint::DirPath)]
    directory: Option<PathBuf>,

    /// Build file to rewrite, relative to the working directory
    #[arg(short = 'b', long = "build-file", default_value = DEFAULT_BUILD_FILE, value_hint = ValueHint::FilePath)]
    build_file: PathBuf,

    /// Directory scanned for sources, relative to the working directory
    #[arg(short = 's', long = "source-dir", default_value = DEFAULT_SOURCE_DIR, value_hint = ValueHint::DirPath)]
    source_dir: PathBuf,

    /// Source file extensions to list
    #[arg(
        short = 'e',
        long = "ext",
        value_delimiter = ',',
        default_value = DEFAULT_EXTENSION,
        value_hint = ValueHint::Other
    )]
    extensions: Vec<String>,

    /// Follow symlinked directories while walking sources
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue)]
    follow_symlinks: bool,

    /// Include dot-prefixed files and directories
    #[arg(long = "include-hidden", action = ArgAction::SetTrue)]
    include_hidden: bool,

    /// Print the rewritten build file instead of writing it
    #[arg(long = "dry-run", action = ArgAction::SetTrue, conflicts_with_all = ["check", "json"])]
    dry_run: bool,

    /// Fail when the build file is out of date; never writes
    #[arg(long = "check", action = ArgAction::SetTrue)]
    check: bool,

    /// Emit a JSON report instead of progress lines
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,

    /// Log debug diagnostics to stderr
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Parse CLI args and execute the synchronization.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    execute(&cli, &mut handle)
}

fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();
    if verbose {
        filter = filter.add_directive(Level::DEBUG.into());
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .try_init()
        .ok();
}

fn execute(cli: &Cli, mut out: impl Write) -> Result<()> {
    let opts = build_options(cli)?;
    debug!(root = %opts.root.display(), "resolved options");

    if cli.dry_run {
        let plan = plan(&opts)?;
        return write_rendered(&plan.updated, &mut out);
    }

    if cli.check {
        let plan = plan(&opts)?;
        if cli.json {
            write_json_pretty(&plan.report(false), &mut out)?;
        } else if plan.is_up_to_date() {
            writeln!(out, "{} is up to date", opts.build_file.display())?;
        }

        if !plan.is_up_to_date() {
            return Err(anyhow!("{} is out of date", plan.build_file.display()));
        }
        return Ok(());
    }

    if cli.json {
        let report = synchronize(&opts, io::sink())?;
        write_json_pretty(&report, &mut out)
    } else {
        synchronize(&opts, &mut out)?;
        Ok(())
    }
}

fn build_options(cli: &Cli) -> Result<SyncOptions> {
    let root = match &cli.directory {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(anyhow!("working directory does not exist: {}", dir.display()));
            }
            dir.clone()
        }
        None => env::current_dir().context("reading current directory")?,
    };

    let extensions = parse_extension_list(&cli.extensions)?;

    Ok(SyncOptions::new(root)
        .with_build_file(&cli.build_file)
        .with_source_dir(&cli.source_dir)
        .with_extensions(extensions)
        .follow_symlinks(cli.follow_symlinks)
        .include_hidden(cli.include_hidden))
}
