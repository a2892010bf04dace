//! Top-level CLI definition and dispatch.

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::{Colorize, control};
use thiserror::Error;

use brick_purge::core::config::Config;
use brick_purge::core::errors::PurgeError;
use brick_purge::core::paths::normalize_root;
use brick_purge::logger::jsonl::JsonlWriter;
use brick_purge::purge::brick::LocalBrick;
use brick_purge::purge::purger::{PurgeConfig, Purger};
use brick_purge::purge::report::{PurgeSummary, StdoutReporter};

/// Purge files and directories from a GlusterFS backend brick (along with their .glusterfs links).
#[derive(Debug, Parser)]
#[command(name = "brick-purge", author, version, long_about = None)]
pub struct Cli {
    /// Path to brick.
    #[arg(short = 'b', long, value_name = "PATH")]
    brick_path: String,
    /// Path to input file, one entry relative to the brick per line ("-" for stdin).
    #[arg(short = 'i', long, value_name = "PATH")]
    input_file: PathBuf,
    /// Print debug messages.
    #[arg(short = 'd', long)]
    debug: bool,
    /// Don't actually delete anything.
    #[arg(short = 'n', long)]
    dry_run: bool,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input list could not be read.
    #[error("failed to read input list {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The purge itself failed.
    #[error(transparent)]
    Purge(#[from] PurgeError),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Input { .. } => 1,
            Self::Purge(err) => match err {
                PurgeError::InvalidConfig { .. }
                | PurgeError::MissingConfig { .. }
                | PurgeError::ConfigParse { .. }
                | PurgeError::InvalidBrickRoot { .. }
                | PurgeError::UnsafeEntry { .. } => 1,
                PurgeError::Serialization { .. } => 3,
                PurgeError::MissingDirectoryGfid { .. }
                | PurgeError::MalformedGfid { .. }
                | PurgeError::Io { .. } => 2,
            },
            Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

/// Print an error to stderr, with a hint when re-running could help.
pub fn report_error(err: &CliError) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}: {err}", "brick-purge".red().bold());
    if let CliError::Purge(purge) = err {
        if purge.is_retryable() {
            let _ = writeln!(
                stderr,
                "{}",
                "hint: re-running is safe, entries already removed are skipped".yellow()
            );
        }
    }
}

pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color || !io::stderr().is_terminal() {
        control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    let root = normalize_root(&cli.brick_path)?;
    let entries = read_entries(&cli.input_file)?;

    let purge_config = PurgeConfig::from_settings(root, &config.purge)
        .with_dry_run(config.purge.dry_run || cli.dry_run)
        .with_debug(config.purge.debug || cli.debug);

    warn_if_unprivileged(&purge_config);

    let mut purger = Purger::new(purge_config, LocalBrick::new(), StdoutReporter);
    if let Some(path) = &config.logging.jsonl_log {
        purger = purger.with_audit(JsonlWriter::open(path));
    }

    let summary = purger.run(&entries)?;
    emit_summary(cli, &summary)
}

fn read_entries(path: &Path) -> Result<Vec<String>, CliError> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Input {
                path: path.to_path_buf(),
                source,
            })?;
        buf
    } else {
        fs::read_to_string(path).map_err(|source| CliError::Input {
            path: path.to_path_buf(),
            source,
        })?
    };
    // str::lines strips both "\n" and "\r\n".
    Ok(raw.lines().map(str::to_string).collect())
}

/// `trusted.*` attributes are invisible to unprivileged users, so every GFID
/// would read as absent and no directory could be purged.
fn warn_if_unprivileged(config: &PurgeConfig) {
    if config.gfid_xattr.starts_with("trusted.") && !nix::unistd::geteuid().is_root() {
        let _ = writeln!(
            io::stderr(),
            "{} not running as root: {} attributes cannot be read",
            "warning:".yellow().bold(),
            config.gfid_xattr
        );
    }
}

fn emit_summary(cli: &Cli, summary: &PurgeSummary) -> Result<(), CliError> {
    if cli.json {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, summary)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let verb = if summary.dry_run {
        "would remove"
    } else {
        "removed"
    };
    let mut stderr = io::stderr().lock();
    writeln!(
        stderr,
        "{} {verb} {} file(s), {} director(ies), {} .glusterfs link(s); {} of {} entries not on this brick",
        "done:".green().bold(),
        summary.files_removed,
        summary.directories_removed,
        summary.links_removed,
        summary.entries_missing,
        summary.entries_requested,
    )?;
    if summary.files_without_gfid > 0 {
        writeln!(
            stderr,
            "{} {} file(s) had no GFID and no link to clean up",
            "note:".cyan(),
            summary.files_without_gfid
        )?;
    }
    Ok(())
}
