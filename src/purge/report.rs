//! Human-readable progress lines and the end-of-run summary.

#![allow(missing_docs)]

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

/// Prefix on every action line while in dry-run mode.
pub const DRY_RUN_PREFIX: &str = "(DRY RUN) ";

/// Sink for progress lines.
pub trait Reporter {
    fn line(&mut self, text: &str);
}

/// Writes each line to stdout.
#[derive(Debug, Default)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn line(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        // A closed stdout must not abort a half-finished purge.
        let _ = writeln!(out, "{text}");
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    pub lines: Vec<String>,
}

impl Reporter for MemoryReporter {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn line(&mut self, text: &str) {
        (**self).line(text);
    }
}

/// What was removed (or would have been).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    File,
    FileHardlink,
    Directory,
    DirectorySymlink,
}

impl Removal {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "Removed file",
            Self::FileHardlink => "Removed file hardlink",
            Self::Directory => "Removed directory",
            Self::DirectorySymlink => "Removed directory symlink",
        }
    }

    /// Whether this removal targets a `.glusterfs` link rather than a primary entry.
    #[must_use]
    pub const fn is_link(self) -> bool {
        matches!(self, Self::FileHardlink | Self::DirectorySymlink)
    }
}

/// Format a removal line, e.g. `(DRY RUN) Removed file: /brick1/a.txt`.
#[must_use]
pub fn removal_line(kind: Removal, path: &Path, dry_run: bool) -> String {
    let prefix = if dry_run { DRY_RUN_PREFIX } else { "" };
    format!("{prefix}{}: {}", kind.label(), path.display())
}

/// Counters for one purge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub dry_run: bool,
    /// Non-blank entries read from the input list.
    pub entries_requested: usize,
    /// Entries that did not exist on this brick.
    pub entries_missing: usize,
    pub files_removed: usize,
    /// Files removed without link cleanup because they had no GFID.
    pub files_without_gfid: usize,
    pub directories_removed: usize,
    pub links_removed: usize,
}

impl PurgeSummary {
    pub(crate) fn record(&mut self, kind: Removal) {
        match kind {
            Removal::File => self.files_removed += 1,
            Removal::Directory => self.directories_removed += 1,
            Removal::FileHardlink | Removal::DirectorySymlink => self.links_removed += 1,
        }
    }

    /// Total objects removed from the brick.
    #[must_use]
    pub const fn total_removed(&self) -> usize {
        self.files_removed + self.directories_removed + self.links_removed
    }
}
