//! The purger: removes brick entries together with their `.glusterfs` links.
//!
//! For every input entry the purger classifies the path with `lstat`:
//!
//! - nothing there → skipped (`Does not exist on this brick`)
//! - a real directory → children are removed depth-first, then the directory
//!   itself and its `.glusterfs` symlink
//! - anything else, symlinks included → the file rule: the entry and its
//!   `.glusterfs` hardlink
//!
//! Symlinks are always leaves. A symlink that happens to point at a directory
//! is unlinked, never descended into, so the walk cannot leave the brick.
//!
//! Traversal uses an explicit stack. A directory's removal frame is pushed
//! before its children are scheduled, so it pops only after every descendant
//! has been handled.
//!
//! Every removal is guarded by an existence check, which makes a run safe to
//! repeat: entries that are already gone are skipped silently.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::config::{DEFAULT_GFID_XATTR, DEFAULT_METADATA_DIR, PurgeSettings};
use crate::core::errors::{PurgeError, Result};
use crate::core::paths::resolve_entry;
use crate::logger::jsonl::{EventType, JsonlWriter, LogEntry};
use crate::purge::brick::{BrickFs, EntryKind};
use crate::purge::gfid::Gfid;
use crate::purge::identity::{GfidLookup, lookup_gfid};
use crate::purge::report::{PurgeSummary, Removal, Reporter, removal_line};

/// Immutable settings for one purge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeConfig {
    /// Absolute brick root without trailing separator.
    pub root: PathBuf,
    pub dry_run: bool,
    pub debug: bool,
    pub gfid_xattr: String,
    pub metadata_dir: String,
}

impl PurgeConfig {
    /// Config with the standard GlusterFS attribute and link store names.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            debug: false,
            gfid_xattr: DEFAULT_GFID_XATTR.to_string(),
            metadata_dir: DEFAULT_METADATA_DIR.to_string(),
        }
    }

    #[must_use]
    pub fn from_settings(root: impl Into<PathBuf>, settings: &PurgeSettings) -> Self {
        Self {
            root: root.into(),
            dry_run: settings.dry_run,
            debug: settings.debug,
            gfid_xattr: settings.gfid_xattr.clone(),
            metadata_dir: settings.metadata_dir.clone(),
        }
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// `.glusterfs` link location for `gfid` on this brick.
    #[must_use]
    pub fn link_path(&self, gfid: &Gfid) -> PathBuf {
        gfid.link_path(&self.root, &self.metadata_dir)
    }
}

enum Frame {
    Descend(PathBuf),
    RemoveDir(PathBuf),
}

/// Removes entries and their GFID links from a single brick.
pub struct Purger<F: BrickFs, R: Reporter> {
    config: PurgeConfig,
    fs: F,
    reporter: R,
    audit: Option<JsonlWriter>,
    summary: PurgeSummary,
    /// Dry-run only: paths already reported as removed, treated as absent afterwards.
    simulated: HashSet<PathBuf>,
}

impl<F: BrickFs, R: Reporter> Purger<F, R> {
    pub fn new(config: PurgeConfig, fs: F, reporter: R) -> Self {
        let summary = PurgeSummary {
            dry_run: config.dry_run,
            ..PurgeSummary::default()
        };
        Self {
            config,
            fs,
            reporter,
            audit: None,
            summary,
            simulated: HashSet::new(),
        }
    }

    /// Mirror every action into a JSONL audit log.
    #[must_use]
    pub fn with_audit(mut self, audit: JsonlWriter) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn config(&self) -> &PurgeConfig {
        &self.config
    }

    pub fn summary(&self) -> &PurgeSummary {
        &self.summary
    }

    /// Hand back the filesystem and reporter, e.g. to inspect a test fake.
    pub fn into_parts(self) -> (F, R, PurgeSummary) {
        (self.fs, self.reporter, self.summary)
    }

    /// Purge every entry in order. Stops at the first unrecovered error.
    pub fn run<I, S>(&mut self, entries: I) -> Result<PurgeSummary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.audit_event(
            LogEntry::new(EventType::RunStart, self.config.dry_run)
                .with_details(format!("root={}", self.config.root.display())),
        );

        for (index, raw) in entries.into_iter().enumerate() {
            if let Err(err) = self.purge_line(index + 1, raw.as_ref()) {
                self.audit_event(
                    LogEntry::new(EventType::Error, self.config.dry_run).with_error(&err),
                );
                return Err(err);
            }
        }

        let summary = self.summary;
        let details = serde_json::to_string(&summary)?;
        self.audit_event(
            LogEntry::new(EventType::RunComplete, self.config.dry_run).with_details(details),
        );
        Ok(summary)
    }

    fn purge_line(&mut self, line_no: usize, raw: &str) -> Result<()> {
        let Some(path) = resolve_entry(&self.config.root, &self.config.metadata_dir, raw)? else {
            self.trace(format_args!("Skipping blank entry at line {line_no}"));
            return Ok(());
        };
        self.summary.entries_requested += 1;
        self.purge_path(&path)
    }

    /// Purge one absolute path under the brick root.
    ///
    /// Every directory between the root and `path` must be a real directory.
    /// A symlinked parent would lead the purge outside the brick, so the entry
    /// is refused instead.
    pub fn purge_path(&mut self, path: &Path) -> Result<()> {
        let kind = if self.parents_are_directories(path)? {
            self.probe(path)?
        } else {
            None
        };
        match kind {
            None => {
                self.summary.entries_missing += 1;
                self.trace(format_args!(
                    "Does not exist on this brick: {}",
                    path.display()
                ));
                self.audit_event(
                    LogEntry::new(EventType::EntryMissing, self.config.dry_run).with_path(path),
                );
                Ok(())
            }
            Some(EntryKind::Directory) => {
                self.purge_tree(path)?;
                self.trace(format_args!("Process directory: {}", path.display()));
                self.remove_directory(path)
            }
            Some(EntryKind::File | EntryKind::Symlink) => self.remove_file_entry(path),
        }
    }

    /// `lstat` each ancestor of `path` below the root. `Ok(false)` when one is
    /// missing or not a directory, so `path` cannot exist either.
    fn parents_are_directories(&self, path: &Path) -> Result<bool> {
        let relative = path
            .strip_prefix(&self.config.root)
            .map_err(|_| PurgeError::UnsafeEntry {
                entry: path.display().to_string(),
                reason: "entry is outside the brick root".to_string(),
            })?;
        let Some(parent) = relative.parent() else {
            return Ok(true);
        };

        let mut current = self.config.root.clone();
        for component in parent.components() {
            current.push(component);
            match self.probe(&current)? {
                Some(EntryKind::Directory) => {}
                Some(EntryKind::Symlink) => {
                    return Err(PurgeError::UnsafeEntry {
                        entry: path.display().to_string(),
                        reason: format!("parent {} is a symlink", current.display()),
                    });
                }
                Some(EntryKind::File) | None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Remove everything below `dir`, deepest first. `dir` itself is left in place.
    fn purge_tree(&mut self, dir: &Path) -> Result<()> {
        let mut stack = vec![Frame::Descend(dir.to_path_buf())];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Descend(current) => {
                    self.trace(format_args!("Descend into: {}", current.display()));
                    for child in self.fs.list_children(&current)? {
                        if self.is_simulated(&child.path) {
                            continue;
                        }
                        match child.kind {
                            EntryKind::Directory => {
                                stack.push(Frame::RemoveDir(child.path.clone()));
                                stack.push(Frame::Descend(child.path));
                            }
                            EntryKind::File | EntryKind::Symlink => {
                                self.remove_file_entry(&child.path)?;
                            }
                        }
                    }
                }
                Frame::RemoveDir(current) => {
                    self.trace(format_args!("Process directory: {}", current.display()));
                    self.remove_directory(&current)?;
                }
            }
        }
        Ok(())
    }

    /// Directory rule: the directory, then its `.glusterfs` symlink.
    ///
    /// Directories must carry a GFID. Unlike files, a missing or unsupported
    /// attribute here is an error.
    fn remove_directory(&mut self, dir: &Path) -> Result<()> {
        self.trace(format_args!("Processing directory: {}", dir.display()));
        let gfid = match lookup_gfid(&self.fs, dir, &self.config.gfid_xattr)? {
            GfidLookup::Found(gfid) => gfid,
            other => {
                return Err(PurgeError::MissingDirectoryGfid {
                    path: dir.to_path_buf(),
                    attribute: self.config.gfid_xattr.clone(),
                    reason: other.label(),
                });
            }
        };
        let link = self.config.link_path(&gfid);

        if self.probe(dir)?.is_some() {
            if !self.config.dry_run {
                self.fs.remove_dir(dir)?;
            }
            self.removed(Removal::Directory, dir, Some(&gfid));
        }

        // Directory links are symlinks and usually dangle once the directory
        // is gone, so test the link itself rather than its target.
        if self.probe(&link)? == Some(EntryKind::Symlink) {
            if !self.config.dry_run {
                self.fs.remove_file(&link)?;
            }
            self.removed(Removal::DirectorySymlink, &link, Some(&gfid));
        }
        Ok(())
    }

    /// File rule: the entry, then its `.glusterfs` hardlink if it has a GFID.
    fn remove_file_entry(&mut self, path: &Path) -> Result<()> {
        self.trace(format_args!("Processing file: {}", path.display()));

        let lookup = lookup_gfid(&self.fs, path, &self.config.gfid_xattr)?;
        let GfidLookup::Found(gfid) = lookup else {
            // No GFID means no link to clean up.
            if self.probe(path)?.is_some() {
                if !self.config.dry_run {
                    self.fs.remove_file(path)?;
                }
                self.summary.files_without_gfid += 1;
                self.removed(Removal::File, path, None);
            }
            return Ok(());
        };
        let link = self.config.link_path(&gfid);

        if self.probe(path)?.is_some() {
            if !self.config.dry_run {
                self.fs.remove_file(path)?;
            }
            self.removed(Removal::File, path, Some(&gfid));
        }

        // A sibling hardlink purged earlier may already have taken the link.
        if self.probe(&link)?.is_some() {
            if !self.config.dry_run {
                self.fs.remove_file(&link)?;
            }
            self.removed(Removal::FileHardlink, &link, Some(&gfid));
        }
        Ok(())
    }

    /// `lstat` classification that honors dry-run removals.
    fn probe(&self, path: &Path) -> Result<Option<EntryKind>> {
        if self.is_simulated(path) {
            return Ok(None);
        }
        self.fs.probe(path)
    }

    fn is_simulated(&self, path: &Path) -> bool {
        self.config.dry_run && self.simulated.contains(path)
    }

    fn removed(&mut self, kind: Removal, path: &Path, gfid: Option<&Gfid>) {
        if self.config.dry_run {
            self.simulated.insert(path.to_path_buf());
        }
        self.summary.record(kind);
        let line = removal_line(kind, path, self.config.dry_run);
        self.reporter.line(&line);

        let event = if kind.is_link() {
            EventType::LinkRemoved
        } else {
            EventType::EntryRemoved
        };
        let mut entry = LogEntry::new(event, self.config.dry_run)
            .with_path(path)
            .with_kind(removal_kind_label(kind));
        if let Some(gfid) = gfid {
            entry = entry.with_gfid(gfid.to_string());
        }
        self.audit_event(entry);
    }

    fn trace(&mut self, args: std::fmt::Arguments<'_>) {
        if self.config.debug {
            self.reporter.line(&args.to_string());
        }
    }

    fn audit_event(&mut self, entry: LogEntry) {
        if let Some(audit) = self.audit.as_mut() {
            audit.write_entry(&entry);
        }
    }
}

const fn removal_kind_label(kind: Removal) -> &'static str {
    match kind {
        Removal::File => "file",
        Removal::FileHardlink => "file_hardlink",
        Removal::Directory => "directory",
        Removal::DirectorySymlink => "directory_symlink",
    }
}
