//! Filesystem access to a brick's backing store.
//!
//! [`BrickFs`] is the only way the purger touches the disk. [`LocalBrick`]
//! talks to the real filesystem; tests wrap it to record removals or to
//! supply GFIDs without needing `CAP_SYS_ADMIN` for `trusted.*` attributes.

#![allow(missing_docs)]

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::core::errors::{PurgeError, Result};

/// Type of an entry as seen by `lstat`, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    /// Regular files, hardlinks, and any other non-directory, non-symlink object.
    File,
    /// A symlink, whether or not its target exists.
    Symlink,
}

/// A direct child found while listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Blocking filesystem operations the purger needs.
pub trait BrickFs {
    /// Classify `path` without following a final symlink. `Ok(None)` if nothing is there.
    fn probe(&self, path: &Path) -> Result<Option<EntryKind>>;

    /// Direct children of `dir`, in whatever order the filesystem returns them.
    fn list_children(&self, dir: &Path) -> Result<Vec<ChildEntry>>;

    /// Raw extended attribute value. `Ok(None)` when the attribute is absent.
    ///
    /// Errors are returned unmapped so callers can tell "unsupported" apart
    /// from genuine IO failures.
    fn read_xattr(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Unlink a file, hardlink, or symlink.
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Remove an empty directory. Fails if it still has children.
    fn remove_dir(&self, path: &Path) -> Result<()>;
}

/// [`BrickFs`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBrick;

impl LocalBrick {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl BrickFs for LocalBrick {
    fn probe(&self, path: &Path) -> Result<Option<EntryKind>> {
        match fs::symlink_metadata(path) {
            Ok(meta) => Ok(Some(kind_of(meta.file_type()))),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(PurgeError::io(path, e)),
        }
    }

    fn list_children(&self, dir: &Path) -> Result<Vec<ChildEntry>> {
        let entries = fs::read_dir(dir).map_err(|e| PurgeError::io(dir, e))?;
        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PurgeError::io(dir, e))?;
            let path = entry.path();
            // DirEntry::file_type does not follow symlinks.
            let file_type = entry.file_type().map_err(|e| PurgeError::io(&path, e))?;
            children.push(ChildEntry {
                path,
                kind: kind_of(file_type),
            });
        }
        Ok(children)
    }

    fn read_xattr(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>> {
        // xattr::get uses lgetxattr: a symlink's own attributes, not its target's.
        xattr::get(path, name)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| PurgeError::io(path, e))
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(path).map_err(|e| PurgeError::io(path, e))
    }
}

fn kind_of(file_type: fs::FileType) -> EntryKind {
    if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}

/// A missing path, or one whose parent was already turned into a non-directory.
fn is_absent(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}
