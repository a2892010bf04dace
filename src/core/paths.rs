//! Brick root and input-entry path handling.

use std::path::{Component, Path, PathBuf};

use crate::core::errors::{PurgeError, Result};

/// Validate a brick root and strip trailing separators.
///
/// The root must be absolute and name an existing directory. `/` itself is
/// left as-is.
pub fn normalize_root(raw: &str) -> Result<PathBuf> {
    let trimmed = raw.trim();
    let stripped = trimmed.trim_end_matches('/');
    let root = if stripped.is_empty() && trimmed.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::from(stripped)
    };

    if !root.is_absolute() {
        return Err(PurgeError::InvalidBrickRoot {
            path: root,
            reason: "brick path must be absolute".to_string(),
        });
    }

    match root.metadata() {
        Ok(meta) if meta.is_dir() => Ok(root),
        Ok(_) => Err(PurgeError::InvalidBrickRoot {
            path: root,
            reason: "not a directory".to_string(),
        }),
        Err(source) => Err(PurgeError::io(&root, source)),
    }
}

/// Turn one line of the input list into an absolute path under `root`.
///
/// Returns `Ok(None)` for blank lines. Leading separators and `.` components
/// are dropped so the entry stays relative to the root. Entries that climb
/// out of the root or reach into the GFID link store are refused.
pub fn resolve_entry(root: &Path, metadata_dir: &str, raw: &str) -> Result<Option<PathBuf>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut relative = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                return Err(PurgeError::UnsafeEntry {
                    entry: trimmed.to_string(),
                    reason: "entry escapes the brick root".to_string(),
                });
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(PurgeError::UnsafeEntry {
            entry: trimmed.to_string(),
            reason: "entry names the brick root itself".to_string(),
        });
    }

    if relative
        .components()
        .next()
        .is_some_and(|first| first.as_os_str() == metadata_dir)
    {
        return Err(PurgeError::UnsafeEntry {
            entry: trimmed.to_string(),
            reason: format!("entry points into the {metadata_dir} link store"),
        });
    }

    Ok(Some(root.join(relative)))
}
