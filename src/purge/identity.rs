//! Reading an entry's GFID attribute.

use std::path::Path;

use nix::errno::Errno;

use crate::core::errors::{PurgeError, Result};
use crate::purge::brick::BrickFs;
use crate::purge::gfid::Gfid;

/// Outcome of looking up an entry's GFID.
///
/// `Absent` and `Unsupported` are ordinary outcomes: broken symlinks that
/// point outside the volume and objects created behind GlusterFS's back carry
/// no GFID, and some backends do not store the attribute at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfidLookup {
    /// The attribute was present and 16 bytes long.
    Found(Gfid),
    /// The entry has no such attribute.
    Absent,
    /// The filesystem does not support extended attributes on this entry.
    Unsupported,
}

impl GfidLookup {
    /// Short label used in log lines and error messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::Absent => "absent",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Read and decode the GFID attribute `attribute` on `path`.
///
/// A value of the wrong length and any IO failure other than "unsupported"
/// are returned as errors.
pub fn lookup_gfid(fs: &impl BrickFs, path: &Path, attribute: &str) -> Result<GfidLookup> {
    match fs.read_xattr(path, attribute) {
        Ok(Some(raw)) => Gfid::from_slice(&raw).map(GfidLookup::Found).ok_or_else(|| {
            PurgeError::MalformedGfid {
                path: path.to_path_buf(),
                attribute: attribute.to_string(),
                len: raw.len(),
            }
        }),
        Ok(None) => Ok(GfidLookup::Absent),
        Err(e) if is_unsupported(&e) => Ok(GfidLookup::Unsupported),
        Err(e) if e.raw_os_error() == Some(Errno::ENODATA as i32) => Ok(GfidLookup::Absent),
        Err(e) => Err(PurgeError::io(path, e)),
    }
}

fn is_unsupported(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::Unsupported
        || matches!(
            err.raw_os_error(),
            Some(code) if code == Errno::ENOTSUP as i32 || code == Errno::EOPNOTSUPP as i32
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purge::brick::{ChildEntry, EntryKind};
    use std::io;
    use std::path::PathBuf;

    /// Returns a fixed xattr result for every path.
    struct FixedXattr(fn() -> io::Result<Option<Vec<u8>>>);

    impl BrickFs for FixedXattr {
        fn probe(&self, _path: &Path) -> Result<Option<EntryKind>> {
            Ok(Some(EntryKind::File))
        }
        fn list_children(&self, _dir: &Path) -> Result<Vec<ChildEntry>> {
            Ok(Vec::new())
        }
        fn read_xattr(&self, _path: &Path, _name: &str) -> io::Result<Option<Vec<u8>>> {
            (self.0)()
        }
        fn remove_file(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
        fn remove_dir(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn lookup(fs: &FixedXattr) -> Result<GfidLookup> {
        lookup_gfid(fs, &PathBuf::from("/brick1/f"), "trusted.gfid")
    }

    #[test]
    fn sixteen_bytes_is_found() {
        let fs = FixedXattr(|| Ok(Some(vec![0x11; 16])));
        let GfidLookup::Found(gfid) = lookup(&fs).unwrap() else {
            panic!("expected Found");
        };
        assert_eq!(gfid.to_hex(), "11".repeat(16));
    }

    #[test]
    fn missing_attribute_is_absent() {
        let fs = FixedXattr(|| Ok(None));
        assert_eq!(lookup(&fs).unwrap(), GfidLookup::Absent);

        let fs = FixedXattr(|| Err(io::Error::from_raw_os_error(Errno::ENODATA as i32)));
        assert_eq!(lookup(&fs).unwrap(), GfidLookup::Absent);
    }

    #[test]
    fn enotsup_is_unsupported() {
        let fs = FixedXattr(|| Err(io::Error::from_raw_os_error(Errno::EOPNOTSUPP as i32)));
        assert_eq!(lookup(&fs).unwrap(), GfidLookup::Unsupported);
    }

    #[test]
    fn wrong_length_is_malformed() {
        let fs = FixedXattr(|| Ok(Some(vec![1, 2, 3])));
        let err = lookup(&fs).unwrap_err();
        assert_eq!(err.code(), "BP-3002");
        assert!(err.to_string().contains("3 bytes"));
    }

    #[test]
    fn permission_denied_propagates() {
        let fs = FixedXattr(|| Err(io::Error::from_raw_os_error(Errno::EACCES as i32)));
        let err = lookup(&fs).unwrap_err();
        assert_eq!(err.code(), "BP-4001");
    }
}
