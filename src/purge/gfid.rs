//! GFID values and the `.glusterfs` link path they map to.
//!
//! Every tracked entry on a brick has a 16-byte GFID. The brick keeps a
//! second name for each entry under `<root>/.glusterfs`, sharded by the first
//! two bytes of the GFID:
//!
//! ```text
//! <root>/.glusterfs/01/23/01234567-89ab-cdef-0123-456789abcdef
//! ```
//!
//! For files that name is a hardlink, for directories a symlink.

#![allow(missing_docs)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A 128-bit GlusterFS entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gfid([u8; 16]);

/// Reason a hex string could not be parsed as a GFID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GfidParseError {
    Length(usize),
    NonHex(char),
}

impl fmt::Display for GfidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(len) => write!(f, "expected 32 hex digits, got {len}"),
            Self::NonHex(c) => write!(f, "invalid hex digit {c:?}"),
        }
    }
}

impl std::error::Error for GfidParseError {}

impl Gfid {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Build from a raw attribute value. Returns `None` unless it is exactly 16 bytes.
    #[must_use]
    pub fn from_slice(raw: &[u8]) -> Option<Self> {
        <[u8; 16]>::try_from(raw).ok().map(Self)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase, unhyphenated 32-character hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        use fmt::Write as _;
        let mut out = String::with_capacity(32);
        for byte in self.0 {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// Location of this GFID's link inside `<root>/<metadata_dir>`.
    ///
    /// `<root>/<metadata_dir>/<hex[0..2]>/<hex[2..4]>/<8-4-4-4-12 form>`.
    #[must_use]
    pub fn link_path(&self, root: &Path, metadata_dir: &str) -> PathBuf {
        let hex = self.to_hex();
        let mut path = root.join(metadata_dir);
        path.push(&hex[0..2]);
        path.push(&hex[2..4]);
        path.push(canonical_form(&hex));
        path
    }
}

impl fmt::Display for Gfid {
    /// Canonical 8-4-4-4-12 form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical_form(&self.to_hex()))
    }
}

impl FromStr for Gfid {
    type Err = GfidParseError;

    /// Accepts both the bare 32-digit form and the hyphenated canonical form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<char> = s.chars().filter(|c| *c != '-').collect();
        if digits.len() != 32 {
            return Err(GfidParseError::Length(digits.len()));
        }
        let mut bytes = [0_u8; 16];
        for (i, pair) in digits.chunks(2).enumerate() {
            let hi = pair[0].to_digit(16).ok_or(GfidParseError::NonHex(pair[0]))?;
            let lo = pair[1].to_digit(16).ok_or(GfidParseError::NonHex(pair[1]))?;
            #[allow(clippy::cast_possible_truncation)]
            {
                bytes[i] = (hi * 16 + lo) as u8;
            }
        }
        Ok(Self(bytes))
    }
}

/// Derive the link path for a GFID given as hex. No filesystem access.
pub fn gfid_link_path(
    root: &Path,
    metadata_dir: &str,
    gfid_hex: &str,
) -> Result<PathBuf, GfidParseError> {
    let gfid: Gfid = gfid_hex.parse()?;
    Ok(gfid.link_path(root, metadata_dir))
}

fn canonical_form(hex: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    )
}
