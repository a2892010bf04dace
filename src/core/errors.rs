//! BP-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, PurgeError>;

/// Top-level error type for brick purging.
#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("[BP-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[BP-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[BP-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[BP-2001] invalid brick root {path}: {reason}")]
    InvalidBrickRoot { path: PathBuf, reason: String },

    #[error("[BP-2002] refusing unsafe entry {entry:?}: {reason}")]
    UnsafeEntry { entry: String, reason: String },

    #[error("[BP-3001] directory {path} has no readable {attribute} attribute ({reason})")]
    MissingDirectoryGfid {
        path: PathBuf,
        attribute: String,
        reason: &'static str,
    },

    #[error("[BP-3002] {attribute} on {path} is {len} bytes, expected 16")]
    MalformedGfid {
        path: PathBuf,
        attribute: String,
        len: usize,
    },

    #[error("[BP-4001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[BP-4002] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },
}

impl PurgeError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "BP-1001",
            Self::MissingConfig { .. } => "BP-1002",
            Self::ConfigParse { .. } => "BP-1003",
            Self::InvalidBrickRoot { .. } => "BP-2001",
            Self::UnsafeEntry { .. } => "BP-2002",
            Self::MissingDirectoryGfid { .. } => "BP-3001",
            Self::MalformedGfid { .. } => "BP-3002",
            Self::Io { .. } => "BP-4001",
            Self::Serialization { .. } => "BP-4002",
        }
    }

    /// Whether re-running the purge might resolve the failure.
    ///
    /// Every removal step is guarded by an existence check, so a second run
    /// after a transient IO failure picks up where the first one stopped.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for PurgeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for PurgeError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
