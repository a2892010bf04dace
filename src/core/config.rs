//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{PurgeError, Result};

/// Extended attribute holding an entry's GFID on a brick.
pub const DEFAULT_GFID_XATTR: &str = "trusted.gfid";

/// Directory under the brick root that holds GFID-keyed links.
pub const DEFAULT_METADATA_DIR: &str = ".glusterfs";

/// Full brick-purge configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub purge: PurgeSettings,
    pub logging: LoggingConfig,
}

/// Purge behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PurgeSettings {
    /// Attribute name the GFID is read from.
    pub gfid_xattr: String,
    /// Name of the GFID link store directly under the brick root.
    pub metadata_dir: String,
    pub dry_run: bool,
    pub debug: bool,
}

/// Audit-trail settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append every purge action to this JSONL file when set.
    pub jsonl_log: Option<PathBuf>,
}

impl Default for PurgeSettings {
    fn default() -> Self {
        Self {
            gfid_xattr: DEFAULT_GFID_XATTR.to_string(),
            metadata_dir: DEFAULT_METADATA_DIR.to_string(),
            dry_run: false,
            debug: false,
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathBuf::from("/etc/brick-purge/config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| PurgeError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(PurgeError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("BRICK_PURGE_GFID_XATTR") {
            self.purge.gfid_xattr = raw;
        }
        if let Some(raw) = lookup("BRICK_PURGE_METADATA_DIR") {
            self.purge.metadata_dir = raw;
        }
        if let Some(raw) = lookup("BRICK_PURGE_DRY_RUN") {
            self.purge.dry_run = parse_env_bool("BRICK_PURGE_DRY_RUN", &raw)?;
        }
        if let Some(raw) = lookup("BRICK_PURGE_DEBUG") {
            self.purge.debug = parse_env_bool("BRICK_PURGE_DEBUG", &raw)?;
        }
        if let Some(raw) = lookup("BRICK_PURGE_JSONL_LOG") {
            self.logging.jsonl_log = Some(PathBuf::from(raw));
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let attr = self.purge.gfid_xattr.trim();
        if attr.is_empty() || !attr.contains('.') {
            return Err(PurgeError::InvalidConfig {
                details: format!(
                    "purge.gfid_xattr must be a namespaced attribute name, got {:?}",
                    self.purge.gfid_xattr
                ),
            });
        }

        // The link store must be a single name directly under the brick root.
        let mut components = Path::new(&self.purge.metadata_dir).components();
        let single_normal = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if !single_normal {
            return Err(PurgeError::InvalidConfig {
                details: format!(
                    "purge.metadata_dir must be a single directory name, got {:?}",
                    self.purge.metadata_dir
                ),
            });
        }

        if let Some(log) = &self.logging.jsonl_log {
            if log.as_os_str().is_empty() {
                return Err(PurgeError::InvalidConfig {
                    details: "logging.jsonl_log must not be empty when set".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim()
        .parse::<bool>()
        .map_err(|error| PurgeError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
