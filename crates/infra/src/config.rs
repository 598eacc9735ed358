//! Configuration loading and representation.
//!
//! Read from environment variables:
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `BOOKSTORE_SNAPSHOT` | `database.json` | snapshot file to hydrate from; empty disables hydration |
//! | `BOOKSTORE_LOG_FORMAT` | `json` | `json` or `pretty` |

use std::path::PathBuf;

use thiserror::Error;

use bookstore_observability::LogFormat;

use crate::snapshot::SnapshotSource;

pub const SNAPSHOT_VAR: &str = "BOOKSTORE_SNAPSHOT";
pub const LOG_FORMAT_VAR: &str = "BOOKSTORE_LOG_FORMAT";
pub const DEFAULT_SNAPSHOT_PATH: &str = "database.json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookstoreConfig {
    pub snapshot: SnapshotSource,
    pub log_format: LogFormat,
}

impl Default for BookstoreConfig {
    fn default() -> Self {
        Self {
            snapshot: SnapshotSource::File(PathBuf::from(DEFAULT_SNAPSHOT_PATH)),
            log_format: LogFormat::Json,
        }
    }
}

impl BookstoreConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(SNAPSHOT_VAR) {
            let path = path.trim();
            config.snapshot = if path.is_empty() {
                SnapshotSource::Empty
            } else {
                SnapshotSource::File(PathBuf::from(path))
            };
        }

        if let Some(format) = lookup(LOG_FORMAT_VAR) {
            config.log_format = format.parse().map_err(|e: bookstore_observability::UnknownLogFormat| {
                ConfigError::Invalid {
                    var: LOG_FORMAT_VAR,
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(config)
    }
}
