//! Store configuration

use crate::{ConfigError, TallyError, TallyResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and how large the on-disk configuration store may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the LMDB environment
    pub path: PathBuf,
    /// LMDB map size in megabytes
    pub max_size_mb: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".tally/store"),
            max_size_mb: 16,
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `TALLY_STORE_PATH`: store directory (default: `.tally/store`)
    /// - `TALLY_STORE_MAX_SIZE_MB`: map size in megabytes (default: 16)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            path: std::env::var("TALLY_STORE_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            max_size_mb: std::env::var("TALLY_STORE_MAX_SIZE_MB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_size_mb),
        }
    }

    pub fn validate(&self) -> TallyResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(TallyError::Config(ConfigError::InvalidValue {
                field: "path".to_string(),
                value: String::new(),
                reason: "path must not be empty".to_string(),
            }));
        }

        if self.max_size_mb == 0 {
            return Err(TallyError::Config(ConfigError::InvalidValue {
                field: "max_size_mb".to_string(),
                value: self.max_size_mb.to_string(),
                reason: "max_size_mb must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }

    /// Map size in bytes.
    pub fn map_size(&self) -> usize {
        self.max_size_mb * 1024 * 1024
    }
}
