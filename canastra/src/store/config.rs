//! Store configuration.
//!
//! Consolidates the environment variables that decide where the snapshot lives.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use super::is_valid_key;
use crate::tournament::constants::DEFAULT_STORAGE_KEY;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Where and under which key the snapshot is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding snapshot files
    pub data_dir: PathBuf,

    /// Snapshot key, also the file stem
    pub storage_key: String,
}

impl StoreConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `CANASTRA_DATA_DIR`: snapshot directory (default: `data`)
    /// - `CANASTRA_STORAGE_KEY`: snapshot key (default: `canastra-tournament`)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but empty, or the key contains
    /// characters that are not allowed in a file name
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::development();

        let data_dir = match env::var("CANASTRA_DATA_DIR") {
            Ok(dir) if dir.trim().is_empty() => {
                return Err(ConfigError::Invalid {
                    var: "CANASTRA_DATA_DIR".to_string(),
                    reason: "Must not be empty".to_string(),
                });
            }
            Ok(dir) => PathBuf::from(dir),
            Err(_) => defaults.data_dir,
        };

        let storage_key = env::var("CANASTRA_STORAGE_KEY").unwrap_or(defaults.storage_key);
        if !is_valid_key(&storage_key) {
            return Err(ConfigError::Invalid {
                var: "CANASTRA_STORAGE_KEY".to_string(),
                reason: "Use letters, digits, '-', '_' or '.', not starting with '.'".to_string(),
            });
        }

        Ok(Self {
            data_dir,
            storage_key,
        })
    }

    /// Default configuration for local use
    pub fn development() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::development()
    }
}
