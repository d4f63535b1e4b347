//! Configuration module for cliptext.
//!
//! This module handles parsing configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `CLIPTEXT_DATA_DIR` | No | `~/.cliptext` | Directory holding the history database |
//! | `CLIPTEXT_POLL_INTERVAL_MS` | No | 500 | Clipboard polling interval in milliseconds |
//! | `CLIPTEXT_ENV` | No | - | Set to `development` to enable development mode |
//!
//! # Example
//!
//! ```no_run
//! use cliptext::config::Config;
//!
//! let config = Config::from_env().expect("Failed to load configuration");
//! println!("Database: {}", config.database_path().display());
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::BaseDirs;
use thiserror::Error;

/// Default clipboard polling interval.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default data directory name relative to home.
const DEFAULT_DATA_DIR: &str = ".cliptext";

/// File name of the history database inside the data directory.
const DATABASE_FILE: &str = "history.redb";

/// Value of `CLIPTEXT_ENV` that enables development mode.
const DEVELOPMENT_ENV: &str = "development";

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,
}

/// Configuration for cliptext.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the history database.
    pub data_dir: PathBuf,

    /// How often the clipboard is polled.
    pub poll_interval: Duration,

    /// Development mode: more verbose default logging.
    pub development: bool,
}

impl Config {
    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `CLIPTEXT_POLL_INTERVAL_MS` is set but is not a positive integer
    /// - The home directory cannot be determined and `CLIPTEXT_DATA_DIR` is unset
    pub fn from_env() -> Result<Self, ConfigError> {
        // Optional: CLIPTEXT_DATA_DIR (default: ~/.cliptext)
        let data_dir = match env::var("CLIPTEXT_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => {
                let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
                base_dirs.home_dir().join(DEFAULT_DATA_DIR)
            }
        };

        // Optional: CLIPTEXT_POLL_INTERVAL_MS (default: 500, must be > 0)
        let poll_interval_ms = match env::var("CLIPTEXT_POLL_INTERVAL_MS") {
            Ok(val) => {
                let ms = val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "CLIPTEXT_POLL_INTERVAL_MS".to_string(),
                    message: format!("expected positive integer, got '{val}'"),
                })?;
                if ms == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "CLIPTEXT_POLL_INTERVAL_MS".to_string(),
                        message: "poll interval must be greater than 0".to_string(),
                    });
                }
                ms
            }
            Err(_) => DEFAULT_POLL_INTERVAL_MS,
        };

        let development = env::var("CLIPTEXT_ENV")
            .map(|val| val.trim().eq_ignore_ascii_case(DEVELOPMENT_ENV))
            .unwrap_or(false);

        Ok(Self {
            data_dir,
            poll_interval: Duration::from_millis(poll_interval_ms),
            development,
        })
    }

    /// Path of the history database file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Default log filter directive when `RUST_LOG` is not set.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        if self.development {
            "debug"
        } else {
            "info"
        }
    }
}
