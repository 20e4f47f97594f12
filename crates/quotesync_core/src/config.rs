//! Application configuration.
//!
//! # Responsibility
//! - Load optional TOML settings with a default for every field.
//! - Validate ranges before any store, client or scheduler is built.
//!
//! # Invariants
//! - A missing config file yields `AppConfig::default()`.
//! - `page_limit` stays within `1..=MAX_PAGE_LIMIT`.

use crate::logging::default_log_level;
use crate::sync::http_remote::DEFAULT_ENDPOINT;
use crate::sync::reconciler::DEFAULT_PAGE_LIMIT;
use crate::sync::scheduler::DEFAULT_SYNC_INTERVAL;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MAX_PAGE_LIMIT: u32 = 100;
const APP_DIR_NAME: &str = "quotesync";
const DB_FILE_NAME: &str = "quotesync.sqlite3";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote `posts`-style endpoint.
    pub endpoint: String,
    /// Records fetched per sync.
    pub page_limit: u32,
    pub sync_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Durable store location; platform data dir when unset.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Log directory; file logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads and validates a TOML config file; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint cannot be empty".to_string()));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&self.page_limit) {
            return Err(ConfigError::Invalid(format!(
                "page_limit must be within 1..={MAX_PAGE_LIMIT}, got {}",
                self.page_limit
            )));
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync_interval_secs must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolves the durable store path, falling back to the platform data
    /// directory and finally the working directory.
    pub fn resolved_db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(DB_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
    }

    /// Default config file location under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
    }
}
