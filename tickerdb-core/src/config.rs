//! Optional TOML configuration.
//!
//! ```toml
//! [database]
//! path = "stock_data.db"
//!
//! [ingest]
//! period = "max"
//!
//! [provider]
//! base_url = "https://query2.finance.yahoo.com"
//! timeout_secs = 30
//! user_agent = "Mozilla/5.0 ..."
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file,
//! the file over the built-in defaults.

use crate::domain::Period;
use crate::error::UsageError;
use crate::provider::yahoo::{YahooConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "stock_data.db";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn yahoo(&self) -> YahooConfig {
        YahooConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

impl Config {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UsageError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| UsageError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, UsageError> {
        toml::from_str(content).map_err(|e| UsageError::Config(format!("parse TOML: {e}")))
    }

    /// Load the file if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, UsageError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Database path: the flag if given, else the configured one.
    pub fn db_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .unwrap_or_else(|| self.database.path.clone())
    }

    /// History period: the flag if given (parsed), else the configured one.
    pub fn period(&self, flag: Option<&str>) -> Result<Period, UsageError> {
        match flag {
            Some(s) => s.parse(),
            None => Ok(self.ingest.period),
        }
    }
}
