// src/config.rs

//! Client configuration
//!
//! # Example config.toml
//!
//! ```toml
//! endpoint = "https://pypi.org/pypi"
//! categories = ["Framework :: Tryton"]
//! staleness_days = 3
//! snapshot = "/var/cache/pypi-client/snapshot.json"
//! timeout_secs = 30
//! max_retries = 3
//! ```
//!
//! Every key is optional.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::xmlrpc::{HTTP_TIMEOUT, MAX_RETRIES};

/// Default XML-RPC endpoint of the index
pub const DEFAULT_ENDPOINT: &str = "https://pypi.org/pypi";

/// Category filter used when refreshing the package list
pub const DEFAULT_CATEGORY: &str = "Framework :: Tryton";

/// Maximum age of the package list before it is refreshed
pub const DEFAULT_STALENESS_DAYS: u32 = 3;

/// Directory name under the platform config and cache directories
const APP_DIR: &str = "pypi-client";

/// User configuration, loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// XML-RPC endpoint
    pub endpoint: String,

    /// Categories browsed when the package list is refreshed
    pub categories: Vec<String>,

    /// Days before the cached package list is considered stale
    pub staleness_days: u32,

    /// Snapshot file; defaults to the platform cache directory
    pub snapshot: Option<PathBuf>,

    /// HTTP timeout per call
    pub timeout_secs: u64,

    /// Attempts per call when the connection fails
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            categories: vec![DEFAULT_CATEGORY.to_string()],
            staleness_days: DEFAULT_STALENESS_DAYS,
            snapshot: None,
            timeout_secs: HTTP_TIMEOUT.as_secs(),
            max_retries: MAX_RETRIES,
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        if config.endpoint.trim().is_empty() {
            return Err(Error::ParseError(
                "Invalid configuration: 'endpoint' is empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// `<config_dir>/pypi-client/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Configured snapshot path, or `<cache_dir>/pypi-client/snapshot.json`
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.snapshot
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_DIR).join("snapshot.json")))
    }

    pub fn staleness(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.staleness_days))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.categories, vec![DEFAULT_CATEGORY]);
        assert_eq!(config.staleness(), TimeDelta::days(3));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
endpoint = "https://test.pypi.org/pypi"
staleness_days = 1
"#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "https://test.pypi.org/pypi");
        assert_eq!(config.staleness_days, 1);
        assert_eq!(config.categories, vec![DEFAULT_CATEGORY]);
        assert_eq!(config.max_retries, MAX_RETRIES);
    }

    #[test]
    fn test_invalid_files_are_rejected() {
        assert!(matches!(
            Config::from_toml("staleness_days = \"soon\""),
            Err(Error::ParseError(_))
        ));
        assert!(Config::from_toml("endpoint = \"\"").is_err());
    }

    #[test]
    fn test_load_missing_and_present_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_eq!(Config::load(&missing).unwrap(), Config::default());

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
categories = ["Framework :: Tryton", "Topic :: Office/Business"]
snapshot = "/tmp/pypi-snapshot.json"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.categories.len(), 2);
        assert_eq!(
            config.snapshot_path(),
            Some(PathBuf::from("/tmp/pypi-snapshot.json"))
        );
    }
}
