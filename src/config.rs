//! Configuration Management
//!
//! Engine configuration: remote server URL, auth token, local database
//! location, and sync scheduling knobs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default remote server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Default delay between a connectivity-restored event and the sync run it triggers
const DEFAULT_SYNC_DEBOUNCE: Duration = Duration::from_secs(2);

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    server_url: String,
    token: Option<String>,
    db_path: PathBuf,
    sync_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let server_url =
            std::env::var("FIELDSYNC_API_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let db_path = std::env::var("FIELDSYNC_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_data_dir())
            .join("fieldsync.db");
        Self {
            server_url,
            token: None,
            db_path,
            sync_debounce: DEFAULT_SYNC_DEBOUNCE,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new ConfigBuilder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Platform-specific data directory for the local database
    fn default_data_dir() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("fieldsync");
        path
    }

    /// Set the auth token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the auth token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Path of the local database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Delay applied before a connectivity-triggered sync run
    pub fn sync_debounce(&self) -> Duration {
        self.sync_debounce
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    server_url: Option<String>,
    token: Option<String>,
    db_path: Option<PathBuf>,
    sync_debounce: Option<Duration>,
}

impl ConfigBuilder {
    /// Set the remote server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the auth token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the local database path
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Set the connectivity debounce delay
    pub fn sync_debounce(mut self, debounce: Duration) -> Self {
        self.sync_debounce = Some(debounce);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        let server_url = self.server_url.unwrap_or(defaults.server_url);
        if server_url.is_empty() {
            return Err(ConfigError::MissingValue("server_url"));
        }
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(server_url));
        }
        Ok(Config {
            server_url,
            token: self.token,
            db_path: self.db_path.unwrap_or(defaults.db_path),
            sync_debounce: self.sync_debounce.unwrap_or(defaults.sync_debounce),
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
