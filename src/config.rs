//! Configuration Management
//!
//! [`ClientConfig`] is what the client is built from. [`Settings`] is the
//! optional user file the command-line tool reads to fill it in.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Root of the v5 API
pub const DEFAULT_BASE_URL: &str = "https://api.phish.net/v5";

/// Response format suffix
pub const DEFAULT_FORMAT: &str = "json";

/// Default timeout for a single request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "PHISH_NET_API_KEY";

/// Settings consumed by [`crate::PhishNetClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub format: String,
    pub timeout: Duration,
    /// Log every request and response status at info level
    pub logs_enabled: bool,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            logs_enabled: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_logs(mut self, enabled: bool) -> Self {
        self.logs_enabled = enabled;
        self
    }

    /// Reject settings the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::configuration(format!(
                "API key is required. Can be provided using the {} environment variable.",
                API_KEY_ENV
            )));
        }
        if self.format.trim().is_empty() {
            return Err(Error::configuration("Response format must not be empty"));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        Ok(())
    }
}

/// User settings file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    /// Directory holding one cache file per resource
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Entries older than this are refetched; unset means never
    #[serde(default)]
    pub cache_ttl_minutes: Option<i64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("phishnet").join("config.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid settings file {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Could not read settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Effective cache directory (settings > platform cache dir > ./cache)
    pub fn effective_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|p| p.join("phishnet")))
            .unwrap_or_else(|| PathBuf::from("cache"))
    }

    /// Convert a TTL in minutes; zero or negative means entries never expire
    pub fn cache_ttl(minutes: Option<i64>) -> Result<Option<chrono::Duration>> {
        match minutes.filter(|m| *m > 0) {
            None => Ok(None),
            Some(m) => chrono::Duration::try_minutes(m).map(Some).ok_or_else(|| {
                Error::configuration(format!("Cache TTL of {} minutes is out of range", m))
            }),
        }
    }

    /// Build a client config; `api_key` wins over the file's key
    pub fn client_config(&self, api_key: Option<String>) -> ClientConfig {
        let key = api_key
            .or_else(|| self.api_key.clone())
            .unwrap_or_default();

        let mut config = ClientConfig::new(key);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.as_str());
        }
        if let Some(format) = &self.format {
            config = config.with_format(format.as_str());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}
