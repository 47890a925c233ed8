use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default timeout for the release request in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default base URL for GitHub API
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// User agent sent with every request (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Everything a single check needs
///
/// Immutable once handed to an [`UpdateChecker`](crate::UpdateChecker); each
/// check carries its own copy.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckConfig {
    /// Repository identifier (`owner/repo`, a GitHub URL, or an SSH remote)
    pub repository: String,
    /// Version of the running application
    pub current_version: String,
    /// Ceiling for the network call in seconds
    pub timeout_secs: u64,
    pub api_base_url: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            repository: String::new(),
            current_version: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl CheckConfig {
    pub fn new(repository: impl Into<String>, current_version: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            current_version: current_version.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Override the API base URL.
    ///
    /// Must be HTTPS. Plain HTTP is accepted only for loopback hosts so tests
    /// can point the checker at a local mock server.
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    /// Timeout actually applied to the request. Zero falls back to the default.
    pub fn effective_timeout_secs(&self) -> u64 {
        if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            self.timeout_secs
        }
    }

    /// Load a config from a JSON file. Missing fields use their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Returns the path to the data directory for release-check.
/// Uses $XDG_DATA_HOME/release-check if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-check,
/// or ./release-check if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("release-check.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("release-check")
}
