// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Settings are stored as TOML and cover the two startup decisions the
//! engine does not make on its own: which local storage engine backs the
//! data, and whether (and how) a remote store is reached. Everything has a
//! default so a missing file means "local-only with SQLite".

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const SETTINGS_FILE_NAME: &str = "settings.toml";
const DB_FILE_NAME: &str = "orders.db";

/// Engine settings, stored in `settings.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub storage: StorageConfig,
    /// Remote sync configuration (optional - if absent, runs in local-only
    /// mode).
    pub remote: Option<RemoteConfig>,
}

/// Which engine backs the local store, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageEngine {
    #[default]
    Sqlite,
    /// Ephemeral store for tests and sandboxed environments.
    Memory,
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub engine: StorageEngine,
    /// Database file path. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// The database file path, explicit or defaulted.
    pub fn database_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => default_data_dir().join(DB_FILE_NAME),
        }
    }
}

/// Remote sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket URL of the remote document store (`ws://` or `wss://`).
    pub url: String,
    /// Per-request timeout in milliseconds (default: 30000). A timeout is
    /// treated like a network failure.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Delivery attempts per queued item before it becomes a terminal
    /// failure (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay in seconds before re-draining when retryable items remain
    /// (default: 30).
    #[serde(default = "default_redrain_delay_secs")]
    pub redrain_delay_secs: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_redrain_delay_secs() -> u64 {
    30
}

impl RemoteConfig {
    /// A config pointing at the given URL with default timings.
    pub fn for_url(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            request_timeout_ms: default_request_timeout_ms(),
            max_attempts: default_max_attempts(),
            redrain_delay_secs: default_redrain_delay_secs(),
        }
    }

    /// Validates that the URL is a WebSocket URL.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        if self.url.starts_with("ws://") || self.url.starts_with("wss://") {
            None
        } else {
            Some(format!(
                "invalid remote url '{}': expected ws:// or wss://",
                self.url
            ))
        }
    }
}

impl Settings {
    /// Loads settings from the given directory, falling back to defaults
    /// when no file exists.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE_NAME);
        if !path.exists() {
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(&path)?;
        let settings: Settings =
            toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        if let Some(remote) = &settings.remote {
            if let Some(problem) = remote.validate_url() {
                return Err(Error::Config(problem));
            }
        }
        Ok(settings)
    }

    /// Saves settings to the given directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let raw = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(dir.join(SETTINGS_FILE_NAME), raw)?;
        Ok(())
    }
}

/// The platform data directory for the engine's files.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ganache")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
