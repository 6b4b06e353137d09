//! Persistent application configuration
//!
//! Stores the database location, server address and display settings in a
//! JSON file at `<config_dir>/water-level/config.json`.

use crate::store::{FirebaseStore, MemoryStore, RealtimeStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use water_level_server::ServerConfig;

fn default_port() -> u16 {
    8920
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_live_poll_ms() -> u64 {
    2000
}

fn default_utc_offset_minutes() -> i32 {
    7 * 60
}

fn default_recording_interval_secs() -> u64 {
    5
}

/// Persistent application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Realtime database URL (None = run on the in-memory store)
    #[serde(default)]
    pub database_url: Option<String>,
    /// Database auth token appended to every request
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Web server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Web server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Poll interval of the live reading in milliseconds
    #[serde(default = "default_live_poll_ms")]
    pub live_poll_ms: u64,
    /// Display time zone in minutes east of UTC (420 = WIB)
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    /// Recording poll interval in seconds
    #[serde(default = "default_recording_interval_secs")]
    pub recording_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            auth_token: None,
            port: default_port(),
            bind_addr: default_bind_addr(),
            live_poll_ms: default_live_poll_ms(),
            utc_offset_minutes: default_utc_offset_minutes(),
            recording_interval_secs: default_recording_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Config file path: `<config_dir>/water-level/config.json`
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("water-level")
            .join("config.json")
    }

    /// Load config from the default path, falling back to defaults on any error
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded config from disk");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save config to disk, creating parent directories if needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Config saved to disk");
        Ok(())
    }

    /// Database URL, ignoring blank values
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Store selected by the config
    ///
    /// Without a database URL the dashboard runs on an empty in-memory store
    /// and shows synthetic windows.
    pub fn open_store(&self) -> anyhow::Result<Arc<dyn RealtimeStore>> {
        match self.database_url() {
            Some(url) => {
                let store = FirebaseStore::new(url)?
                    .with_auth(self.auth_token.clone())
                    .with_poll_interval(Duration::from_millis(self.live_poll_ms.max(100)));
                tracing::info!(url = store.base_url(), "Using realtime database");
                Ok(Arc::new(store))
            }
            None => {
                tracing::warn!("No database URL configured, using in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            port: self.port,
            bind_addr: self.bind_addr.clone(),
            utc_offset_minutes: self.utc_offset_minutes,
            recording_interval: self.recording_interval(),
        }
    }

    pub fn recording_interval(&self) -> Duration {
        Duration::from_secs(self.recording_interval_secs.max(1))
    }

    /// Display offset used for chart labels and CSV dates
    pub fn offset(&self) -> chrono::FixedOffset {
        self.server_config().offset()
    }
}
