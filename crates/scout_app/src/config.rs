//! Console configuration loaded from `scout.ron`.
//!
//! The licence policy lives here because the host injects it; the console
//! never fetches it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_core::{LicensePolicy, DEFAULT_POLL_INTERVAL};
use scout_engine::ClientSettings;
use scout_logging::{scout_info, scout_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "scout.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub license: LicensePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            backend_url: client.base_url,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: None,
            license: LicensePolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.backend_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Read the config file. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            scout_info!("No config at {:?}; using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Like [`load`], but an unreadable or malformed file is logged and the
/// defaults are used.
pub fn load_or_default(path: &Path) -> AppConfig {
    match load(path) {
        Ok(config) => {
            scout_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            scout_warn!("{}; using defaults", err);
            AppConfig::default()
        }
    }
}
