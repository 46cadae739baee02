use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waldo_engine::{ChannelSettings, ClientSettings};
use waldo_logging::{waldo_info, waldo_warn};

use super::logging::LogDestination;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "waldo.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Client policy knobs, read from a RON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Delay between a terminal frame and closing the progress stream.
    pub grace_delay_ms: u64,
    /// How long the success message stays up before the progress surface hides.
    pub hide_progress_delay_ms: u64,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let channel = ChannelSettings::default();
        Self {
            base_url: client.base_url,
            connect_timeout_ms: client.connect_timeout.as_millis() as u64,
            request_timeout_ms: client.request_timeout.as_millis() as u64,
            grace_delay_ms: channel.grace_delay.as_millis() as u64,
            hide_progress_delay_ms: 2000,
            log_destination: LogDestination::File,
        }
    }
}

impl AppConfig {
    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] if it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        waldo_info!("Loaded config from {:?}", path);
        Ok(config.sanitized())
    }

    /// Zero timeouts would fail every request; fall back to the defaults instead.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.connect_timeout_ms == 0 {
            waldo_warn!("connect_timeout_ms must be positive; using default");
            self.connect_timeout_ms = defaults.connect_timeout_ms;
        }
        if self.request_timeout_ms == 0 {
            waldo_warn!("request_timeout_ms must be positive; using default");
            self.request_timeout_ms = defaults.request_timeout_ms;
        }
        self
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn channel_settings(&self) -> ChannelSettings {
        ChannelSettings {
            grace_delay: Duration::from_millis(self.grace_delay_ms),
        }
    }

    pub fn hide_progress_delay(&self) -> Duration {
        Duration::from_millis(self.hide_progress_delay_ms)
    }
}
