use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";

/// Runtime settings, read from a JSON file with every field optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth_base_url: String,
    pub posts_base_url: String,
    pub chat_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub login_expires_in_mins: u32,
    /// Distance from the end of the feed, in points, that counts as "near the end".
    pub proximity_threshold_px: f32,
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth_base_url: "https://dummyjson.com".to_string(),
            posts_base_url: "https://dummyjson.com".to_string(),
            chat_url: "wss://echo.websocket.org/.ws".to_string(),
            page_size: 10,
            request_timeout_secs: 10,
            connect_timeout_secs: 10,
            login_expires_in_mins: 30,
            proximity_threshold_px: 1.0,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Replaces values the client cannot work with by their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = AppConfig::default();
        if self.page_size == 0 {
            log::warn!("page_size must be at least 1; using {}", defaults.page_size);
            self.page_size = defaults.page_size;
        }
        if self.request_timeout_secs == 0 {
            log::warn!("request_timeout_secs must be positive; using {}", defaults.request_timeout_secs);
            self.request_timeout_secs = defaults.request_timeout_secs;
        }
        if self.connect_timeout_secs == 0 {
            log::warn!("connect_timeout_secs must be positive; using {}", defaults.connect_timeout_secs);
            self.connect_timeout_secs = defaults.connect_timeout_secs;
        }
        if self.proximity_threshold_px.is_nan() || self.proximity_threshold_px < 0.0 {
            log::warn!(
                "proximity_threshold_px must be a non-negative number; using {}",
                defaults.proximity_threshold_px
            );
            self.proximity_threshold_px = defaults.proximity_threshold_px;
        }
        self
    }
}

/// Reads the JSON config at `path`. A missing or unreadable file yields the
/// defaults; so does a malformed one, with a warning.
pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log::info!("No config at {} ({err}); using defaults", path.display());
            return AppConfig::default();
        }
    };

    match serde_json::from_str::<AppConfig>(&content) {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            config.sanitized()
        }
        Err(err) => {
            log::warn!("Ignoring malformed config {}: {err}", path.display());
            AppConfig::default()
        }
    }
}
