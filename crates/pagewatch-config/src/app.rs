//! Daemon configuration schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub alert: AlertConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Browser connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Timeout for a single DevTools request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Settings store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,

    /// Restart monitoring when the store file is edited externally.
    #[serde(default = "default_true")]
    pub watch: bool,
}

/// Alert output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_alert_title")]
    pub title: String,

    #[serde(default = "default_alert_message")]
    pub message: String,

    /// Show a desktop notification.
    #[serde(default = "default_true")]
    pub desktop: bool,

    /// Sound file to play; no sound when absent.
    #[serde(default)]
    pub sound: Option<String>,

    /// Command used to play the sound file.
    #[serde(default = "default_player")]
    pub player: String,
}

/// Logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rotated log files.
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:9222".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_store_path() -> String {
    "~/.pagewatch/settings.json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_alert_title() -> String {
    "Page Monitor".to_string()
}

fn default_alert_message() -> String {
    "New tasks are posted on the site".to_string()
}

fn default_player() -> String {
    if cfg!(target_os = "macos") {
        "afplay".to_string()
    } else {
        "paplay".to_string()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.pagewatch/logs".to_string()
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            watch: default_true(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            title: default_alert_title(),
            message: default_alert_message(),
            desktop: default_true(),
            sound: None,
            player: default_player(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    /// Store path with `~` expanded.
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(crate::ConfigLoader::expand_path(&self.store.path))
    }

    /// Log directory with `~` expanded.
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(crate::ConfigLoader::expand_path(&self.logging.dir))
    }

    /// Sound file with `~` expanded.
    pub fn sound_path(&self) -> Option<PathBuf> {
        self.alert
            .sound
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| PathBuf::from(crate::ConfigLoader::expand_path(s)))
    }

    /// Default location of the daemon config file.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".pagewatch").join("pagewatch.toml"))
            .unwrap_or_else(|| PathBuf::from("pagewatch.toml"))
    }
}
