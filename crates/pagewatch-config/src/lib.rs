//! # pagewatch Config
//!
//! Two layers of configuration:
//!
//! - [`MonitorConfig`]: the user settings persisted in the config store
//!   (`enabled`, `interval`, `targetUrl`, `keywords`, `minCount`).
//! - [`AppConfig`]: the daemon's own TOML file (browser endpoint, store
//!   path, alert output, logging).

mod app;
mod error;
mod loader;
mod monitor;
mod validator;

pub use app::{AlertConfig, AppConfig, BrowserConfig, LoggingConfig, StoreConfig};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use monitor::{MonitorConfig, MIN_INTERVAL_SECS};
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
