//! Monitor errors.

use thiserror::Error;

use pagewatch_config::ConfigError;
use pagewatch_protocols::{AlertError, BrowserError, StoreError};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    #[error("Monitor is not running")]
    ChannelClosed,
}
