//! Browser errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Browser not available: {0}")]
    Unavailable(String),

    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Reload failed: {0}")]
    ReloadFailed(String),

    #[error("Content read failed: {0}")]
    ContentReadFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}
