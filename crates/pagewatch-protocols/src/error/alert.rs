//! Alert channel errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Alert channel not configured: {0}")]
    NotConfigured(String),
}
