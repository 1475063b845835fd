//! Alert types and the alert channel trait.

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AlertError;

/// An alert raised when the keyword threshold is met.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Alert title.
    pub title: String,
    /// Alert message.
    pub message: String,
    /// Timestamp.
    pub timestamp: DateTime<Utc>,
    /// URL of the tab that matched.
    pub url: Option<String>,
    /// Number of keyword occurrences found.
    pub occurrences: Option<usize>,
}

impl Alert {
    /// Create a new alert.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            url: None,
            occurrences: None,
        }
    }

    /// Set the matched URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the occurrence count.
    pub fn with_occurrences(mut self, occurrences: usize) -> Self {
        self.occurrences = Some(occurrences);
        self
    }

    /// Notification body: the message, then the match count and URL.
    pub fn body(&self) -> String {
        let mut text = self.message.clone();
        if let Some(count) = self.occurrences {
            text.push_str(&format!("\n{} matches", count));
        }
        if let Some(ref url) = self.url {
            text.push_str(&format!("\n{}", url));
        }
        text
    }
}

/// Alert channel trait.
///
/// Channels that play sound report playback start and end back to the
/// monitor as `ALARM_STARTED` / `ALARM_STOPPED` control messages.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Channel name.
    fn name(&self) -> &str;

    /// Raise an alert.
    async fn send(&self, alert: &Alert) -> Result<(), AlertError>;

    /// Stop any ongoing alert output.
    async fn silence(&self) -> Result<(), AlertError> {
        Ok(())
    }

    /// Whether this channel reports `ALARM_STARTED` / `ALARM_STOPPED`.
    ///
    /// When no channel does, the alarm ends as soon as `send` returns.
    fn reports_playback(&self) -> bool {
        false
    }
}
