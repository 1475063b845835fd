//! Log alert channel and the playback lifecycle sink.

#[cfg(test)]
#[path = "alerts_tests.rs"]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use pagewatch_protocols::{Alert, AlertChannel, AlertError, ControlMessage};

/// Receives `ALARM_STARTED` / `ALARM_STOPPED` from playback channels.
pub type PlaybackSink = Arc<dyn Fn(ControlMessage) + Send + Sync>;

/// Log channel (writes to tracing).
pub struct LogChannel;

#[async_trait]
impl AlertChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        error!(
            "[ALERT] {} at {}: {}",
            alert.title,
            alert.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            alert.body().replace('\n', " | ")
        );
        Ok(())
    }
}
