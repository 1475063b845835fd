//! Wire messages exchanged between the monitor, the settings surface and
//! the audio surface.
//!
//! Messages are JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "RESTART_MONITOR"}
//! ```

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages accepted by the monitor controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    StartMonitor,
    StopMonitor,
    RestartMonitor,
    AlarmStarted,
    AlarmStopped,
}

impl ControlMessage {
    /// Parse a message value.
    ///
    /// Unrecognized or malformed messages yield `None`; the dispatcher
    /// only reacts to known types.
    pub fn parse(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Parse a message from JSON text.
    pub fn parse_str(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    /// The wire name of this message.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMessage::StartMonitor => "START_MONITOR",
            ControlMessage::StopMonitor => "STOP_MONITOR",
            ControlMessage::RestartMonitor => "RESTART_MONITOR",
            ControlMessage::AlarmStarted => "ALARM_STARTED",
            ControlMessage::AlarmStopped => "ALARM_STOPPED",
        }
    }
}

impl std::fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages emitted to UI subscribers and the audio surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastMessage {
    /// Alarm entered the ringing state.
    AlarmStarted,
    /// Alarm resolved.
    AlarmStopped,
    /// Playback command: start the alert sound.
    PlaySound,
    /// Playback command: stop the alert sound.
    StopSound,
}

impl BroadcastMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastMessage::AlarmStarted => "ALARM_STARTED",
            BroadcastMessage::AlarmStopped => "ALARM_STOPPED",
            BroadcastMessage::PlaySound => "PLAY_SOUND",
            BroadcastMessage::StopSound => "STOP_SOUND",
        }
    }
}

impl std::fmt::Display for BroadcastMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
