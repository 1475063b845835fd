//! Alert manager for dispatching alerts to channels.

use async_trait::async_trait;
use tracing::{error, info, warn};

use pagewatch_config::AppConfig;
use pagewatch_protocols::{Alert, AlertChannel, AlertError};

use crate::alert_channels::{DesktopChannel, SoundChannel};
use crate::alerts::{LogChannel, PlaybackSink};

/// Fans an alert out to every channel.
///
/// Failures of notification channels are logged. A failure of a playback
/// channel fails the whole send, since the alarm lifecycle depends on it.
pub struct AlertManager {
    channels: Vec<Box<dyn AlertChannel>>,
}

impl AlertManager {
    /// Create a manager with only the log channel.
    pub fn new() -> Self {
        Self {
            channels: vec![Box::new(LogChannel)],
        }
    }

    /// Create from config.
    pub fn from_config(config: &AppConfig, sink: PlaybackSink) -> Self {
        let mut manager = Self::new();

        if config.alert.desktop {
            info!("Adding desktop alert channel");
            manager.add_channel(Box::new(DesktopChannel));
        }

        if let Some(sound) = config.sound_path() {
            info!("Adding sound alert channel ({})", config.alert.player);
            manager.add_channel(Box::new(SoundChannel::new(&config.alert.player, sound, sink)));
        }

        manager
    }

    /// Add a channel.
    pub fn add_channel(&mut self, channel: Box<dyn AlertChannel>) {
        self.channels.push(channel);
    }

    /// Get list of channel names.
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertChannel for AlertManager {
    fn name(&self) -> &str {
        "manager"
    }

    async fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        let mut playback_error = None;

        for channel in &self.channels {
            if let Err(e) = channel.send(alert).await {
                error!("Failed to send alert via {}: {}", channel.name(), e);
                if channel.reports_playback() && playback_error.is_none() {
                    playback_error = Some(e);
                }
            }
        }

        match playback_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn silence(&self) -> Result<(), AlertError> {
        for channel in &self.channels {
            if let Err(e) = channel.silence().await {
                warn!("Failed to silence {}: {}", channel.name(), e);
            }
        }
        Ok(())
    }

    fn reports_playback(&self) -> bool {
        self.channels.iter().any(|c| c.reports_playback())
    }
}
