//! Alert channel implementations (desktop notification, sound playback).

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pagewatch_protocols::{Alert, AlertChannel, AlertError, ControlMessage};

use crate::alerts::PlaybackSink;

/// Desktop notification channel.
///
/// Uses `osascript` on macOS and `notify-send` elsewhere.
pub struct DesktopChannel;

impl DesktopChannel {
    fn command(title: &str, message: &str) -> Command {
        if cfg!(target_os = "macos") {
            let script = format!(
                r#"display notification "{}" with title "{}""#,
                message.replace('"', r#"\""#),
                title.replace('"', r#"\""#)
            );
            let mut cmd = Command::new("osascript");
            cmd.args(["-e", &script]);
            cmd
        } else {
            let mut cmd = Command::new("notify-send");
            cmd.args(["--urgency=critical", title, message]);
            cmd
        }
    }
}

#[async_trait]
impl AlertChannel for DesktopChannel {
    fn name(&self) -> &str {
        "desktop"
    }

    async fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        let output = Self::command(&alert.title, &alert.body())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AlertError::Notification(e.to_string()))?;

        if output.status.success() {
            debug!("Desktop notification sent");
            Ok(())
        } else {
            Err(AlertError::Notification(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

/// Sound playback channel.
///
/// Runs `player <sound>` as a child process. Reports `ALARM_STARTED` once
/// the process is spawned and `ALARM_STOPPED` when it exits or is killed
/// by [`AlertChannel::silence`]. A playback replaced by a newer `send`
/// ends silently, so each `ALARM_STOPPED` belongs to the live playback.
pub struct SoundChannel {
    program: String,
    args: Vec<String>,
    sound: PathBuf,
    sink: PlaybackSink,
    playing: Arc<Mutex<Option<Playback>>>,
    next_id: AtomicU64,
}

struct Playback {
    id: u64,
    token: CancellationToken,
}

impl SoundChannel {
    /// `player` may carry extra arguments, e.g. `"mpv --no-video"`.
    pub fn new(player: &str, sound: impl Into<PathBuf>, sink: PlaybackSink) -> Self {
        let mut parts = player.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
            sound: sound.into(),
            sink,
            playing: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Whether a playback process is currently running.
    pub fn is_playing(&self) -> bool {
        self.playing
            .lock()
            .as_ref()
            .is_some_and(|playback| !playback.token.is_cancelled())
    }
}

#[async_trait]
impl AlertChannel for SoundChannel {
    fn name(&self) -> &str {
        "sound"
    }

    async fn send(&self, _alert: &Alert) -> Result<(), AlertError> {
        if self.program.is_empty() {
            return Err(AlertError::NotConfigured("sound player".to_string()));
        }
        if !self.sound.exists() {
            return Err(AlertError::Playback(format!(
                "sound file not found: {}",
                self.sound.display()
            )));
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AlertError::Playback(format!("{}: {}", self.program, e)))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();
        let replaced = self.playing.lock().replace(Playback {
            id,
            token: token.clone(),
        });
        if let Some(previous) = replaced {
            debug!("Replacing alert sound playback {}", previous.id);
            previous.token.cancel();
        }

        info!("Playing alert sound {}", self.sound.display());
        (self.sink)(ControlMessage::AlarmStarted);

        let sink = self.sink.clone();
        let playing = self.playing.clone();
        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => debug!("Alert sound finished"),
                    Ok(status) => warn!("Sound player exited with {}", status),
                    Err(e) => warn!("Failed to wait for sound player: {}", e),
                },
                _ = token.cancelled() => {
                    if let Err(e) = child.kill().await {
                        warn!("Failed to stop sound player: {}", e);
                    }
                    debug!("Alert sound stopped");
                }
            }

            let current = {
                let mut guard = playing.lock();
                if guard.as_ref().is_some_and(|p| p.id == id) {
                    guard.take();
                    true
                } else {
                    false
                }
            };
            if current {
                sink(ControlMessage::AlarmStopped);
            }
        });

        Ok(())
    }

    async fn silence(&self) -> Result<(), AlertError> {
        // The playback task clears the slot and reports ALARM_STOPPED.
        if let Some(playback) = self.playing.lock().as_ref() {
            playback.token.cancel();
        }
        Ok(())
    }

    fn reports_playback(&self) -> bool {
        true
    }
}
