//! Tests for alert channels and manager.

use super::*;
use crate::alert_channels::SoundChannel;
use crate::alert_manager::AlertManager;
use pagewatch_config::AppConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

fn test_alert() -> Alert {
    Alert::new("Page Monitor", "New tasks are posted on the site")
        .with_url("https://jobs.example.com/tasks")
        .with_occurrences(3)
}

struct CountingChannel {
    name: &'static str,
    sent: Arc<AtomicUsize>,
    silenced: Arc<AtomicUsize>,
    fail: bool,
    playback: bool,
}

impl CountingChannel {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            sent: Arc::new(AtomicUsize::new(0)),
            silenced: Arc::new(AtomicUsize::new(0)),
            fail: false,
            playback: false,
        }
    }
}

#[async_trait]
impl AlertChannel for CountingChannel {
    fn name(&self) -> &str {
        self.name
    }

    async fn send(&self, _alert: &Alert) -> Result<(), AlertError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(AlertError::Playback(format!("{} failed", self.name)))
        } else {
            Ok(())
        }
    }

    async fn silence(&self) -> Result<(), AlertError> {
        self.silenced.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn reports_playback(&self) -> bool {
        self.playback
    }
}

fn recording_sink() -> (PlaybackSink, mpsc::UnboundedReceiver<ControlMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink: PlaybackSink = Arc::new(move |msg| {
        let _ = tx.send(msg);
    });
    (sink, rx)
}

#[tokio::test]
async fn test_log_channel() {
    let channel = LogChannel;
    assert_eq!(channel.name(), "log");
    assert!(channel.send(&test_alert()).await.is_ok());
    assert!(!channel.reports_playback());
}

#[test]
fn test_manager_default_has_log_channel() {
    let manager = AlertManager::default();
    assert_eq!(manager.channel_names(), vec!["log"]);
    assert!(!manager.reports_playback());
}

#[test]
fn test_manager_from_config() {
    let (sink, _rx) = recording_sink();
    let mut config = AppConfig::default();
    config.alert.desktop = true;
    config.alert.sound = Some("/tmp/alert.wav".to_string());

    let manager = AlertManager::from_config(&config, sink);
    assert_eq!(manager.channel_names(), vec!["log", "desktop", "sound"]);
    assert!(manager.reports_playback());
}

#[test]
fn test_manager_from_config_without_sound() {
    let (sink, _rx) = recording_sink();
    let mut config = AppConfig::default();
    config.alert.desktop = false;

    let manager = AlertManager::from_config(&config, sink);
    assert_eq!(manager.channel_names(), vec!["log"]);
}

#[tokio::test]
async fn test_manager_sends_to_all_channels() {
    let a = CountingChannel::new("a");
    let b = CountingChannel::new("b");
    let (sent_a, sent_b) = (a.sent.clone(), b.sent.clone());

    let mut manager = AlertManager::new();
    manager.add_channel(Box::new(a));
    manager.add_channel(Box::new(b));

    assert!(manager.send(&test_alert()).await.is_ok());
    assert_eq!(sent_a.load(Ordering::SeqCst), 1);
    assert_eq!(sent_b.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_manager_tolerates_notification_failure() {
    let mut failing = CountingChannel::new("desktop");
    failing.fail = true;
    let after = CountingChannel::new("after");
    let sent_after = after.sent.clone();

    let mut manager = AlertManager::new();
    manager.add_channel(Box::new(failing));
    manager.add_channel(Box::new(after));

    assert!(manager.send(&test_alert()).await.is_ok());
    assert_eq!(sent_after.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_manager_reports_playback_failure() {
    let mut sound = CountingChannel::new("sound");
    sound.fail = true;
    sound.playback = true;

    let mut manager = AlertManager::new();
    manager.add_channel(Box::new(sound));

    let result = manager.send(&test_alert()).await;
    assert!(matches!(result, Err(AlertError::Playback(_))));
}

#[tokio::test]
async fn test_manager_silences_all_channels() {
    let a = CountingChannel::new("a");
    let silenced = a.silenced.clone();

    let mut manager = AlertManager::new();
    manager.add_channel(Box::new(a));

    assert!(manager.silence().await.is_ok());
    assert_eq!(silenced.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sound_channel_missing_file() {
    let (sink, mut rx) = recording_sink();
    let channel = SoundChannel::new("paplay", "/nonexistent/alert.wav", sink);

    let result = channel.send(&test_alert()).await;
    assert!(matches!(result, Err(AlertError::Playback(_))));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_sound_channel_empty_player() {
    let (sink, _rx) = recording_sink();
    let channel = SoundChannel::new("  ", "/tmp/alert.wav", sink);

    let result = channel.send(&test_alert()).await;
    assert!(matches!(result, Err(AlertError::NotConfigured(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn test_sound_channel_reports_lifecycle() {
    let sound = tempfile::NamedTempFile::new().unwrap();
    let (sink, mut rx) = recording_sink();
    let channel = SoundChannel::new("true", sound.path(), sink);

    channel.send(&test_alert()).await.unwrap();

    let started = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(started, Some(ControlMessage::AlarmStarted));
    let stopped = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(stopped, Some(ControlMessage::AlarmStopped));
}

#[cfg(unix)]
#[tokio::test]
async fn test_sound_channel_silence_kills_player() {
    let sound = tempfile::NamedTempFile::new().unwrap();
    let (sink, mut rx) = recording_sink();
    let channel = SoundChannel::new("tail -f", sound.path(), sink);

    channel.send(&test_alert()).await.unwrap();
    assert_eq!(rx.recv().await, Some(ControlMessage::AlarmStarted));
    assert!(channel.is_playing());

    channel.silence().await.unwrap();

    let stopped = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(stopped, Some(ControlMessage::AlarmStopped));
    assert!(!channel.is_playing());
}

#[cfg(unix)]
#[tokio::test]
async fn test_sound_channel_replaced_playback_stops_quietly() {
    let sound = tempfile::NamedTempFile::new().unwrap();
    let (sink, mut rx) = recording_sink();
    let channel = SoundChannel::new("tail -f", sound.path(), sink);

    channel.send(&test_alert()).await.unwrap();
    channel.send(&test_alert()).await.unwrap();
    assert_eq!(rx.recv().await, Some(ControlMessage::AlarmStarted));
    assert_eq!(rx.recv().await, Some(ControlMessage::AlarmStarted));

    // The first player is killed, but only the live one may report a stop.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(rx.try_recv().is_err());
    assert!(channel.is_playing());

    channel.silence().await.unwrap();
    let stopped = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(stopped, Some(ControlMessage::AlarmStopped));
    assert!(
        tokio::time::timeout(Duration::from_millis(300), rx.recv())
            .await
            .is_err()
    );
}
