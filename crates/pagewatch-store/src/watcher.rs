//! Settings file watcher.
//!
//! The settings UI talks to the monitor by editing the store. The watcher
//! diffs each new version against the last one it saw and emits the
//! control message the UI would have sent.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use pagewatch_config::MonitorConfig;
use pagewatch_protocols::{ConfigStore, ControlMessage, StoreError};

/// Receives control messages derived from store edits.
pub type ControlCallback = Arc<dyn Fn(ControlMessage) + Send + Sync>;

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Map a settings change onto a control message.
///
/// A flip of `enabled` starts or stops monitoring. Any other change while
/// enabled restarts it. Changes while disabled are ignored.
pub fn settings_change(prev: &MonitorConfig, next: &MonitorConfig) -> Option<ControlMessage> {
    if prev.enabled != next.enabled {
        return Some(if next.enabled {
            ControlMessage::StartMonitor
        } else {
            ControlMessage::StopMonitor
        });
    }
    if next.enabled && prev != next {
        return Some(ControlMessage::RestartMonitor);
    }
    None
}

/// Watches the settings document for external edits.
///
/// Dropping the watcher stops it.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    shutdown_tx: mpsc::Sender<()>,
    path: PathBuf,
}

impl StoreWatcher {
    /// Start watching `path`, reading settings through `store`.
    pub async fn spawn(
        path: impl Into<PathBuf>,
        store: Arc<dyn ConfigStore>,
        on_change: ControlCallback,
    ) -> Result<Self, StoreError> {
        Self::spawn_with_debounce(path, store, on_change, DEFAULT_DEBOUNCE).await
    }

    /// Like [`StoreWatcher::spawn`] with an explicit debounce window.
    pub async fn spawn_with_debounce(
        path: impl Into<PathBuf>,
        store: Arc<dyn ConfigStore>,
        on_change: ControlCallback,
        debounce: Duration,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let dir = watch_dir(&path);

        let initial = read_settings(store.as_ref()).await.unwrap_or_default();

        let (event_tx, event_rx) = mpsc::channel(100);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = event_tx.blocking_send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )
        .map_err(|e| StoreError::Unavailable(format!("Failed to create watcher: {}", e)))?;

        // Watch the directory: atomic writes replace the file, which would
        // drop a watch placed on the file itself.
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| StoreError::Unavailable(format!("Failed to watch {:?}: {}", dir, e)))?;
        info!("Watching settings file: {:?}", path);

        tokio::spawn(process_events(
            path.clone(),
            store,
            on_change,
            initial,
            debounce,
            event_rx,
            shutdown_rx,
        ));

        Ok(Self {
            _watcher: watcher,
            shutdown_tx,
            path,
        })
    }

    /// The watched settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop watching.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

async fn read_settings(store: &dyn ConfigStore) -> Result<MonitorConfig, String> {
    let entries = store
        .get(MonitorConfig::KEYS)
        .await
        .map_err(|e| e.to_string())?;
    MonitorConfig::from_entries(&entries).map_err(|e| e.to_string())
}

fn touches(event: &Event, path: &Path) -> bool {
    let name = path.file_name();
    event.paths.iter().any(|p| p == path || (name.is_some() && p.file_name() == name))
}

async fn process_events(
    path: PathBuf,
    store: Arc<dyn ConfigStore>,
    on_change: ControlCallback,
    mut current: MonitorConfig,
    debounce: Duration,
    mut event_rx: mpsc::Receiver<notify::Result<Event>>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!("Settings watcher shutting down");
                break;
            }
            event = event_rx.recv() => {
                let Some(result) = event else { break };
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Settings watcher error: {}", e);
                        continue;
                    }
                };
                if !touches(&event, &path) {
                    continue;
                }

                // Collapse the burst of events one write produces.
                tokio::time::sleep(debounce).await;
                while event_rx.try_recv().is_ok() {}

                let next = match read_settings(store.as_ref()).await {
                    Ok(next) => next,
                    Err(e) => {
                        warn!("Ignoring unreadable settings update: {}", e);
                        continue;
                    }
                };

                if let Some(message) = settings_change(&current, &next) {
                    info!("Settings changed, sending {}", message);
                    on_change(message);
                }
                current = next;
            }
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
