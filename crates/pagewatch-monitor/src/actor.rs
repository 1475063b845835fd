//! Monitor actor.
//!
//! The controller lives inside one task and sees every event through a
//! single inbox, in arrival order. Timer ticks, tab loads, control
//! messages and finished content reads all arrive as [`MonitorEvent`]s.
//! Content reads run as separate tasks so a slow page never blocks the
//! inbox; their results come back as [`MonitorEvent::ContentRead`].

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

use pagewatch_protocols::{BrowserError, ControlMessage, FireCallback, TabLoaded};

use crate::controller::{MonitorController, PendingEvaluation};
use crate::error::MonitorError;

/// Everything the controller reacts to.
#[derive(Debug)]
pub enum MonitorEvent {
    Control(ControlMessage),
    Tick,
    TabLoadComplete(TabLoaded),
    ContentRead {
        pending: PendingEvaluation,
        content: Result<String, BrowserError>,
    },
    /// Stop alert playback.
    Silence,
    Shutdown,
}

/// Cloneable sender side of the actor's inbox.
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::UnboundedSender<MonitorEvent>,
}

impl MonitorHandle {
    /// Create a handle and the inbox it feeds.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MonitorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: MonitorEvent) -> Result<(), MonitorError> {
        self.tx.send(event).map_err(|_| MonitorError::ChannelClosed)
    }

    pub fn control(&self, message: ControlMessage) -> Result<(), MonitorError> {
        self.send(MonitorEvent::Control(message))
    }

    /// Deliver a raw JSON message. Unknown message types are ignored.
    ///
    /// Returns whether the message was recognized.
    pub fn dispatch(&self, message: &Value) -> bool {
        match ControlMessage::parse(message) {
            Some(control) => self.control(control).is_ok(),
            None => false,
        }
    }

    pub fn silence(&self) -> Result<(), MonitorError> {
        self.send(MonitorEvent::Silence)
    }

    pub fn shutdown(&self) -> Result<(), MonitorError> {
        self.send(MonitorEvent::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Timer callback that posts [`MonitorEvent::Tick`].
    pub fn tick_callback(&self) -> FireCallback {
        let tx = self.tx.clone();
        Arc::new(move || {
            let _ = tx.send(MonitorEvent::Tick);
        })
    }

    /// Load-event callback that posts [`MonitorEvent::TabLoadComplete`].
    pub fn load_callback(&self) -> Arc<dyn Fn(TabLoaded) + Send + Sync> {
        let tx = self.tx.clone();
        Arc::new(move |loaded| {
            let _ = tx.send(MonitorEvent::TabLoadComplete(loaded));
        })
    }

    /// Callback that posts control messages, for playback channels and
    /// the settings watcher.
    pub fn control_callback(&self) -> Arc<dyn Fn(ControlMessage) + Send + Sync> {
        let tx = self.tx.clone();
        Arc::new(move |message| {
            let _ = tx.send(MonitorEvent::Control(message));
        })
    }
}

/// Owns the controller and processes its inbox.
pub struct MonitorActor {
    controller: MonitorController,
    handle: MonitorHandle,
    inbox: mpsc::UnboundedReceiver<MonitorEvent>,
}

impl MonitorActor {
    pub fn new(
        controller: MonitorController,
        handle: MonitorHandle,
        inbox: mpsc::UnboundedReceiver<MonitorEvent>,
    ) -> Self {
        Self {
            controller,
            handle,
            inbox,
        }
    }

    /// Run until [`MonitorEvent::Shutdown`]. Returns the controller.
    pub async fn run(mut self) -> MonitorController {
        self.controller.init().await;
        info!("Monitor running");

        while let Some(event) = self.inbox.recv().await {
            match event {
                MonitorEvent::Control(message) => self.controller.handle_control(message).await,
                MonitorEvent::Tick => {
                    self.controller.on_tick().await;
                }
                MonitorEvent::TabLoadComplete(loaded) => {
                    if let Some(pending) = self
                        .controller
                        .on_tab_load_complete(loaded.tab_id, &loaded.url)
                        .await
                    {
                        self.spawn_read(pending);
                    }
                }
                MonitorEvent::ContentRead { pending, content } => {
                    self.controller.complete_evaluation(pending, content).await;
                }
                MonitorEvent::Silence => self.controller.silence_alarm().await,
                MonitorEvent::Shutdown => {
                    if self.controller.state().is_alarming() {
                        self.controller.silence_alarm().await;
                    }
                    self.controller.stop();
                    break;
                }
            }
        }

        info!("Monitor stopped");
        self.controller
    }

    fn spawn_read(&self, pending: PendingEvaluation) {
        let browser = self.controller.browser();
        let handle = self.handle.clone();
        debug!("Reading tab {}", pending.tab_id);
        tokio::spawn(async move {
            let content = browser.read_text(&pending.tab_id).await;
            let _ = handle.send(MonitorEvent::ContentRead { pending, content });
        });
    }
}
