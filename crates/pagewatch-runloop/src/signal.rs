//! OS signal source.
//!
//! | Signal          | Event      |
//! |-----------------|------------|
//! | SIGINT, SIGTERM | `Shutdown` |
//! | SIGHUP          | `Reload`   |
//! | SIGUSR1         | `User1`    |

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::RunLoopError;

/// Signal event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// Shutdown signal (SIGTERM, SIGINT).
    Shutdown,
    /// Reload signal (SIGHUP).
    Reload,
    /// User signal 1 (SIGUSR1).
    User1,
}

impl std::fmt::Display for SignalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalEvent::Shutdown => write!(f, "shutdown"),
            SignalEvent::Reload => write!(f, "reload"),
            SignalEvent::User1 => write!(f, "user1"),
        }
    }
}

/// Injects signal events by hand.
#[derive(Clone)]
pub struct SignalSender {
    sender: mpsc::Sender<SignalEvent>,
}

impl SignalSender {
    /// Deliver an event as if the signal had arrived.
    pub async fn send(&self, event: SignalEvent) -> Result<(), RunLoopError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| RunLoopError::SourceClosed("signal".to_string()))
    }
}

/// Produces [`SignalEvent`]s.
pub struct SignalSource;

impl SignalSource {
    /// Channel without OS handlers (for testing).
    pub fn channel() -> (SignalSender, mpsc::Receiver<SignalEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (SignalSender { sender: tx }, rx)
    }

    /// Install OS signal handlers and return the event stream.
    #[cfg(unix)]
    pub fn listen() -> Result<(SignalSender, mpsc::Receiver<SignalEvent>), RunLoopError> {
        use tokio::signal::unix::{signal, SignalKind};

        let install = |kind: SignalKind, name: &'static str| {
            signal(kind).map_err(|source| RunLoopError::Signal {
                signal: name,
                source,
            })
        };

        let mut sigterm = install(SignalKind::terminate(), "SIGTERM")?;
        let mut sigint = install(SignalKind::interrupt(), "SIGINT")?;
        let mut sighup = install(SignalKind::hangup(), "SIGHUP")?;
        let mut sigusr1 = install(SignalKind::user_defined1(), "SIGUSR1")?;

        let (sender, rx) = Self::channel();
        let tx = sender.sender.clone();

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM");
                        SignalEvent::Shutdown
                    }
                    _ = sigint.recv() => {
                        info!("Received SIGINT");
                        SignalEvent::Shutdown
                    }
                    _ = sighup.recv() => {
                        info!("Received SIGHUP");
                        SignalEvent::Reload
                    }
                    _ = sigusr1.recv() => {
                        info!("Received SIGUSR1");
                        SignalEvent::User1
                    }
                };
                if tx.send(event).await.is_err() {
                    debug!("Signal receiver dropped, stopping handlers");
                    break;
                }
            }
        });

        Ok((sender, rx))
    }

    /// Install the Ctrl-C handler and return the event stream.
    #[cfg(not(unix))]
    pub fn listen() -> Result<(SignalSender, mpsc::Receiver<SignalEvent>), RunLoopError> {
        let (sender, rx) = Self::channel();
        let tx = sender.sender.clone();

        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C");
                if tx.send(SignalEvent::Shutdown).await.is_err() {
                    break;
                }
            }
        });

        Ok((sender, rx))
    }
}
