//! # pagewatch Monitor
//!
//! The monitoring core:
//!
//! - [`MatchEvaluator`] - literal, case-insensitive keyword counting
//! - [`AlarmState`] - the Idle / Polling / Alarming lifecycle
//! - [`MonitorController`] - reacts to ticks, tab loads and alarm events
//! - [`MonitorActor`] - owns the controller and serializes its events
//! - [`AlertManager`] - fans an alert out to log, desktop and sound channels

mod actor;
mod alert_channels;
mod alert_manager;
mod alerts;
mod controller;
mod error;
mod matcher;
mod state;

pub use actor::{MonitorActor, MonitorEvent, MonitorHandle};
pub use alert_channels::{DesktopChannel, SoundChannel};
pub use alert_manager::AlertManager;
pub use alerts::{LogChannel, PlaybackSink};
pub use controller::{AlertTemplate, EvaluationOutcome, MonitorController, PendingEvaluation};
pub use error::MonitorError;
pub use matcher::{evaluate, MatchEvaluator, MatchResult};
pub use state::{AlarmPhase, AlarmState, PhaseEvent};
