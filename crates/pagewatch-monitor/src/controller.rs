//! Monitor controller.
//!
//! Owns the alarm state and drives one poll cycle at a time:
//!
//! ```text
//! tick ──▶ find target tab ──▶ reload
//!                                  │
//! load complete ──▶ PendingEvaluation ──▶ (read text) ──▶ complete_evaluation
//!                                                              │
//!                                     threshold met ──▶ Alarming ──▶ alert
//! ```
//!
//! Every operation logs and swallows its own failures; nothing here is
//! fatal to the daemon.

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use pagewatch_config::{ConfigValidator, MonitorConfig};
use pagewatch_protocols::{
    keys, Alert, AlertChannel, BroadcastMessage, BrowserError, ConfigStore,
    ControlMessage, Scheduler, TabBrowser, TabId,
};

use crate::error::MonitorError;
use crate::matcher::{MatchEvaluator, MatchResult};
use crate::state::{AlarmPhase, AlarmState, PhaseEvent};

/// Title and body of raised alerts.
#[derive(Debug, Clone)]
pub struct AlertTemplate {
    pub title: String,
    pub message: String,
}

impl Default for AlertTemplate {
    fn default() -> Self {
        Self {
            title: "Page Monitor".to_string(),
            message: "New tasks are posted on the site".to_string(),
        }
    }
}

/// A content evaluation waiting for its page text.
#[derive(Debug, Clone)]
pub struct PendingEvaluation {
    pub tab_id: TabId,
    pub url: String,
    /// Settings as of the load-complete event.
    pub config: MonitorConfig,
    epoch: u64,
}

/// What a completed evaluation led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// The read failed or the result was stale.
    Skipped,
    /// Below threshold.
    NoMatch(MatchResult),
    /// Threshold met and an alert was raised.
    Alerted(MatchResult),
}

/// The monitoring state machine.
pub struct MonitorController {
    store: Arc<dyn ConfigStore>,
    browser: Arc<dyn TabBrowser>,
    scheduler: Arc<dyn Scheduler>,
    alerts: Arc<dyn AlertChannel>,
    events: broadcast::Sender<BroadcastMessage>,
    template: AlertTemplate,
    state: AlarmState,
    /// Whether a timer armed by this controller is live. Ticks that were
    /// already queued when it was cancelled are dropped.
    scheduled: bool,
}

impl MonitorController {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        browser: Arc<dyn TabBrowser>,
        scheduler: Arc<dyn Scheduler>,
        alerts: Arc<dyn AlertChannel>,
        events: broadcast::Sender<BroadcastMessage>,
    ) -> Self {
        Self {
            store,
            browser,
            scheduler,
            alerts,
            events,
            template: AlertTemplate::default(),
            state: AlarmState::new(),
            scheduled: false,
        }
    }

    pub fn with_template(mut self, template: AlertTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn phase(&self) -> AlarmPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &AlarmState {
        &self.state
    }

    /// The browser used for polling, shared with content reads.
    pub fn browser(&self) -> Arc<dyn TabBrowser> {
        self.browser.clone()
    }

    /// Subscribe to outbound notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastMessage> {
        self.events.subscribe()
    }

    /// Startup: clear the stale `alarmPlaying` mirror and resume
    /// monitoring if it was enabled.
    pub async fn init(&mut self) {
        self.mirror_alarm_playing(false).await;

        match self.load_config().await {
            Ok(config) if config.enabled => {
                info!("Monitoring enabled, starting");
                self.start().await;
            }
            Ok(_) => info!("Monitoring disabled"),
            Err(e) => warn!("Failed to read settings at startup: {}", e),
        }
    }

    /// Arm the poll timer from the stored interval.
    ///
    /// Returns whether a timer was armed.
    pub async fn start(&mut self) -> bool {
        if self.state.is_alarming() {
            info!("Alarm is ringing, polling resumes when it stops");
            return false;
        }

        let config = match self.load_config().await {
            Ok(config) => config,
            Err(e) => {
                warn!("Cannot start monitoring: {}", e);
                return false;
            }
        };

        let interval = match ConfigValidator::require_interval(&config) {
            Ok(interval) => interval,
            Err(e) => {
                warn!("Cannot start monitoring: {}", e);
                return false;
            }
        };

        self.scheduler.cancel();
        self.scheduler.schedule(interval);
        self.scheduled = true;
        info!("Monitoring started, polling every {}s", interval.as_secs());
        true
    }

    /// Cancel the poll timer. Idempotent.
    ///
    /// A ringing alarm is left alone: the phase stays Alarming until
    /// playback ends, so a restart issued meanwhile is deferred to
    /// [`Self::on_alarm_stopped`].
    pub fn stop(&mut self) {
        self.scheduler.cancel();
        self.scheduled = false;
        if self.state.apply(PhaseEvent::Stopped) == AlarmPhase::Alarming {
            info!("Monitoring stopped, alarm rings until silenced");
        } else {
            info!("Monitoring stopped");
        }
    }

    /// Stop, then start with the current settings.
    pub async fn restart(&mut self) -> bool {
        self.stop();
        self.start().await
    }

    /// One poll cycle: reload the target tab.
    ///
    /// Returns the reloaded tab, if any. Evaluation follows from the tab's
    /// load-complete event.
    pub async fn on_tick(&mut self) -> Option<TabId> {
        if !self.scheduled {
            debug!("Dropping tick from a cancelled timer");
            return None;
        }
        if self.state.is_alarming() {
            debug!("Alarm is ringing, skipping poll");
            return None;
        }

        let config = match self.load_config().await {
            Ok(config) => config,
            Err(e) => {
                warn!("Skipping poll: {}", e);
                return None;
            }
        };
        let Some(target) = config.target() else {
            warn!("Skipping poll: no target URL configured");
            return None;
        };

        let tabs = match self.browser.list_tabs().await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!("Skipping poll: failed to list tabs: {}", e);
                return None;
            }
        };
        let Some(tab) = tabs.into_iter().find(|t| t.url_contains(target)) else {
            info!("No open tab matches {}, skipping poll", target);
            return None;
        };

        match self.browser.reload(&tab.id).await {
            Ok(()) => {
                debug!("Reloading tab {} ({})", tab.id, tab.url);
                Some(tab.id)
            }
            Err(e) => {
                warn!("Failed to reload tab {}: {}", tab.id, e);
                None
            }
        }
    }

    /// A tab finished loading. Returns the evaluation to run when the tab
    /// is the monitored one.
    pub async fn on_tab_load_complete(
        &mut self,
        tab_id: TabId,
        url: &str,
    ) -> Option<PendingEvaluation> {
        let config = match self.load_config().await {
            Ok(config) => config,
            Err(e) => {
                warn!("Skipping evaluation: {}", e);
                return None;
            }
        };

        let target = config.target()?;
        if !url.contains(target) {
            return None;
        }

        if !config.enabled {
            debug!("Monitoring disabled, skipping evaluation");
            return None;
        }
        if let Err(e) = ConfigValidator::require_evaluable(&config) {
            warn!("Skipping evaluation: {}", e);
            return None;
        }
        if self.state.is_alarming() {
            debug!("Alarm is ringing, skipping evaluation");
            return None;
        }

        self.state.apply(PhaseEvent::EvaluationStarted);
        Some(PendingEvaluation {
            tab_id,
            url: url.to_string(),
            config,
            epoch: self.state.epoch(),
        })
    }

    /// Evaluate page text read for `pending`.
    ///
    /// Read failures count as no match. Results that arrive after an alarm
    /// started or monitoring stopped are discarded.
    pub async fn complete_evaluation(
        &mut self,
        pending: PendingEvaluation,
        content: Result<String, BrowserError>,
    ) -> EvaluationOutcome {
        self.state.apply(PhaseEvent::EvaluationFinished);

        let text = match content {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read tab {}: {}", pending.tab_id, e);
                return EvaluationOutcome::Skipped;
            }
        };

        if pending.epoch != self.state.epoch() || self.state.is_alarming() {
            debug!("Discarding stale evaluation of tab {}", pending.tab_id);
            return EvaluationOutcome::Skipped;
        }

        let result = MatchEvaluator::from_config(&pending.config).evaluate(&text);
        if !result.triggered {
            debug!(
                "{} matches on {}, threshold {}",
                result.total_occurrences,
                pending.url,
                pending.config.effective_min_count()
            );
            return EvaluationOutcome::NoMatch(result);
        }

        info!(
            "Keyword threshold reached on {}: {} matches",
            pending.url, result.total_occurrences
        );
        self.raise_alarm(&pending, &result).await;
        EvaluationOutcome::Alerted(result)
    }

    /// Playback started (or an alert was raised).
    pub async fn on_alarm_started(&mut self) {
        self.state.apply(PhaseEvent::AlarmStarted);
        self.scheduler.cancel();
        self.scheduled = false;
        self.mirror_alarm_playing(true).await;
        self.broadcast(BroadcastMessage::AlarmStarted);
    }

    /// Playback ended. Resumes polling if monitoring is enabled.
    pub async fn on_alarm_stopped(&mut self) {
        self.state.apply(PhaseEvent::AlarmStopped);
        self.mirror_alarm_playing(false).await;
        self.broadcast(BroadcastMessage::AlarmStopped);

        match self.load_config().await {
            Ok(config) if config.enabled => {
                self.start().await;
            }
            Ok(_) => debug!("Monitoring disabled, not resuming"),
            Err(e) => warn!("Cannot resume monitoring: {}", e),
        }
    }

    /// Stop alert playback. Playback reports `ALARM_STOPPED` when done.
    pub async fn silence_alarm(&mut self) {
        info!("Silencing alarm");
        self.broadcast(BroadcastMessage::StopSound);
        if let Err(e) = self.alerts.silence().await {
            warn!("Failed to silence alarm: {}", e);
        }
    }

    /// Dispatch an inbound control message.
    pub async fn handle_control(&mut self, message: ControlMessage) {
        debug!("Control message: {}", message);
        match message {
            ControlMessage::StartMonitor => {
                self.start().await;
            }
            ControlMessage::StopMonitor => self.stop(),
            ControlMessage::RestartMonitor => {
                self.restart().await;
            }
            ControlMessage::AlarmStarted => self.on_alarm_started().await,
            ControlMessage::AlarmStopped => self.on_alarm_stopped().await,
        }
    }

    async fn raise_alarm(&mut self, pending: &PendingEvaluation, result: &MatchResult) {
        self.state.apply(PhaseEvent::AlarmStarted);
        self.scheduler.cancel();
        self.scheduled = false;
        self.broadcast(BroadcastMessage::PlaySound);

        let alert = Alert::new(&self.template.title, &self.template.message)
            .with_url(&pending.url)
            .with_occurrences(result.total_occurrences);

        match self.alerts.send(&alert).await {
            Ok(()) if self.alerts.reports_playback() => {}
            Ok(()) => {
                // Nothing will report the end of playback; the alarm is over.
                self.on_alarm_started().await;
                self.on_alarm_stopped().await;
            }
            Err(e) => {
                error!("Failed to raise alert: {}", e);
                self.on_alarm_stopped().await;
            }
        }
    }

    async fn load_config(&self) -> Result<MonitorConfig, MonitorError> {
        let entries = self.store.get(MonitorConfig::KEYS).await?;
        Ok(MonitorConfig::from_entries(&entries)?)
    }

    async fn mirror_alarm_playing(&self, playing: bool) {
        if let Err(e) = self
            .store
            .set_value(keys::ALARM_PLAYING, Value::Bool(playing))
            .await
        {
            warn!("Failed to record alarm state: {}", e);
        }
    }

    fn broadcast(&self, message: BroadcastMessage) {
        // No subscribers is fine.
        let _ = self.events.send(message);
    }
}
