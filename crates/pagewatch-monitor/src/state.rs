//! Alarm lifecycle state.

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

use tracing::trace;

/// Lifecycle phase of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmPhase {
    /// Waiting for the next tick.
    #[default]
    Idle,
    /// At least one content evaluation is in flight.
    Polling,
    /// An alert is ringing. No polls start and no alerts are raised.
    Alarming,
}

impl std::fmt::Display for AlarmPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlarmPhase::Idle => write!(f, "idle"),
            AlarmPhase::Polling => write!(f, "polling"),
            AlarmPhase::Alarming => write!(f, "alarming"),
        }
    }
}

/// Events that move the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// A content evaluation was started.
    EvaluationStarted,
    /// A content evaluation finished (any outcome).
    EvaluationFinished,
    /// An alert was raised or playback reported it started.
    AlarmStarted,
    /// Playback ended.
    AlarmStopped,
    /// Monitoring was stopped.
    Stopped,
}

/// Process-lifetime alarm state.
///
/// The epoch advances whenever an alarm starts or monitoring stops.
/// Evaluations started under an older epoch are stale and must not raise
/// an alert.
#[derive(Debug, Default)]
pub struct AlarmState {
    phase: AlarmPhase,
    in_flight: usize,
    epoch: u64,
}

impl AlarmState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AlarmPhase {
        self.phase
    }

    pub fn is_alarming(&self) -> bool {
        self.phase == AlarmPhase::Alarming
    }

    /// Evaluations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Apply an event and return the resulting phase.
    pub fn apply(&mut self, event: PhaseEvent) -> AlarmPhase {
        let before = self.phase;
        match event {
            PhaseEvent::EvaluationStarted => {
                if self.phase != AlarmPhase::Alarming {
                    self.in_flight += 1;
                    self.phase = AlarmPhase::Polling;
                }
            }
            PhaseEvent::EvaluationFinished => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if self.phase == AlarmPhase::Polling && self.in_flight == 0 {
                    self.phase = AlarmPhase::Idle;
                }
            }
            PhaseEvent::AlarmStarted => {
                if self.phase != AlarmPhase::Alarming {
                    self.epoch += 1;
                }
                self.in_flight = 0;
                self.phase = AlarmPhase::Alarming;
            }
            PhaseEvent::AlarmStopped => {
                self.in_flight = 0;
                self.phase = AlarmPhase::Idle;
            }
            PhaseEvent::Stopped => {
                self.epoch += 1;
                self.in_flight = 0;
                // A ringing alarm outlives stop; only AlarmStopped ends it.
                if self.phase != AlarmPhase::Alarming {
                    self.phase = AlarmPhase::Idle;
                }
            }
        }
        trace!("{:?}: {} -> {}", event, before, self.phase);
        self.phase
    }
}
