//! Scheduler protocol.

use std::sync::Arc;
use std::time::Duration;

/// Callback invoked once per elapsed interval.
pub type FireCallback = Arc<dyn Fn() + Send + Sync>;

/// A single recurring timer.
pub trait Scheduler: Send + Sync {
    /// Fire every `interval`, replacing any existing timer.
    fn schedule(&self, interval: Duration);

    /// Remove the timer. Idempotent.
    fn cancel(&self);

    /// Number of live timers (0 or 1).
    fn active_timers(&self) -> usize;
}
