//! Interval scheduler.
//!
//! One recurring timer at a time. Each timer runs in its own task, driven
//! by `tokio::time::interval_at` and stopped through a cancellation token.
//! Ticks missed while the process was suspended are skipped, not replayed.

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pagewatch_protocols::{FireCallback, Scheduler};

/// A live timer.
struct TimerHandle {
    token: CancellationToken,
    interval: Duration,
}

/// [`Scheduler`] backed by a tokio interval.
pub struct IntervalScheduler {
    on_fire: FireCallback,
    current: Mutex<Option<TimerHandle>>,
}

impl IntervalScheduler {
    /// Create a scheduler that invokes `on_fire` on every tick.
    pub fn new(on_fire: FireCallback) -> Self {
        Self {
            on_fire,
            current: Mutex::new(None),
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule(&self, interval: Duration) {
        let mut current = self.current.lock();
        if let Some(old) = current.take() {
            old.token.cancel();
        }

        if interval.is_zero() {
            warn!("Refusing to schedule a zero interval");
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Cannot schedule timer outside a tokio runtime: {}", e);
                return;
            }
        };

        let token = CancellationToken::new();
        runtime.spawn(run_timer(interval, token.clone(), self.on_fire.clone()));

        *current = Some(TimerHandle { token, interval });
        debug!("Timer scheduled every {:?}", interval);
    }

    fn cancel(&self) {
        if let Some(old) = self.current.lock().take() {
            old.token.cancel();
            debug!("Timer every {:?} cancelled", old.interval);
        }
    }

    fn active_timers(&self) -> usize {
        usize::from(self.current.lock().is_some())
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        if let Some(old) = self.current.get_mut().take() {
            old.token.cancel();
        }
    }
}

async fn run_timer(
    interval: Duration,
    token: CancellationToken,
    on_fire: FireCallback,
) {
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => on_fire(),
        }
    }
}
