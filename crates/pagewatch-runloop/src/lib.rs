//! # pagewatch RunLoop
//!
//! Event sources that feed the monitor:
//!
//! - [`IntervalScheduler`] - the single recurring poll timer
//! - [`SignalSource`] - OS signals mapped onto daemon actions

mod error;
mod scheduler;
mod signal;

pub use error::RunLoopError;
pub use scheduler::IntervalScheduler;
pub use signal::{SignalEvent, SignalSender, SignalSource};
