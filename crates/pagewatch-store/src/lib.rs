//! # pagewatch Store
//!
//! Adapters for the [`ConfigStore`](pagewatch_protocols::ConfigStore)
//! protocol and a watcher that turns external edits of the settings file
//! into control messages.

mod file;
mod memory;
mod watcher;

pub use file::FileConfigStore;
pub use memory::MemoryConfigStore;
pub use watcher::{settings_change, ControlCallback, StoreWatcher};

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
