//! # pagewatch Protocols
//!
//! Interface definitions for the collaborators of the page monitor.
//! Contains only traits, wire messages and shared types - no implementations.
//!
//! ## Core Traits
//!
//! - [`ConfigStore`] - Durable key-value settings store
//! - [`TabBrowser`] - Tab listing, reloading and text extraction
//! - [`Scheduler`] - Single recurring timer
//! - [`AlertChannel`] - Audible/visual alert surface

pub mod alert;
pub mod browser;
pub mod error;
pub mod message;
pub mod scheduler;
pub mod store;
pub mod types;

pub use alert::{Alert, AlertChannel};
pub use browser::TabBrowser;
pub use error::{AlertError, BrowserError, StoreError};
pub use message::{BroadcastMessage, ControlMessage};
pub use scheduler::{FireCallback, Scheduler};
pub use store::{keys, ConfigStore, StoreEntries};
pub use types::{TabId, TabInfo, TabLoaded};
