//! Config store protocol.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A set of key-value entries read from or written to the store.
pub type StoreEntries = Map<String, Value>;

/// Persisted configuration keys.
pub mod keys {
    pub const ENABLED: &str = "enabled";
    pub const INTERVAL: &str = "interval";
    pub const TARGET_URL: &str = "targetUrl";
    pub const KEYWORDS: &str = "keywords";
    pub const MIN_COUNT: &str = "minCount";
    pub const ALARM_PLAYING: &str = "alarmPlaying";

    /// Every key the monitor reads or writes.
    pub const ALL: &[&str] = &[ENABLED, INTERVAL, TARGET_URL, KEYWORDS, MIN_COUNT, ALARM_PLAYING];
}

/// Durable key-value store holding the monitor settings.
///
/// Reads return only the keys that are present; writes merge into the
/// existing document.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the given keys.
    async fn get(&self, keys: &[&str]) -> Result<StoreEntries, StoreError>;

    /// Merge the given entries into the store.
    async fn set(&self, entries: StoreEntries) -> Result<(), StoreError>;

    /// Read every stored entry.
    async fn get_all(&self) -> Result<StoreEntries, StoreError> {
        self.get(keys::ALL).await
    }

    /// Write a single key.
    async fn set_value(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = StoreEntries::new();
        entries.insert(key.to_string(), value);
        self.set(entries).await
    }
}
