//! In-memory settings store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use pagewatch_protocols::{ConfigStore, StoreEntries, StoreError};

/// In-memory store, used by tests and the offline `check` command.
pub struct MemoryConfigStore {
    entries: RwLock<StoreEntries>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(StoreEntries::new()),
        }
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries(entries: StoreEntries) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Copy of everything in the store, including unknown keys.
    pub async fn snapshot(&self) -> StoreEntries {
        self.entries.read().await.clone()
    }
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreEntries, StoreError> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|k| entries.get(*k).map(|v| ((*k).to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: StoreEntries) -> Result<(), StoreError> {
        let mut store = self.entries.write().await;
        store.extend(entries);
        Ok(())
    }
}
