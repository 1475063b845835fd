//! JSON file backed settings store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use pagewatch_protocols::{ConfigStore, StoreEntries, StoreError};

/// Settings persisted as a single JSON object:
/// ```text
/// {
///   "enabled": true,
///   "interval": 30,
///   "targetUrl": "example.com/tasks",
///   "keywords": ["task"],
///   "minCount": 1,
///   "alarmPlaying": false
/// }
/// ```
///
/// Writes are read-modify-write under a lock and land through a temp file
/// rename, so readers never observe a half-written document.
pub struct FileConfigStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileConfigStore {
    /// Open (or prepare) the store at `path`, creating parent directories.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        debug!("FileConfigStore opened at {:?}", path);

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<StoreEntries, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreEntries::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(StoreEntries::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Corrupt(format!(
                "expected a JSON object in {:?}, found {}",
                self.path,
                json_kind(&other)
            ))),
        }
    }

    async fn write_document(&self, entries: &StoreEntries) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreEntries, StoreError> {
        let document = self.read_document().await?;
        Ok(keys
            .iter()
            .filter_map(|k| document.get(*k).map(|v| ((*k).to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: StoreEntries) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        let changed: Vec<String> = entries.keys().cloned().collect();
        document.extend(entries);
        self.write_document(&document).await?;
        debug!("Store updated: {}", changed.join(", "));
        Ok(())
    }
}
