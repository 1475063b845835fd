//! Monitor settings as persisted in the config store.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pagewatch_protocols::{keys, StoreEntries};

use crate::error::ConfigError;

/// Smallest accepted polling interval, in seconds.
pub const MIN_INTERVAL_SECS: u64 = 5;

/// Monitor settings.
///
/// Field names map onto the persisted store keys. Missing keys take their
/// defaults, so a partially written store still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Whether monitoring should run at all.
    #[serde(default)]
    pub enabled: bool,

    /// Polling cadence in seconds.
    #[serde(rename = "interval", default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u64>,

    /// Substring identifying the monitored tab.
    #[serde(rename = "targetUrl", default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,

    /// Keywords to count on the page.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Summed occurrence count required to trigger an alert.
    #[serde(rename = "minCount", default, skip_serializing_if = "Option::is_none")]
    pub min_match_count: Option<u32>,
}

impl MonitorConfig {
    /// Store keys that make up the settings.
    pub const KEYS: &'static [&'static str] = &[
        keys::ENABLED,
        keys::INTERVAL,
        keys::TARGET_URL,
        keys::KEYWORDS,
        keys::MIN_COUNT,
    ];

    /// Build settings from raw store entries.
    ///
    /// Unknown keys (including the `alarmPlaying` mirror) are ignored and
    /// `null` values count as absent.
    pub fn from_entries(entries: &StoreEntries) -> Result<Self, ConfigError> {
        let mut object = serde_json::Map::new();
        for key in Self::KEYS {
            if let Some(value) = entries.get(*key) {
                if !value.is_null() {
                    object.insert((*key).to_string(), value.clone());
                }
            }
        }
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Convert back into store entries.
    pub fn to_entries(&self) -> StoreEntries {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => StoreEntries::new(),
        }
    }

    /// Polling interval, if one is configured and valid.
    pub fn interval(&self) -> Option<Duration> {
        self.interval_seconds
            .filter(|secs| *secs >= MIN_INTERVAL_SECS)
            .map(Duration::from_secs)
    }

    /// The target URL substring, if non-empty.
    pub fn target(&self) -> Option<&str> {
        self.target_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Keywords with blank entries removed.
    pub fn active_keywords(&self) -> Vec<&str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .filter(|k| !k.trim().is_empty())
            .collect()
    }

    /// Threshold to use for matching. Absent or zero counts as 1.
    pub fn effective_min_count(&self) -> usize {
        self.min_match_count.unwrap_or(1).max(1) as usize
    }
}
