//! Shared browser-facing types.

use serde::{Deserialize, Serialize};

/// Opaque identifier of a browser tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An open tab as reported by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl TabInfo {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: TabId::new(id),
            url: url.into(),
            title: String::new(),
        }
    }

    /// Whether this tab's URL contains the given substring.
    pub fn url_contains(&self, needle: &str) -> bool {
        !needle.is_empty() && self.url.contains(needle)
    }
}

/// A tab finished loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabLoaded {
    pub tab_id: TabId,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_contains() {
        let tab = TabInfo::new("1", "https://jobs.example.com/board?page=2");
        assert!(tab.url_contains("jobs.example.com"));
        assert!(!tab.url_contains("other.example.com"));
    }

    #[test]
    fn test_url_contains_empty_needle() {
        let tab = TabInfo::new("1", "https://example.com");
        assert!(!tab.url_contains(""));
    }

    #[test]
    fn test_tab_id_serializes_transparently() {
        let id = TabId::new("ABC123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ABC123\"");
        assert_eq!(id.to_string(), "ABC123");
    }
}
