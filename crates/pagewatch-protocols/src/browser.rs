//! Browser protocol: the tab API and the page content reader.

use async_trait::async_trait;

use crate::error::BrowserError;
use crate::types::{TabId, TabInfo};

/// Access to the browser's open tabs.
///
/// Load-completion events are delivered out of band by the implementation
/// (see [`crate::TabLoaded`]); `reload` only issues the request.
#[async_trait]
pub trait TabBrowser: Send + Sync {
    /// List all open tabs.
    async fn list_tabs(&self) -> Result<Vec<TabInfo>, BrowserError>;

    /// Reload a tab without focusing it.
    async fn reload(&self, tab_id: &TabId) -> Result<(), BrowserError>;

    /// Read the tab's visible text content.
    async fn read_text(&self, tab_id: &TabId) -> Result<String, BrowserError>;
}
