//! [`TabBrowser`] backed by a Chrome DevTools connection.

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use pagewatch_config::BrowserConfig;
use pagewatch_protocols::{BrowserError, TabBrowser, TabId, TabInfo, TabLoaded};

use crate::cdp::client::normalize_endpoint;
use crate::cdp::{
    CdpClient, CdpError, CdpResponse, PageInfo, PageSession, TargetInfo, LOAD_EVENT_FIRED,
    TARGET_CREATED, TARGET_DESTROYED, TARGET_INFO_CHANGED,
};

/// Receives a [`TabLoaded`] each time an attached tab finishes loading.
pub type LoadCallback = Arc<dyn Fn(TabLoaded) + Send + Sync>;

type Sessions = Arc<Mutex<HashMap<TabId, Arc<PageSession>>>>;

/// Tab browser speaking CDP to a running Chrome.
///
/// The connection is opened by [`CdpBrowser::connect`] or on first use, and
/// reopened after Chrome goes away. Every page tab Chrome reports is
/// attached as soon as it appears, so load events are forwarded for tabs
/// the user navigates by hand as well as for tabs the monitor reloads.
pub struct CdpBrowser {
    endpoint: String,
    request_timeout: Duration,
    client: Mutex<Option<Arc<CdpClient>>>,
    sessions: Sessions,
    on_load: LoadCallback,
}

impl CdpBrowser {
    /// Create a browser for the configured endpoint. Does not connect.
    pub fn new(config: &BrowserConfig, on_load: LoadCallback) -> Result<Self, CdpError> {
        let endpoint = normalize_endpoint(&config.endpoint)?;
        Ok(Self {
            endpoint,
            request_timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
            client: Mutex::new(None),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            on_load,
        })
    }

    /// Open the connection now instead of on first use.
    pub async fn connect(&self) -> Result<(), CdpError> {
        self.client().await.map(|_| ())
    }

    async fn client(&self) -> Result<Arc<CdpClient>, CdpError> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref() {
            if client.is_connected() {
                return Ok(client.clone());
            }
            warn!("Lost connection to {}, reconnecting", self.endpoint);
        }

        // Sessions belong to the old connection.
        self.sessions.lock().await.clear();
        *guard = None;

        let client = Arc::new(CdpClient::connect(&self.endpoint, self.request_timeout).await?);
        info!("Connected to browser at {}", self.endpoint);

        match client.discover_targets().await {
            Ok(events) => {
                tokio::spawn(watch_targets(
                    Arc::downgrade(&client),
                    self.sessions.clone(),
                    self.on_load.clone(),
                    events,
                ));
            }
            // Tabs are still attached lazily on reload or read.
            Err(e) => warn!("Target discovery unavailable: {}", e),
        }

        *guard = Some(client.clone());
        Ok(client)
    }

    async fn session(&self, tab_id: &TabId) -> Result<Arc<PageSession>, CdpError> {
        let client = self.client().await?;
        attach_tab(&client, &self.sessions, &self.on_load, tab_id).await
    }

    /// Drop a cached session after a failure that leaves it unusable.
    async fn forget_on_disconnect(&self, tab_id: &TabId, error: &CdpError) {
        if !error.is_disconnect() {
            return;
        }
        let removed = self.sessions.lock().await.remove(tab_id);
        if let Some(session) = removed {
            debug!("Dropping session for tab {}: {}", tab_id, error);
            let client = self.client.lock().await.clone();
            if let Some(client) = client {
                client.detach(&session).await;
            }
        }
    }
}

/// Return the tab's session, attaching first if needed.
async fn attach_tab(
    client: &CdpClient,
    sessions: &Sessions,
    on_load: &LoadCallback,
    tab_id: &TabId,
) -> Result<Arc<PageSession>, CdpError> {
    let mut sessions = sessions.lock().await;
    if let Some(session) = sessions.get(tab_id) {
        return Ok(session.clone());
    }

    let (session, events) = client.attach_page(tab_id.as_str()).await?;
    let session = Arc::new(session);
    debug!("Attached to tab {} ({})", tab_id, session.session_id());

    tokio::spawn(forward_load_events(
        tab_id.clone(),
        session.clone(),
        events,
        on_load.clone(),
    ));

    sessions.insert(tab_id.clone(), session.clone());
    Ok(session)
}

/// A page tab appearing or going away.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TargetChange {
    Opened(TabId),
    Closed(TabId),
}

/// Interpret a browser-level discovery event.
///
/// Created and info-changed events for page targets both map to
/// [`TargetChange::Opened`]; attaching is idempotent.
pub(crate) fn target_change(event: &CdpResponse) -> Option<TargetChange> {
    if event.id.is_some() {
        return None;
    }
    let params = event.params.as_ref()?;
    match event.method.as_deref()? {
        TARGET_CREATED | TARGET_INFO_CHANGED => {
            let info: TargetInfo =
                serde_json::from_value(params.get("targetInfo")?.clone()).ok()?;
            info.is_tab().then(|| TargetChange::Opened(TabId::new(info.target_id)))
        }
        TARGET_DESTROYED => params
            .get("targetId")?
            .as_str()
            .map(|id| TargetChange::Closed(TabId::new(id))),
        _ => None,
    }
}

/// Keep the session map in step with the browser's page tabs.
///
/// Ends when the client is dropped, which closes the event channel.
async fn watch_targets(
    client: Weak<CdpClient>,
    sessions: Sessions,
    on_load: LoadCallback,
    mut events: mpsc::UnboundedReceiver<CdpResponse>,
) {
    while let Some(event) = events.recv().await {
        let Some(change) = target_change(&event) else {
            continue;
        };
        let Some(client) = client.upgrade() else {
            break;
        };
        match change {
            TargetChange::Opened(tab_id) => {
                if let Err(e) = attach_tab(&client, &sessions, &on_load, &tab_id).await {
                    debug!("Could not attach to new tab {}: {}", tab_id, e);
                }
            }
            TargetChange::Closed(tab_id) => {
                let removed = sessions.lock().await.remove(&tab_id);
                if let Some(session) = removed {
                    debug!("Tab {} closed", tab_id);
                    client.detach(&session).await;
                }
            }
        }
    }
    debug!("Target discovery stopped");
}

/// Turn a session's load events into [`TabLoaded`] callbacks.
async fn forward_load_events(
    tab_id: TabId,
    session: Arc<PageSession>,
    mut events: mpsc::UnboundedReceiver<CdpResponse>,
    on_load: LoadCallback,
) {
    while let Some(event) = events.recv().await {
        if !event.is_event(LOAD_EVENT_FIRED) {
            continue;
        }
        match session.location_href().await {
            Ok(url) => {
                debug!("Tab {} loaded {}", tab_id, url);
                on_load(TabLoaded {
                    tab_id: tab_id.clone(),
                    url,
                });
            }
            Err(e) => warn!("Tab {} loaded but its URL could not be read: {}", tab_id, e),
        }
    }
    debug!("Event stream for tab {} closed", tab_id);
}

/// Regular tabs from a `/json/list` response.
pub(crate) fn tabs_from_pages(pages: Vec<PageInfo>) -> Vec<TabInfo> {
    pages
        .into_iter()
        .filter(PageInfo::is_tab)
        .map(|page| TabInfo {
            id: TabId::new(page.id),
            url: page.url,
            title: page.title,
        })
        .collect()
}

#[async_trait]
impl TabBrowser for CdpBrowser {
    async fn list_tabs(&self) -> Result<Vec<TabInfo>, BrowserError> {
        let client = self.client().await?;
        let pages = client.list_pages().await?;
        Ok(tabs_from_pages(pages))
    }

    async fn reload(&self, tab_id: &TabId) -> Result<(), BrowserError> {
        let result = match self.session(tab_id).await {
            Ok(session) => session.reload().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                self.forget_on_disconnect(tab_id, &e).await;
                Err(match e {
                    CdpError::Timeout(msg) => BrowserError::Timeout(msg),
                    CdpError::PageNotFound(id) => BrowserError::TabNotFound(id),
                    other => BrowserError::ReloadFailed(other.to_string()),
                })
            }
        }
    }

    async fn read_text(&self, tab_id: &TabId) -> Result<String, BrowserError> {
        let result = match self.session(tab_id).await {
            Ok(session) => session.inner_text().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(text) => Ok(text),
            Err(e) => {
                self.forget_on_disconnect(tab_id, &e).await;
                Err(match e {
                    CdpError::Timeout(msg) => BrowserError::Timeout(msg),
                    CdpError::PageNotFound(id) => BrowserError::TabNotFound(id),
                    other => BrowserError::ContentReadFailed(other.to_string()),
                })
            }
        }
    }
}
