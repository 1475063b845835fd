//! Page session: CDP commands scoped to one attached tab.

use serde_json::{json, Value};
use tracing::debug;

use super::client::Transport;
use super::error::CdpError;

/// Script that yields the page's visible text.
const INNER_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

/// A session attached to a single page/target.
pub struct PageSession {
    /// Target ID.
    target_id: String,
    /// Session ID for this target.
    session_id: String,
    transport: Transport,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, transport: Transport) -> Self {
        Self {
            target_id,
            session_id,
            transport,
        }
    }

    /// Get target ID.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Get session ID.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Enable the Page (load events) and Runtime (evaluate) domains.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        Ok(())
    }

    /// Reload the page.
    ///
    /// Returns once the browser accepts the command; completion arrives
    /// later as a `Page.loadEventFired` event.
    pub async fn reload(&self) -> Result<(), CdpError> {
        self.call("Page.reload", Some(json!({"ignoreCache": false})))
            .await?;
        debug!("Reload issued for {}", self.target_id);
        Ok(())
    }

    /// Evaluate JavaScript expression.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Visible text of the document body. Empty when there is no body.
    pub async fn inner_text(&self) -> Result<String, CdpError> {
        let value = self.evaluate(INNER_TEXT_SCRIPT).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Current `location.href`.
    pub async fn location_href(&self) -> Result<String, CdpError> {
        let value = self.evaluate("location.href").await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CdpError::InvalidResponse("location.href is not a string".to_string()))
    }
}
