use super::*;

fn noop_load() -> LoadCallback {
    Arc::new(|_| {})
}

fn page(id: &str, page_type: &str, url: &str) -> PageInfo {
    PageInfo {
        id: id.to_string(),
        page_type: page_type.to_string(),
        title: format!("title {}", id),
        url: url.to_string(),
        web_socket_debugger_url: None,
    }
}

#[test]
fn test_new_normalizes_endpoint() {
    let config = BrowserConfig {
        endpoint: "http://127.0.0.1:9222/".to_string(),
        request_timeout_secs: 5,
    };
    let browser = CdpBrowser::new(&config, noop_load()).unwrap();
    assert_eq!(browser.endpoint, "http://127.0.0.1:9222");
}

#[test]
fn test_new_rejects_websocket_endpoint() {
    let config = BrowserConfig {
        endpoint: "ws://127.0.0.1:9222/devtools/browser/abc".to_string(),
        request_timeout_secs: 5,
    };
    assert!(CdpBrowser::new(&config, noop_load()).is_err());
}

#[test]
fn test_tabs_from_pages_keeps_only_tabs() {
    let tabs = tabs_from_pages(vec![
        page("A", "page", "https://jobs.example.com/"),
        page("B", "service_worker", "https://jobs.example.com/sw.js"),
        page("C", "background_page", "chrome-extension://x/bg.html"),
        page("D", "page", "https://mail.example.com/"),
    ]);

    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[0].id, TabId::new("A"));
    assert_eq!(tabs[0].url, "https://jobs.example.com/");
    assert_eq!(tabs[0].title, "title A");
    assert_eq!(tabs[1].id, TabId::new("D"));
}

#[tokio::test]
async fn test_unreachable_browser_is_unavailable() {
    let config = BrowserConfig {
        endpoint: "http://127.0.0.1:1".to_string(),
        request_timeout_secs: 2,
    };
    let browser = CdpBrowser::new(&config, noop_load()).unwrap();

    let err = browser.list_tabs().await.unwrap_err();
    assert!(matches!(err, BrowserError::Unavailable(_)));

    let err = browser.read_text(&TabId::new("A")).await.unwrap_err();
    assert!(matches!(err, BrowserError::ContentReadFailed(_)));
    assert!(browser.sessions.lock().await.is_empty());
}

#[tokio::test]
async fn test_connect_unreachable_fails() {
    let config = BrowserConfig {
        endpoint: "http://127.0.0.1:1".to_string(),
        request_timeout_secs: 2,
    };
    let browser = CdpBrowser::new(&config, noop_load()).unwrap();
    assert!(matches!(
        browser.connect().await,
        Err(CdpError::ChromeNotAvailable(_))
    ));
}

fn event(value: serde_json::Value) -> CdpResponse {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_target_change_opened_for_new_tab() {
    let created = event(serde_json::json!({
        "method": "Target.targetCreated",
        "params": {"targetInfo": {
            "targetId": "T1", "type": "page", "title": "", "url": "about:blank", "attached": false
        }}
    }));
    assert_eq!(
        target_change(&created),
        Some(TargetChange::Opened(TabId::new("T1")))
    );
}

#[test]
fn test_target_change_opened_on_navigation() {
    let changed = event(serde_json::json!({
        "method": "Target.targetInfoChanged",
        "params": {"targetInfo": {
            "targetId": "T1", "type": "page", "url": "https://jobs.example.com/tasks"
        }}
    }));
    assert_eq!(
        target_change(&changed),
        Some(TargetChange::Opened(TabId::new("T1")))
    );
}

#[test]
fn test_target_change_closed() {
    let destroyed = event(serde_json::json!({
        "method": "Target.targetDestroyed",
        "params": {"targetId": "T1"}
    }));
    assert_eq!(
        target_change(&destroyed),
        Some(TargetChange::Closed(TabId::new("T1")))
    );
}

#[test]
fn test_target_change_ignores_other_events() {
    let worker = event(serde_json::json!({
        "method": "Target.targetCreated",
        "params": {"targetInfo": {"targetId": "W1", "type": "service_worker"}}
    }));
    assert_eq!(target_change(&worker), None);

    let attached = event(serde_json::json!({
        "method": "Target.attachedToTarget",
        "params": {"sessionId": "S1", "targetInfo": {"targetId": "T1", "type": "page"}}
    }));
    assert_eq!(target_change(&attached), None);

    let reply = event(serde_json::json!({"id": 4, "result": {}}));
    assert_eq!(target_change(&reply), None);
}
