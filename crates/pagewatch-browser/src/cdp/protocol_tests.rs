use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 7,
        method: "Page.reload".to_string(),
        params: None,
        session_id: Some("S1".to_string()),
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["method"], "Page.reload");
    assert_eq!(json["sessionId"], "S1");
    assert!(json.get("params").is_none());
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"frameId": "abc"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
    assert!(!resp.is_event(LOAD_EVENT_FIRED));
}

#[test]
fn test_load_event_deserialize() {
    let json = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}, "sessionId": "S1"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert!(resp.is_event(LOAD_EVENT_FIRED));
    assert_eq!(resp.session_id.as_deref(), Some("S1"));
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"[
        {
            "id": "page123",
            "type": "page",
            "title": "Tasks",
            "url": "https://jobs.example.com/tasks",
            "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
        },
        {
            "id": "worker1",
            "type": "service_worker",
            "url": "https://jobs.example.com/sw.js"
        }
    ]"#;
    let pages: Vec<PageInfo> = serde_json::from_str(json).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].is_tab());
    assert!(!pages[1].is_tab());
    assert_eq!(pages[1].title, "");
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/126.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.browser, "Chrome/126.0.0.0");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}

#[test]
fn test_target_info_deserialize() {
    let json = r#"{
        "targetId": "T1",
        "type": "page",
        "title": "Tasks",
        "url": "https://jobs.example.com/tasks",
        "attached": false,
        "canAccessOpener": false
    }"#;
    let info: TargetInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.target_id, "T1");
    assert!(info.is_tab());

    let worker: TargetInfo =
        serde_json::from_str(r#"{"targetId": "W1", "type": "service_worker"}"#).unwrap();
    assert!(!worker.is_tab());
    assert_eq!(worker.url, "");
}
