//! End-to-end tests of the monitor actor with a real interval scheduler.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::broadcast;

use pagewatch_monitor::{AlarmPhase, MonitorActor, MonitorController, MonitorHandle, PlaybackSink};
use pagewatch_protocols::{
    keys, Alert, AlertChannel, AlertError, BroadcastMessage, BrowserError, ConfigStore,
    ControlMessage, StoreEntries, TabBrowser, TabId, TabInfo, TabLoaded,
};
use pagewatch_runloop::IntervalScheduler;
use pagewatch_store::MemoryConfigStore;

const TARGET: &str = "https://jobs.example.com/tasks";

/// Browser whose reloads complete instantly.
struct PageBrowser {
    text: Mutex<String>,
    reloads: AtomicUsize,
    on_load: Arc<dyn Fn(TabLoaded) + Send + Sync>,
}

#[async_trait]
impl TabBrowser for PageBrowser {
    async fn list_tabs(&self) -> Result<Vec<TabInfo>, BrowserError> {
        Ok(vec![
            TabInfo::new("news", "https://news.example.org"),
            TabInfo::new("jobs", TARGET),
        ])
    }

    async fn reload(&self, tab_id: &TabId) -> Result<(), BrowserError> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        (self.on_load)(TabLoaded {
            tab_id: tab_id.clone(),
            url: TARGET.to_string(),
        });
        Ok(())
    }

    async fn read_text(&self, _tab_id: &TabId) -> Result<String, BrowserError> {
        Ok(self.text.lock().clone())
    }
}

/// Playback that rings until silenced.
struct RingingAlerts {
    sink: PlaybackSink,
    sent: AtomicUsize,
}

#[async_trait]
impl AlertChannel for RingingAlerts {
    fn name(&self) -> &str {
        "ringing"
    }

    async fn send(&self, _alert: &Alert) -> Result<(), AlertError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        (self.sink)(ControlMessage::AlarmStarted);
        Ok(())
    }

    async fn silence(&self) -> Result<(), AlertError> {
        (self.sink)(ControlMessage::AlarmStopped);
        Ok(())
    }

    fn reports_playback(&self) -> bool {
        true
    }
}

struct Harness {
    handle: MonitorHandle,
    store: Arc<MemoryConfigStore>,
    browser: Arc<PageBrowser>,
    alerts: Arc<RingingAlerts>,
    events: broadcast::Receiver<BroadcastMessage>,
    task: tokio::task::JoinHandle<MonitorController>,
}

fn settings(enabled: bool) -> StoreEntries {
    match json!({
        "enabled": enabled,
        "interval": 5,
        "targetUrl": "jobs.example.com",
        "keywords": ["task"],
        "minCount": 1,
    }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn spawn_monitor(entries: StoreEntries, page_text: &str) -> Harness {
    let (handle, inbox) = MonitorHandle::channel();

    let store = Arc::new(MemoryConfigStore::with_entries(entries));
    let browser = Arc::new(PageBrowser {
        text: Mutex::new(page_text.to_string()),
        reloads: AtomicUsize::new(0),
        on_load: handle.load_callback(),
    });
    let alerts = Arc::new(RingingAlerts {
        sink: handle.control_callback(),
        sent: AtomicUsize::new(0),
    });
    let scheduler = Arc::new(IntervalScheduler::new(handle.tick_callback()));
    let (tx, events) = broadcast::channel(32);

    let controller = MonitorController::new(
        store.clone(),
        browser.clone(),
        scheduler,
        alerts.clone(),
        tx,
    );
    let task = tokio::spawn(MonitorActor::new(controller, handle.clone(), inbox).run());

    Harness {
        handle,
        store,
        browser,
        alerts,
        events,
        task,
    }
}

async fn next_event(events: &mut broadcast::Receiver<BroadcastMessage>) -> BroadcastMessage {
    tokio::time::timeout(Duration::from_secs(60), events.recv())
        .await
        .expect("no event within timeout")
        .expect("event bus closed")
}

#[tokio::test(start_paused = true)]
async fn test_match_rings_until_silenced_then_resumes() {
    let mut h = spawn_monitor(settings(true), "New task posted");

    assert_eq!(next_event(&mut h.events).await, BroadcastMessage::PlaySound);
    assert_eq!(next_event(&mut h.events).await, BroadcastMessage::AlarmStarted);
    assert_eq!(h.alerts.sent.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.store.get(&[keys::ALARM_PLAYING]).await.unwrap().get(keys::ALARM_PLAYING),
        Some(&json!(true))
    );

    // While ringing, no further polls happen.
    let reloads = h.browser.reloads.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.browser.reloads.load(Ordering::SeqCst), reloads);
    assert_eq!(h.alerts.sent.load(Ordering::SeqCst), 1);

    *h.browser.text.lock() = "nothing new".to_string();
    h.handle.silence().unwrap();

    assert_eq!(next_event(&mut h.events).await, BroadcastMessage::StopSound);
    assert_eq!(next_event(&mut h.events).await, BroadcastMessage::AlarmStopped);

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(h.browser.reloads.load(Ordering::SeqCst), reloads + 2);

    h.handle.shutdown().unwrap();
    let controller = h.task.await.unwrap();
    assert_eq!(controller.phase(), AlarmPhase::Idle);
    assert_eq!(h.alerts.sent.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_monitor_waits_for_start() {
    let h = spawn_monitor(settings(false), "task");

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(h.browser.reloads.load(Ordering::SeqCst), 0);

    h.store.set_value(keys::ENABLED, json!(true)).await.unwrap();
    assert!(h.handle.dispatch(&json!({ "type": "START_MONITOR" })));

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(h.browser.reloads.load(Ordering::SeqCst), 1);

    h.handle.shutdown().unwrap();
    h.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stop_message_halts_polling() {
    let h = spawn_monitor(settings(true), "no keywords here");

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(h.browser.reloads.load(Ordering::SeqCst), 2);

    h.handle.control(ControlMessage::StopMonitor).unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.browser.reloads.load(Ordering::SeqCst), 2);
    assert_eq!(h.alerts.sent.load(Ordering::SeqCst), 0);

    h.handle.shutdown().unwrap();
    h.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unknown_messages_are_ignored() {
    let h = spawn_monitor(settings(false), "");

    assert!(!h.handle.dispatch(&json!({ "type": "PLAY_SOUND" })));
    assert!(!h.handle.dispatch(&json!({ "kind": "START_MONITOR" })));

    h.handle.shutdown().unwrap();
    let controller = h.task.await.unwrap();
    assert_eq!(controller.phase(), AlarmPhase::Idle);
    assert!(h.handle.is_closed());
}
