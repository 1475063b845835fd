//! Foreground daemon: wires the store, browser, alerts and scheduler into
//! the monitor actor and feeds it OS signals.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use pagewatch_browser::CdpBrowser;
use pagewatch_config::AppConfig;
use pagewatch_monitor::{AlertManager, AlertTemplate, MonitorActor, MonitorController, MonitorHandle};
use pagewatch_protocols::{
    AlertChannel, BroadcastMessage, ConfigStore, ControlMessage, Scheduler, TabBrowser,
};
use pagewatch_runloop::{IntervalScheduler, SignalEvent, SignalSource};
use pagewatch_store::{FileConfigStore, StoreWatcher};

/// Run the monitor until SIGINT/SIGTERM.
pub(crate) async fn run_monitor(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting pagewatch v{}", env!("CARGO_PKG_VERSION"));

    let store_path = config.store_path();
    let store: Arc<dyn ConfigStore> = Arc::new(FileConfigStore::open(&store_path).await?);
    info!("Settings store: {}", store_path.display());

    let (handle, inbox) = MonitorHandle::channel();

    let browser = CdpBrowser::new(&config.browser, handle.load_callback())?;
    info!("Browser endpoint: {}", config.browser.endpoint);
    // Connect up front so page loads are seen before the first poll.
    if let Err(e) = browser.connect().await {
        warn!("Browser not reachable yet, retrying on first poll: {}", e);
    }
    let browser: Arc<dyn TabBrowser> = Arc::new(browser);

    let alerts = AlertManager::from_config(&config, handle.control_callback());
    info!("Alert channels: {}", alerts.channel_names().join(", "));
    let alerts: Arc<dyn AlertChannel> = Arc::new(alerts);

    let scheduler: Arc<dyn Scheduler> = Arc::new(IntervalScheduler::new(handle.tick_callback()));

    let (events, _) = broadcast::channel(16);
    let controller = MonitorController::new(store.clone(), browser, scheduler, alerts, events)
        .with_template(AlertTemplate {
            title: config.alert.title.clone(),
            message: config.alert.message.clone(),
        });
    tokio::spawn(log_broadcasts(controller.subscribe()));

    let actor = MonitorActor::new(controller, handle.clone(), inbox);
    let mut monitor_task = tokio::spawn(actor.run());

    let watcher = if config.store.watch {
        match StoreWatcher::spawn(&store_path, store.clone(), handle.control_callback()).await {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                warn!("Settings changes will need SIGHUP: {}", e);
                None
            }
        }
    } else {
        None
    };

    // The sender half must stay alive for the stream to stay open.
    let (_signal_tx, mut signals) = SignalSource::listen()?;
    info!("pagewatch ready (SIGHUP restarts, SIGUSR1 silences the alarm)");

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(SignalEvent::Reload) => {
                    if let Err(e) = handle.control(ControlMessage::RestartMonitor) {
                        error!("Failed to restart monitor: {}", e);
                    }
                }
                Some(SignalEvent::User1) => {
                    if let Err(e) = handle.silence() {
                        error!("Failed to silence alarm: {}", e);
                    }
                }
                Some(SignalEvent::Shutdown) | None => break,
            },
            result = &mut monitor_task => {
                if let Err(e) = result {
                    error!("Monitor task failed: {}", e);
                }
                if let Some(watcher) = watcher {
                    watcher.stop().await;
                }
                return Ok(());
            }
        }
    }

    info!("Shutting down...");
    if let Some(watcher) = watcher {
        watcher.stop().await;
    }
    if handle.shutdown().is_ok() {
        let controller = monitor_task.await?;
        info!("Monitor stopped in phase {}", controller.phase());
    }
    Ok(())
}

async fn log_broadcasts(mut rx: broadcast::Receiver<BroadcastMessage>) {
    loop {
        match rx.recv().await {
            Ok(message) => info!("Broadcast: {}", message.as_str()),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Broadcast log lagged, {} messages skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
