use anyhow::Result;
use sessionbridge_browser::{CdpCapabilities, DevtoolsEndpoint, TabWatcher};
use sessionbridge_core::{Config, Paths};
use sessionbridge_engine::{EventRouter, SyncEngine, WebhookNotifier};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

pub async fn execute() -> Result<()> {
    let paths = Paths::new();
    let config = Config::load(&paths)?;

    if config.webhook.endpoint.is_none() {
        warn!("No webhook endpoint configured; changes will be stored but not forwarded");
    }

    let store = super::open_state_store(&config, &paths);
    let endpoint = DevtoolsEndpoint::new(&config.browser);
    let capabilities = Arc::new(CdpCapabilities::new(endpoint.clone()));

    let notifier = Arc::new(WebhookNotifier::new(config.webhook.clone(), store.clone()));
    let engine = SyncEngine::new(store.clone(), capabilities.clone(), notifier);
    let router = EventRouter::new(engine, store, capabilities);

    let (events_tx, mut events_rx) = mpsc::channel(64);
    let (shutdown_tx, _) = broadcast::channel(1);

    let watcher = TabWatcher::new(endpoint, config.browser.poll_interval_ms, events_tx);
    let watcher_handle = tokio::spawn(watcher.run_loop(shutdown_tx.subscribe()));

    info!(
        host = %config.browser.debug_host,
        port = config.browser.debug_port,
        "sessionbridge daemon running, press ctrl-c to stop"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            event = events_rx.recv() => {
                let Some(event) = event else { break };
                // One failed event chain never takes the daemon down.
                if let Err(e) = router.handle_event(&event).await {
                    error!(error = %e, url = %event.url, "Event chain failed");
                }
            }
        }
    }

    let _ = shutdown_tx.send(());
    let _ = watcher_handle.await;
    Ok(())
}
