//! Tab watcher: the page-load signal.
//!
//! Polls the DevTools target list and emits a `TabEvent` whenever a page
//! target is first seen on a URL, or moves to a new one. By the time a URL
//! shows up in the target list the navigation has settled, so every emitted
//! event carries `Complete` status — the polling rendition of a tabs
//! `onUpdated(status == "complete")` listener.

use sessionbridge_core::{TabEvent, TabStatus};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::targets::DevtoolsEndpoint;

pub struct TabWatcher {
    endpoint: DevtoolsEndpoint,
    poll_interval: Duration,
    events_tx: mpsc::Sender<TabEvent>,
}

impl TabWatcher {
    pub fn new(
        endpoint: DevtoolsEndpoint,
        poll_interval_ms: u64,
        events_tx: mpsc::Sender<TabEvent>,
    ) -> Self {
        Self {
            endpoint,
            poll_interval: Duration::from_millis(poll_interval_ms.max(500)),
            events_tx,
        }
    }

    pub async fn run_loop(self, mut shutdown: broadcast::Receiver<()>) {
        info!(interval = ?self.poll_interval, "Tab watcher started");

        // Last URL seen per tab, to emit only on change.
        let mut last_url: HashMap<String, String> = HashMap::new();
        let mut browser_reachable = true;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Tab watcher stopping");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {
                    let targets = match self.endpoint.targets().await {
                        Ok(targets) => {
                            if !browser_reachable {
                                info!("Browser debugging endpoint reachable again");
                                browser_reachable = true;
                            }
                            targets
                        }
                        Err(e) => {
                            // Log the transition once, not every poll.
                            if browser_reachable {
                                warn!(error = %e, "Browser debugging endpoint unreachable");
                                browser_reachable = false;
                            }
                            continue;
                        }
                    };

                    let mut seen: HashMap<String, String> = HashMap::new();
                    for target in targets.into_iter().filter(|t| t.is_page()) {
                        seen.insert(target.id.clone(), target.url.clone());

                        let changed = last_url.get(&target.id) != Some(&target.url);
                        if !changed || target.url.is_empty() {
                            continue;
                        }
                        debug!(tab = %target.id, url = %target.url, "Tab navigation observed");

                        let event = TabEvent {
                            tab_id: target.id,
                            status: TabStatus::Complete,
                            url: target.url,
                        };
                        if self.events_tx.send(event).await.is_err() {
                            info!("Event receiver dropped, tab watcher stopping");
                            return;
                        }
                    }
                    // Forget closed tabs so a reopened id re-emits.
                    last_url = seen;
                }
            }
        }
    }
}
