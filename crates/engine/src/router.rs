//! Event routing: platform classification of page-load events and the
//! per-event pipeline (identifier capture, then cookie syncs).

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sessionbridge_core::{Platform, Result, TabEvent, TabStatus};
use sessionbridge_storage::StateStore;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::capture::capture_identifier;
use crate::sync::SyncEngine;

static LINKEDIN_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://\w{2,5}\.linkedin\.com/").expect("linkedin url regex is valid")
});
static BULLHORN_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://app\.bullhornstaffing\.com/").expect("bullhorn url regex is valid")
});

/// Map a tab URL to the platform it belongs to, if any.
pub fn classify_url(url: &str) -> Option<Platform> {
    if LINKEDIN_URL.is_match(url) {
        Some(Platform::Linkedin)
    } else if BULLHORN_URL.is_match(url) {
        Some(Platform::Bullhorn)
    } else {
        None
    }
}

/// In-page extraction capability: scrape the profile identifier out of the
/// page's embedded structured data. Empty string when the page has none.
#[async_trait]
pub trait IdentifierSource: Send + Sync {
    async fn public_identifier(&self, tab_id: &str) -> Result<String>;
}

pub struct EventRouter {
    engine: SyncEngine,
    store: Arc<StateStore>,
    identifiers: Arc<dyn IdentifierSource>,
}

impl EventRouter {
    pub fn new(
        engine: SyncEngine,
        store: Arc<StateStore>,
        identifiers: Arc<dyn IdentifierSource>,
    ) -> Self {
        Self {
            engine,
            store,
            identifiers,
        }
    }

    /// Process one page-load event. For linkedin pages the identifier capture
    /// completes before any cookie sync starts, since dispatch reads the
    /// identifier from storage. Scrape failures degrade to a plain sync pass;
    /// storage failures propagate.
    pub async fn handle_event(&self, event: &TabEvent) -> Result<()> {
        if event.status != TabStatus::Complete {
            return Ok(());
        }
        let Some(platform) = classify_url(&event.url) else {
            return Ok(());
        };
        debug!(platform = %platform, url = %event.url, "Page load on tracked platform");

        if platform == Platform::Linkedin {
            match self.identifiers.public_identifier(&event.tab_id).await {
                Ok(identifier) => capture_identifier(&self.store, &identifier).await?,
                Err(e) => {
                    warn!(error = %e, tab = %event.tab_id, "Identifier scrape failed, syncing cookies anyway");
                }
            }
        }

        self.engine.sync_platform(platform).await
    }
}
