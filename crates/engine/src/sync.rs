//! Change-detection & sync engine.
//!
//! Retrieves one cookie through the cookie-access capability, compares the
//! raw value against the stored platform record, writes only on creation or
//! change, and forwards linkedin-sourced changes to the notification sink.
//! Bullhorn is only ever the correlation key and never triggers a
//! notification.

use async_trait::async_trait;
use sessionbridge_core::{CookieEntry, CookieSpec, Error, Platform, RawCookie, Result};
use sessionbridge_storage::StateStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Cookie-access capability: resolve a named cookie within a URL scope.
/// `None` means the browser holds no such cookie (user not logged in).
#[async_trait]
pub trait CookieSource: Send + Sync {
    async fn get(&self, spec: &CookieSpec) -> Result<Option<RawCookie>>;
}

/// Receiver for change notifications. The webhook dispatcher implements
/// this; tests substitute a recording sink.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, cookie_name: &str, entry: &CookieEntry);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Field was absent (or the whole record was) and has been created.
    Created,
    /// Field existed with a different raw value and has been overwritten.
    Updated,
    /// Raw value matches the stored one; no write, no notification.
    Unchanged,
}

impl SyncOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, SyncOutcome::Unchanged)
    }
}

pub struct SyncEngine {
    store: Arc<StateStore>,
    cookies: Arc<dyn CookieSource>,
    sink: Arc<dyn NotificationSink>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<StateStore>,
        cookies: Arc<dyn CookieSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            cookies,
            sink,
        }
    }

    /// Sync one cookie for a platform. Fails with `CookieNotFound` when the
    /// capability returns nothing; callers treat that as "skip this sync".
    pub async fn sync_cookie(&self, platform: Platform, spec: &CookieSpec) -> Result<SyncOutcome> {
        let cookie = self
            .cookies
            .get(spec)
            .await?
            .ok_or_else(|| Error::CookieNotFound {
                name: spec.name.clone(),
                url: spec.url.clone(),
            })?;

        let expires_at = cookie.expires_at_millis();
        let entry = CookieEntry::new(cookie.value, expires_at);
        let outcome = self
            .store
            .update(platform, |record| {
                let outcome = match record.get(&spec.name) {
                    None => SyncOutcome::Created,
                    Some(existing) if existing.value != entry.value => SyncOutcome::Updated,
                    Some(_) => SyncOutcome::Unchanged,
                };
                if outcome.changed() {
                    record.insert(&spec.name, entry.clone());
                }
                outcome
            })
            .await?;

        match outcome {
            SyncOutcome::Created => info!(platform = %platform, cookie = %spec.name, "Created cookie entry"),
            SyncOutcome::Updated => info!(platform = %platform, cookie = %spec.name, "Updated cookie entry"),
            SyncOutcome::Unchanged => debug!(platform = %platform, cookie = %spec.name, "Cookie unchanged"),
        }

        if outcome.changed() && platform == Platform::Linkedin {
            self.sink.notify(&spec.name, &entry).await;
        }
        Ok(outcome)
    }

    /// Sync every tracked cookie for a platform, sequentially. A missing
    /// cookie skips that sync; storage failures propagate.
    pub async fn sync_platform(&self, platform: Platform) -> Result<()> {
        for spec in platform.tracked_cookies() {
            match self.sync_cookie(platform, &spec).await {
                Ok(_) => {}
                Err(Error::CookieNotFound { name, url }) => {
                    debug!(cookie = %name, url = %url, "Cookie not present, skipping sync");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use sessionbridge_core::types::{
        BULLHORN_IDENTITY_COOKIE, LINKEDIN_COOKIE_URL, LINKEDIN_SESSION_COOKIE,
    };
    use sessionbridge_storage::MemoryKvStore;

    fn li_at_spec() -> CookieSpec {
        CookieSpec::new(LINKEDIN_SESSION_COOKIE, LINKEDIN_COOKIE_URL)
    }

    struct Fixture {
        engine: SyncEngine,
        store: Arc<StateStore>,
        cookies: Arc<MapCookieSource>,
        sink: Arc<RecordingSink>,
        kv: Arc<CountingKv<MemoryKvStore>>,
    }

    fn fixture() -> Fixture {
        let kv = Arc::new(CountingKv::new(MemoryKvStore::new()));
        let store = Arc::new(StateStore::new(kv.clone()));
        let cookies = Arc::new(MapCookieSource::default());
        let sink = Arc::new(RecordingSink::default());
        let engine = SyncEngine::new(store.clone(), cookies.clone(), sink.clone());
        Fixture {
            engine,
            store,
            cookies,
            sink,
            kv,
        }
    }

    #[tokio::test]
    async fn missing_cookie_is_cookie_not_found() {
        let f = fixture();
        let err = f
            .engine
            .sync_cookie(Platform::Linkedin, &li_at_spec())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CookieNotFound { .. }));
        assert!(f.sink.notified.lock().await.is_empty());
    }

    #[tokio::test]
    async fn first_sight_creates_and_notifies_linkedin() {
        let f = fixture();
        f.cookies.put("li_at", "abc").await;
        let outcome = f
            .engine
            .sync_cookie(Platform::Linkedin, &li_at_spec())
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Created);

        let notified = f.sink.notified.lock().await;
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].0, "li_at");
        assert_eq!(notified[0].1.value, "abc");
    }

    #[tokio::test]
    async fn equal_value_syncs_once_then_noops() {
        let f = fixture();
        f.cookies.put("li_at", "abc").await;

        let first = f
            .engine
            .sync_cookie(Platform::Linkedin, &li_at_spec())
            .await
            .unwrap();
        let second = f
            .engine
            .sync_cookie(Platform::Linkedin, &li_at_spec())
            .await
            .unwrap();

        assert_eq!(first, SyncOutcome::Created);
        assert_eq!(second, SyncOutcome::Unchanged);
        // Exactly one storage write, one notification across both calls.
        assert_eq!(f.kv.set_count(), 1);
        assert_eq!(f.sink.notified.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn changed_value_overwrites_and_notifies() {
        let f = fixture();
        f.cookies.put("li_at", "abc").await;
        f.engine
            .sync_cookie(Platform::Linkedin, &li_at_spec())
            .await
            .unwrap();

        f.cookies.put("li_at", "xyz").await;
        let outcome = f
            .engine
            .sync_cookie(Platform::Linkedin, &li_at_spec())
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Updated);

        let stored = f
            .store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.get("li_at").unwrap().value, "xyz");

        let notified = f.sink.notified.lock().await;
        assert_eq!(notified.len(), 2);
        assert_eq!(notified[1].1.value, "xyz");
    }

    #[tokio::test]
    async fn bullhorn_changes_never_notify() {
        let f = fixture();
        let spec = CookieSpec::new(BULLHORN_IDENTITY_COOKIE, "https://app.bullhornstaffing.com/");
        f.cookies.put(BULLHORN_IDENTITY_COOKIE, "%22username%22%3A%22alice%22").await;
        f.engine
            .sync_cookie(Platform::Bullhorn, &spec)
            .await
            .unwrap();
        f.cookies.put(BULLHORN_IDENTITY_COOKIE, "%22username%22%3A%22bob%22").await;
        f.engine
            .sync_cookie(Platform::Bullhorn, &spec)
            .await
            .unwrap();

        assert!(f.sink.notified.lock().await.is_empty());
        let stored = f
            .store
            .read_platform(Platform::Bullhorn)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.get(BULLHORN_IDENTITY_COOKIE).unwrap().value,
            "%22username%22%3A%22bob%22"
        );
    }

    #[tokio::test]
    async fn sync_platform_skips_missing_cookies() {
        let f = fixture();
        // Only li_at present; lang missing should not abort the pass.
        f.cookies.put("li_at", "abc").await;
        f.engine.sync_platform(Platform::Linkedin).await.unwrap();

        let stored = f
            .store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.has_field("li_at"));
        assert!(!stored.has_field("lang"));
    }
}
