//! Platform state store.
//!
//! Thin wrapper over the key-value capability providing typed read/write of
//! `PlatformRecord`s. All mutation goes through [`StateStore::update`], which
//! holds a per-platform async mutex across the read-modify-write so that
//! concurrent syncs against the same platform cannot clobber each other.

use sessionbridge_core::{Error, Platform, PlatformRecord, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::kv::KeyValueStore;

pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
    write_locks: HashMap<Platform, Mutex<()>>,
}

impl StateStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let write_locks = Platform::ALL
            .iter()
            .map(|p| (*p, Mutex::new(())))
            .collect();
        Self { kv, write_locks }
    }

    /// Current persisted record for a platform, or `None` if never written.
    pub async fn read_platform(&self, platform: Platform) -> Result<Option<PlatformRecord>> {
        match self.kv.get(platform.key()).await? {
            Some(value) => {
                let record = serde_json::from_value(value).map_err(|e| {
                    Error::Storage(format!("Corrupt record for {}: {}", platform, e))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Replace the stored record for a platform wholesale.
    pub async fn write_platform(&self, platform: Platform, record: &PlatformRecord) -> Result<()> {
        let value = serde_json::to_value(record)?;
        self.kv.set(platform.key(), value).await
    }

    /// Read-modify-write under the platform's write lock. The closure mutates
    /// the record (an absent record starts empty); the result is written back
    /// only if the record actually changed. Returns the closure's output.
    pub async fn update<T, F>(&self, platform: Platform, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut PlatformRecord) -> T,
    {
        let lock = self
            .write_locks
            .get(&platform)
            .expect("all platforms have a write lock");
        let _guard = lock.lock().await;

        let before = self.read_platform(platform).await?.unwrap_or_default();
        let mut record = before.clone();
        let out = mutate(&mut record);

        if record != before {
            self.write_platform(platform, &record).await?;
            debug!(platform = %platform, fields = record.fields.len(), "Platform record written");
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{FileKvStore, MemoryKvStore};
    use sessionbridge_core::CookieEntry;

    #[tokio::test]
    async fn absent_platform_reads_none() {
        let store = StateStore::new(Arc::new(MemoryKvStore::new()));
        assert!(store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn written_record_reads_back_deep_equal() {
        let dir = tempfile::tempdir().unwrap();
        let kv = Arc::new(FileKvStore::new(dir.path().join("state.json")));
        let store = StateStore::new(kv);

        let mut record = PlatformRecord::default();
        record.insert("li_at", CookieEntry::new("abc".into(), Some(1700000000000)));
        record.insert("lang", CookieEntry::new("v=2&lang=en-us".into(), None));
        store
            .write_platform(Platform::Linkedin, &record)
            .await
            .unwrap();

        let back = store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record, back);
    }

    #[tokio::test]
    async fn update_merges_without_clobbering_other_fields() {
        let store = StateStore::new(Arc::new(MemoryKvStore::new()));
        store
            .update(Platform::Linkedin, |record| {
                record.insert("li_at", CookieEntry::new("abc".into(), None));
            })
            .await
            .unwrap();
        store
            .update(Platform::Linkedin, |record| {
                record.insert("lang", CookieEntry::new("v=2&lang=fr-fr".into(), None));
            })
            .await
            .unwrap();

        let record = store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .unwrap();
        assert!(record.has_field("li_at"));
        assert!(record.has_field("lang"));
    }

    #[tokio::test]
    async fn concurrent_updates_to_same_platform_both_land() {
        let store = Arc::new(StateStore::new(Arc::new(MemoryKvStore::new())));

        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(Platform::Linkedin, |record| {
                        record.insert("li_at", CookieEntry::new("abc".into(), None));
                    })
                    .await
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(Platform::Linkedin, |record| {
                        record.insert("lang", CookieEntry::new("v=2&lang=en-us".into(), None));
                    })
                    .await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let record = store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .unwrap();
        assert!(record.has_field("li_at"));
        assert!(record.has_field("lang"));
    }
}
