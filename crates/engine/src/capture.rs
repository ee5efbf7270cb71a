//! Identifier capture: records the scraped linkedin profile identifier into
//! the platform state, merging into whatever the record already holds.

use sessionbridge_core::types::PUBLIC_IDENTIFIER_FIELD;
use sessionbridge_core::{CookieEntry, Platform, Result};
use sessionbridge_storage::StateStore;
use tracing::{debug, info};

/// Merge the profile identifier into the linkedin record. An empty scrape
/// result is skipped (the page had no embedded identifier), and an unchanged
/// value is left in place so its original `stored_at` survives.
///
/// Callers must await this before starting cookie syncs for the same page
/// load: dispatch reads the identifier from storage.
pub async fn capture_identifier(store: &StateStore, raw_identifier: &str) -> Result<()> {
    if raw_identifier.is_empty() {
        debug!("Page carried no public identifier, skipping capture");
        return Ok(());
    }

    let updated = store
        .update(Platform::Linkedin, |record| {
            let unchanged = record
                .get(PUBLIC_IDENTIFIER_FIELD)
                .is_some_and(|existing| existing.value == raw_identifier);
            if unchanged {
                return false;
            }
            record.insert(
                PUBLIC_IDENTIFIER_FIELD,
                CookieEntry::identifier(raw_identifier.to_string()),
            );
            true
        })
        .await?;

    if updated {
        info!(identifier = %raw_identifier, "Captured public identifier");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionbridge_storage::{MemoryKvStore, StateStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn capture_merges_into_existing_record() {
        let store = StateStore::new(Arc::new(MemoryKvStore::new()));
        store
            .update(Platform::Linkedin, |record| {
                record.insert("li_at", CookieEntry::new("abc".into(), None));
            })
            .await
            .unwrap();

        capture_identifier(&store, "alice-smith-1a2b3c").await.unwrap();

        let record = store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .unwrap();
        assert!(record.has_field("li_at"));
        assert_eq!(
            record.get(PUBLIC_IDENTIFIER_FIELD).unwrap().value,
            "alice-smith-1a2b3c"
        );
        assert_eq!(record.get(PUBLIC_IDENTIFIER_FIELD).unwrap().expires_at, None);
    }

    #[tokio::test]
    async fn empty_identifier_is_not_stored() {
        let store = StateStore::new(Arc::new(MemoryKvStore::new()));
        capture_identifier(&store, "").await.unwrap();
        assert!(store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unchanged_identifier_keeps_original_stored_at() {
        let store = StateStore::new(Arc::new(MemoryKvStore::new()));
        capture_identifier(&store, "alice-smith-1a2b3c").await.unwrap();
        let first = store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .unwrap()
            .get(PUBLIC_IDENTIFIER_FIELD)
            .unwrap()
            .clone();

        capture_identifier(&store, "alice-smith-1a2b3c").await.unwrap();
        let second = store
            .read_platform(Platform::Linkedin)
            .await
            .unwrap()
            .unwrap()
            .get(PUBLIC_IDENTIFIER_FIELD)
            .unwrap()
            .clone();
        assert_eq!(first, second);
    }
}
