//! Key-value persistence capability.
//!
//! The daemon treats persistence as an injected capability: `get` a value by
//! top-level key, `set` one key without touching the others. The file-backed
//! implementation keeps everything in a single JSON document.

use async_trait::async_trait;
use serde_json::Value;
use sessionbridge_core::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Resolve the value stored under `key`, or `None` if never written.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, leaving other keys untouched.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// File-backed store: one JSON object on disk, top-level keys are the store
/// keys. Reads tolerate a missing file; a corrupt file is a storage error.
pub struct FileKvStore {
    path: PathBuf,
}

impl FileKvStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_document(&self) -> Result<serde_json::Map<String, Value>> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", self.path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| Error::Storage(format!("Corrupt state file {}: {}", self.path.display(), e)))
    }

    fn write_document(&self, doc: &serde_json::Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create state dir: {}", e)))?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(doc.clone()))?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_document()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut doc = self.read_document()?;
        doc.insert(key.to_string(), value);
        self.write_document(&doc)?;
        debug!(key = %key, "Persisted state key");
        Ok(())
    }
}

/// In-memory store used in tests and anywhere a throwaway backend is enough.
#[derive(Default)]
pub struct MemoryKvStore {
    map: Mutex<HashMap<String, Value>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.map.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.map.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn file_store_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("state.json"));
        assert!(store.get("linkedin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_set_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("state.json"));
        store.set("linkedin", json!({"li_at": 1})).await.unwrap();
        store.set("bullhorn", json!({"id": 2})).await.unwrap();
        assert_eq!(
            store.get("linkedin").await.unwrap(),
            Some(json!({"li_at": 1}))
        );
        assert_eq!(store.get("bullhorn").await.unwrap(), Some(json!({"id": 2})));
    }

    #[tokio::test]
    async fn file_store_corrupt_document_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileKvStore::new(path);
        assert!(matches!(
            store.get("linkedin").await,
            Err(Error::Storage(_))
        ));
    }
}
