//! Pluggable persistence for cached decisions.
//!
//! The store is injected into [`super::DecisionCache`] so the pipeline can
//! be exercised without touching the real filesystem. [`FileStore`] is what
//! the binary uses; [`MemoryStore`] backs tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::Result;

/// One cached verdict. Written only after a fresh judge call, never after a
/// rule decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub approve: bool,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(approve: bool) -> Self {
        Self {
            approve,
            created_at: Utc::now(),
        }
    }
}

/// Keyed persistence for cache entries. Implementations are free to race:
/// concurrent writers for one fingerprint carry identical payloads, so
/// last-writer-wins is acceptable and no locking is required.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn load(&self, fingerprint: &str) -> Result<Option<CacheEntry>>;
    async fn save(&self, fingerprint: &str, entry: &CacheEntry) -> Result<()>;
    async fn remove(&self, fingerprint: &str) -> Result<()>;
}

/// One JSON file per fingerprint under a cache directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.json"))
    }

    /// Drop the whole cache directory. Used by the setup collaborator.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn load(&self, fingerprint: &str) -> Result<Option<CacheEntry>> {
        let text = match tokio::fs::read_to_string(self.path(fingerprint)).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn save(&self, fingerprint: &str, entry: &CacheEntry) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let text = serde_json::to_string(entry)?;
        tokio::fs::write(self.path(fingerprint), text).await?;
        Ok(())
    }

    async fn remove(&self, fingerprint: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(fingerprint)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests. Clones share the same map, so a test can keep
/// a handle for assertions after handing the store to the cache.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn entry(&self, fingerprint: &str) -> Option<CacheEntry> {
        self.entries.lock().await.get(fingerprint).cloned()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn load(&self, fingerprint: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.lock().await.get(fingerprint).cloned())
    }

    async fn save(&self, fingerprint: &str, entry: &CacheEntry) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(fingerprint.to_string(), entry.clone());
        Ok(())
    }

    async fn remove(&self, fingerprint: &str) -> Result<()> {
        self.entries.lock().await.remove(fingerprint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.load("abc123").await.unwrap(), None);

        let entry = CacheEntry::new(true);
        store.save("abc123", &entry).await.unwrap();
        assert_eq!(store.load("abc123").await.unwrap(), Some(entry));

        store.remove("abc123").await.unwrap();
        assert_eq!(store.load("abc123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.remove("never-written").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_corrupt_entry_is_an_error() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("bad.json"), "{truncated")
            .await
            .unwrap();

        let store = FileStore::new(dir.path());
        assert!(store.load("bad").await.is_err());
    }

    #[tokio::test]
    async fn test_file_store_clear() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("cache"));
        store.save("k", &CacheEntry::new(false)).await.unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.load("k").await.unwrap(), None);

        // Clearing an already-missing directory is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.save("k", &CacheEntry::new(true)).await.unwrap();
        assert_eq!(handle.len().await, 1);
        assert!(handle.entry("k").await.unwrap().approve);
    }
}
