//! In-process cache store.

use super::CacheStore;
use crate::{Blob, CacheEntry, CacheKey, Namespace};
use async_trait::async_trait;
use parking_lot::RwLock;
use stash_core::StashResult;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Cache store backed by a map in process memory.
///
/// Expired entries are dropped lazily on access and in bulk by
/// [`purge_expired`](Self::purge_expired).
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Arc<Entries>,
}

type Entries = RwLock<HashMap<CacheKey, CacheEntry>>;

fn purge(entries: &Entries) -> usize {
    let now = Instant::now();
    let mut entries = entries.write();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired_at(now));
    let removed = before - entries.len();
    if removed > 0 {
        debug!("Purged {} expired cache entries", removed);
    }
    removed
}

impl MemoryCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Checks if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Removes every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries)
    }

    /// Spawns a task purging expired entries every `interval`.
    ///
    /// The task stops once the store is dropped. Must be called from within
    /// a Tokio runtime.
    pub fn spawn_purge_task(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let entries: Weak<Entries> = Arc::downgrade(&self.entries);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match entries.upgrade() {
                    Some(entries) => {
                        purge(&entries);
                    }
                    None => break,
                }
            }
        })
    }

    fn live_blob(&self, key: &CacheKey) -> Option<Blob> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired_at(now) => return Some(entry.blob().to_vec()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it unless a writer replaced it in between.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.is_expired_at(now)) {
            entries.remove(key);
        }
        None
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> StashResult<Option<Blob>> {
        let blob = self.live_blob(key);

        match &blob {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(blob)
    }

    async fn put(&self, key: &CacheKey, blob: Blob, ttl: Option<Duration>) -> StashResult<()> {
        self.entries
            .write()
            .insert(key.clone(), CacheEntry::new(blob, ttl));
        debug!("Cached key '{}' with TTL {:?}", key, ttl);
        Ok(())
    }

    async fn evict(&self, key: &CacheKey) -> StashResult<bool> {
        let removed = self
            .entries
            .write()
            .remove(key)
            .is_some_and(|entry| !entry.is_expired());
        debug!("Evicted key '{}': {}", key, removed);
        Ok(removed)
    }

    async fn exists(&self, key: &CacheKey) -> StashResult<bool> {
        Ok(self.live_blob(key).is_some())
    }

    async fn evict_namespace(&self, namespace: Namespace) -> StashResult<u64> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.namespace() != namespace);
        let removed = (before - entries.len()) as u64;
        debug!("Evicted {} keys in namespace '{}'", removed, namespace);
        Ok(removed)
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
