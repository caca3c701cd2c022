//! Common test infrastructure for cache-aside integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use stash_cache::{Blob, CacheKey, CacheStore, MemoryCacheStore, Namespace};
use stash_core::{StashError, StashResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Store wrapping [`MemoryCacheStore`] with switchable faults.
///
/// Simulates an unreachable backend, evictions failing per namespace, and
/// writes failing on their own.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryCacheStore,
    unavailable: AtomicBool,
    failing_puts: AtomicBool,
    failing_evictions: Mutex<HashSet<Namespace>>,
}

impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every call fail as if the backend were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes `put` fail while reads keep working.
    pub fn fail_puts(&self, fail: bool) {
        self.failing_puts.store(fail, Ordering::SeqCst);
    }

    /// Makes evictions of one namespace fail.
    pub fn fail_evictions_in(&self, namespace: Namespace) {
        self.failing_evictions.lock().insert(namespace);
    }

    /// Writes a raw blob, bypassing any fault.
    pub async fn put_raw(&self, key: &CacheKey, blob: &[u8]) {
        self.inner
            .put(key, blob.to_vec(), None)
            .await
            .expect("memory put failed");
    }

    /// Checks for a live entry, bypassing any fault.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.inner.exists(key).await.expect("memory exists failed")
    }

    fn check_available(&self) -> StashResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StashError::cache_unavailable("Connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheStore for FaultyStore {
    async fn get(&self, key: &CacheKey) -> StashResult<Option<Blob>> {
        self.check_available()?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &CacheKey, blob: Blob, ttl: Option<Duration>) -> StashResult<()> {
        self.check_available()?;
        if self.failing_puts.load(Ordering::SeqCst) {
            return Err(StashError::cache_unavailable("Write rejected"));
        }
        self.inner.put(key, blob, ttl).await
    }

    async fn evict(&self, key: &CacheKey) -> StashResult<bool> {
        if self.unavailable.load(Ordering::SeqCst)
            || self.failing_evictions.lock().contains(&key.namespace())
        {
            return Err(StashError::eviction_failed(key.to_string(), "Connection refused"));
        }
        self.inner.evict(key).await
    }

    async fn exists(&self, key: &CacheKey) -> StashResult<bool> {
        self.check_available()?;
        self.inner.exists(key).await
    }

    async fn evict_namespace(&self, namespace: Namespace) -> StashResult<u64> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StashError::eviction_failed(namespace.to_string(), "Connection refused"));
        }
        self.inner.evict_namespace(namespace).await
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "faulty"
    }
}

/// Counts origin invocations.
#[derive(Clone, Default)]
pub struct OriginCounter(Arc<AtomicUsize>);

impl OriginCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one call and returns the closure's value.
    pub fn call<T>(&self, value: T) -> StashResult<T> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
