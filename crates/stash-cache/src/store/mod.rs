//! Cache store abstraction and backends.
//!
//! A [`CacheStore`] is shared by every cache-aside wrapper in the process.
//! Backends provide atomic per-key operations; concurrent writers resolve
//! last-write-wins and TTL bounds any staleness.

mod memory;
mod redis;

pub use memory::MemoryCacheStore;
pub use redis::{create_pool, RedisCacheStore, RedisCacheStoreParameters, DEFAULT_BACKEND_TIMEOUT};

use crate::{Blob, CacheKey, Namespace};
use async_trait::async_trait;
use shaku::Interface;
use stash_core::StashResult;
use std::time::Duration;

/// Key/value storage over a cache backend.
///
/// Failure signals: `get`, `put`, and `exists` report an unreachable or slow
/// backend as [`StashError::CacheUnavailable`](stash_core::StashError::CacheUnavailable);
/// `evict` and `evict_namespace` report
/// [`StashError::EvictionFailed`](stash_core::StashError::EvictionFailed).
#[async_trait]
pub trait CacheStore: Interface + Send + Sync {
    /// Returns the stored blob, or `None` on a miss or an expired entry.
    async fn get(&self, key: &CacheKey) -> StashResult<Option<Blob>>;

    /// Stores a blob, replacing any previous entry.
    ///
    /// `None` as TTL stores the entry without expiry.
    async fn put(&self, key: &CacheKey, blob: Blob, ttl: Option<Duration>) -> StashResult<()>;

    /// Removes an entry. Returns `true` if an entry existed.
    async fn evict(&self, key: &CacheKey) -> StashResult<bool>;

    /// Checks if a live entry exists for the key.
    async fn exists(&self, key: &CacheKey) -> StashResult<bool>;

    /// Removes every entry of a namespace. Returns the number removed.
    async fn evict_namespace(&self, namespace: Namespace) -> StashResult<u64>;

    /// Checks if caching is enabled.
    fn is_enabled(&self) -> bool;

    /// Backend name for logs and diagnostics.
    fn backend(&self) -> &'static str;
}
