//! Redis-based cache store.

use super::CacheStore;
use crate::{Blob, CacheKey, Namespace};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool, PoolConfig, Runtime};
use shaku::Component;
use stash_config::CacheConfig;
use stash_core::{StashError, StashResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Backend call bound used by [`RedisCacheStore::disabled`].
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_millis(250);

/// Keys fetched per `SCAN` round when evicting a namespace.
const SCAN_BATCH: usize = 500;

/// Redis-based cache store.
///
/// Every backend call, connection checkout included, is bounded by
/// `timeout`; a call that runs over is reported as unavailable so the
/// caller falls through to the origin promptly.
#[derive(Component)]
#[shaku(interface = CacheStore)]
pub struct RedisCacheStore {
    /// Redis connection pool. `None` disables the store.
    pool: Option<Arc<Pool>>,
    /// Prefix of every rendered key.
    key_prefix: String,
    /// Upper bound for a single backend call.
    timeout: Duration,
}

impl RedisCacheStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub fn new(pool: Arc<Pool>, key_prefix: impl Into<String>, timeout: Duration) -> Self {
        Self {
            pool: Some(pool),
            key_prefix: key_prefix.into(),
            timeout,
        }
    }

    /// Create a store from the cache settings.
    ///
    /// Connections are opened lazily, so an unreachable backend is not an
    /// error here.
    pub fn connect(config: &CacheConfig) -> StashResult<Self> {
        Ok(Self::new(
            create_pool(config)?,
            config.key_prefix.clone(),
            config.connection_timeout(),
        ))
    }

    /// Create a no-op store (for when caching is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pool: None,
            key_prefix: String::new(),
            timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    fn render(&self, key: &CacheKey) -> String {
        key.render(&self.key_prefix)
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StashResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                StashError::cache_unavailable(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(StashError::cache_unavailable("Cache is disabled")),
        }
    }

    /// Runs a backend call under the configured timeout.
    async fn bounded<T, F>(&self, op: &'static str, key: &str, fut: F) -> StashResult<T>
    where
        F: Future<Output = StashResult<T>> + Send,
    {
        let timeout = self.timeout;
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StashError::cache_unavailable(format!(
                "Redis {} for '{}' timed out after {}ms",
                op,
                key,
                timeout.as_millis()
            ))),
        }
    }
}

/// Creates a Redis pool sized from the cache settings.
pub fn create_pool(config: &CacheConfig) -> StashResult<Arc<Pool>> {
    let mut redis_cfg = deadpool_redis::Config::from_url(config.redis_url());
    redis_cfg.pool = Some(PoolConfig::new(config.pool_size.max(1)));

    let pool = redis_cfg
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| StashError::Configuration(format!("Failed to create Redis pool: {}", e)))?;

    Ok(Arc::new(pool))
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    fn backend(&self) -> &'static str {
        if self.is_enabled() {
            "redis"
        } else {
            "disabled"
        }
    }

    async fn get(&self, key: &CacheKey) -> StashResult<Option<Blob>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let rendered = self.render(key);
        let value: Option<Blob> = self
            .bounded("GET", &rendered, async {
                let mut conn = self.get_conn().await?;
                conn.get(&rendered).await.map_err(|e| {
                    StashError::cache_unavailable(format!("Failed to get key '{}': {}", rendered, e))
                })
            })
            .await?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", rendered),
            None => debug!("Cache miss for key '{}'", rendered),
        }

        Ok(value)
    }

    async fn put(&self, key: &CacheKey, blob: Blob, ttl: Option<Duration>) -> StashResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let rendered = self.render(key);
        self.bounded("SET", &rendered, async {
            let mut conn = self.get_conn().await?;
            let result = match ttl {
                Some(ttl) => {
                    let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                    conn.pset_ex::<_, _, ()>(&rendered, blob, ttl_ms).await
                }
                None => conn.set::<_, _, ()>(&rendered, blob).await,
            };
            result.map_err(|e| {
                StashError::cache_unavailable(format!("Failed to set key '{}': {}", rendered, e))
            })
        })
        .await?;

        debug!("Cached key '{}' with TTL {:?}", rendered, ttl);
        Ok(())
    }

    async fn evict(&self, key: &CacheKey) -> StashResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let rendered = self.render(key);
        let deleted: i64 = self
            .bounded("DEL", &rendered, async {
                let mut conn = self.get_conn().await?;
                conn.del(&rendered)
                    .await
                    .map_err(|e| StashError::cache_unavailable(e.to_string()))
            })
            .await
            .map_err(|e| StashError::eviction_failed(rendered.clone(), e.to_string()))?;

        debug!("Deleted key '{}': {}", rendered, deleted > 0);
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &CacheKey) -> StashResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let rendered = self.render(key);
        self.bounded("EXISTS", &rendered, async {
            let mut conn = self.get_conn().await?;
            conn.exists(&rendered).await.map_err(|e| {
                StashError::cache_unavailable(format!("Failed to check key '{}': {}", rendered, e))
            })
        })
        .await
    }

    async fn evict_namespace(&self, namespace: Namespace) -> StashResult<u64> {
        if !self.is_enabled() {
            return Ok(0);
        }

        let pattern = namespace.pattern(&self.key_prefix);
        let removed = self
            .bounded("SCAN", &pattern, async {
                let mut conn = self.get_conn().await?;
                let mut cursor: u64 = 0;
                let mut removed: u64 = 0;

                loop {
                    let (next, keys): (u64, Vec<String>) = deadpool_redis::redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn)
                        .await
                        .map_err(|e| StashError::cache_unavailable(format!("Failed to scan keys: {}", e)))?;

                    if !keys.is_empty() {
                        let deleted: i64 = conn.del(&keys).await.map_err(|e| {
                            StashError::cache_unavailable(format!("Failed to delete keys: {}", e))
                        })?;
                        removed += u64::try_from(deleted).unwrap_or(0);
                    }

                    if next == 0 {
                        break;
                    }
                    cursor = next;
                }

                Ok(removed)
            })
            .await
            .map_err(|e| StashError::eviction_failed(pattern.clone(), e.to_string()))?;

        debug!("Deleted {} keys matching pattern '{}'", removed, pattern);
        Ok(removed)
    }
}
