//! Cache-aside wrapper around origin calls.
//!
//! Reads follow `LOOKUP -> {HIT: return, MISS: origin -> populate -> return}`.
//! Writes run the origin first and evict the affected keys afterwards.
//! Cache failures never reach the caller: an unavailable backend or an
//! undecodable entry is a forced miss, a failed populate is logged and
//! skipped, and failed evictions are collected in an [`EvictionReport`].

use crate::metrics::CacheMetrics;
use crate::single_flight::SingleFlight;
use crate::{CacheKey, CacheStats, CacheStore, Codec, JsonCodec, Namespace, StatsSnapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use stash_config::CacheConfig;
use stash_core::{StashError, StashResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// TTL and coalescing policy of a [`CacheAside`].
#[derive(Debug, Clone)]
pub struct CachePolicy {
    default_ttl: Duration,
    namespace_ttls: HashMap<String, Duration>,
    single_flight: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            namespace_ttls: HashMap::new(),
            single_flight: false,
        }
    }
}

impl CachePolicy {
    /// Creates a policy with a default TTL and no overrides.
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            ..Self::default()
        }
    }

    /// Builds the policy from the cache settings.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            default_ttl: config.default_ttl(),
            namespace_ttls: config
                .namespaces
                .iter()
                .map(|(name, ns)| (name.to_ascii_lowercase(), Duration::from_secs(ns.ttl_seconds)))
                .collect(),
            single_flight: config.single_flight,
        }
    }

    /// Overrides the TTL of one namespace.
    #[must_use]
    pub fn with_namespace_ttl(mut self, namespace: Namespace, ttl: Duration) -> Self {
        self.namespace_ttls
            .insert(namespace.as_str().to_ascii_lowercase(), ttl);
        self
    }

    /// Enables or disables single-flight loading.
    #[must_use]
    pub const fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    /// Returns the TTL for entries of a namespace.
    ///
    /// A zero duration stores entries without expiry.
    #[must_use]
    pub fn ttl_for(&self, namespace: Namespace) -> Option<Duration> {
        let ttl = self
            .namespace_ttls
            .get(&namespace.as_str().to_ascii_lowercase())
            .copied()
            .unwrap_or(self.default_ttl);
        (!ttl.is_zero()).then_some(ttl)
    }

    /// Checks if concurrent misses on a key are coalesced.
    #[must_use]
    pub const fn single_flight(&self) -> bool {
        self.single_flight
    }
}

/// Eviction that could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionFailure {
    /// Key that may still hold a stale entry until its TTL expires.
    pub key: CacheKey,
    /// Backend error message.
    pub message: String,
}

/// Outcome of evicting a set of keys.
///
/// Every key is attempted; failures are listed rather than aborting the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Keys whose entries were removed.
    pub evicted: Vec<CacheKey>,
    /// Keys that had no entry.
    pub missing: Vec<CacheKey>,
    /// Keys whose eviction failed.
    pub failures: Vec<EvictionFailure>,
}

impl EvictionReport {
    /// Checks if every eviction succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the number of keys attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.evicted.len() + self.missing.len() + self.failures.len()
    }

    /// Returns the keys whose eviction failed.
    #[must_use]
    pub fn failed_keys(&self) -> Vec<&CacheKey> {
        self.failures.iter().map(|f| &f.key).collect()
    }

    /// Converts the report into an error naming the first failed key.
    pub fn into_result(self) -> StashResult<()> {
        match self.failures.into_iter().next() {
            None => Ok(()),
            Some(failure) => Err(StashError::eviction_failed(
                failure.key.to_string(),
                failure.message,
            )),
        }
    }
}

/// Result of an origin write and the evictions that followed it.
#[derive(Debug, Clone)]
pub struct WriteOutcome<T> {
    /// Value returned by the origin write.
    pub value: T,
    /// Evictions attempted after the write.
    pub evictions: EvictionReport,
}

impl<T> WriteOutcome<T> {
    /// Returns the origin value, dropping the report.
    pub fn into_value(self) -> T {
        self.value
    }
}

enum Lookup<T> {
    Hit(T),
    Miss,
    Forced(&'static str),
}

/// Cache-aside wrapper over a shared [`CacheStore`].
///
/// Cheap to clone; clones share the store, counters and flights.
pub struct CacheAside<C: Codec = JsonCodec> {
    store: Arc<dyn CacheStore>,
    codec: C,
    policy: CachePolicy,
    stats: Arc<CacheStats>,
    flights: Option<SingleFlight>,
}

impl<C: Codec + Clone> Clone for CacheAside<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: self.codec.clone(),
            policy: self.policy.clone(),
            stats: Arc::clone(&self.stats),
            flights: self.flights.clone(),
        }
    }
}

impl CacheAside<JsonCodec> {
    /// Creates a wrapper encoding entries as JSON.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, policy: CachePolicy) -> Self {
        Self::with_codec(store, JsonCodec, policy)
    }
}

impl<C: Codec> CacheAside<C> {
    /// Creates a wrapper with a custom codec.
    #[must_use]
    pub fn with_codec(store: Arc<dyn CacheStore>, codec: C, policy: CachePolicy) -> Self {
        let flights = policy.single_flight().then(SingleFlight::default);
        Self {
            store,
            codec,
            policy,
            stats: Arc::new(CacheStats::default()),
            flights,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Returns the policy.
    #[must_use]
    pub const fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &CacheKey) -> Lookup<T> {
        match self.store.get(key).await {
            Ok(Some(blob)) => match self.codec.decode(&blob) {
                Ok(value) => Lookup::Hit(value),
                Err(e) => {
                    warn!("Undecodable cache entry for key '{}', treating as miss: {}", key, e);
                    Lookup::Forced("decode")
                }
            },
            Ok(None) => Lookup::Miss,
            Err(e) => {
                warn!("Cache lookup failed for key '{}', falling back to origin: {}", key, e);
                Lookup::Forced("unavailable")
            }
        }
    }

    /// Looks a key up, returning `None` on a miss.
    ///
    /// Backend and decode failures are forced misses, never errors.
    pub async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let outcome = self.fetch(key).await;
        self.record(key, outcome)
    }

    /// Counts one lookup outcome, yielding the value on a hit.
    fn record<T>(&self, key: &CacheKey, outcome: Lookup<T>) -> Option<T> {
        let namespace = key.namespace();
        match outcome {
            Lookup::Hit(value) => {
                self.stats.hit();
                CacheMetrics::hit(namespace);
                Some(value)
            }
            Lookup::Miss => {
                self.stats.miss();
                CacheMetrics::miss(namespace);
                None
            }
            Lookup::Forced(reason) => {
                self.stats.forced_miss();
                CacheMetrics::forced_miss(namespace, reason);
                None
            }
        }
    }

    /// Stores a value under a key with the namespace TTL.
    ///
    /// Failures are logged and skipped.
    pub async fn populate<T: Serialize + ?Sized + Sync>(&self, key: &CacheKey, value: &T) {
        let namespace = key.namespace();
        let blob = match self.codec.encode(value) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Failed to encode value for key '{}', not caching: {}", key, e);
                self.stats.populate_failure();
                CacheMetrics::populate_failed(namespace);
                return;
            }
        };

        match self.store.put(key, blob, self.policy.ttl_for(namespace)).await {
            Ok(()) => {
                self.stats.populate();
                CacheMetrics::populated(namespace);
            }
            Err(e) => {
                warn!("Failed to populate cache for key '{}': {}", key, e);
                self.stats.populate_failure();
                CacheMetrics::populate_failed(namespace);
            }
        }
    }

    /// Returns the cached value for `key`, or loads it from the origin and
    /// populates the cache.
    ///
    /// A `None` key runs the origin uncached. Origin errors are returned
    /// as-is and nothing is cached.
    pub async fn get_or_load<T, F, Fut>(&self, key: Option<CacheKey>, origin: F) -> StashResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = StashResult<T>> + Send,
    {
        self.get_or_load_unless(key, origin, |_| false).await
    }

    /// Like [`get_or_load`](Self::get_or_load), but a loaded value for
    /// which `unless` returns `true` is returned without being cached.
    pub async fn get_or_load_unless<T, F, Fut, U>(
        &self,
        key: Option<CacheKey>,
        origin: F,
        unless: U,
    ) -> StashResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = StashResult<T>> + Send,
        U: FnOnce(&T) -> bool + Send,
    {
        let Some(key) = key else {
            debug!("No cache key derived, calling origin uncached");
            self.stats.bypass();
            CacheMetrics::bypass();
            return origin().await;
        };

        let mut outcome = self.fetch::<T>(&key).await;
        let mut flight = None;
        if let (Some(flights), false) = (&self.flights, matches!(outcome, Lookup::Hit(_))) {
            let guard = flights.acquire(&key).await;
            // Another caller may have loaded the key while we waited.
            if let hit @ Lookup::Hit(_) = self.fetch::<T>(&key).await {
                outcome = hit;
            }
            flight = Some(guard);
        }

        if let Some(value) = self.record(&key, outcome) {
            return Ok(value);
        }
        let _flight = flight;

        let started = Instant::now();
        let value = origin().await?;
        CacheMetrics::origin_loaded(key.namespace(), started.elapsed());

        if unless(&value) {
            debug!("Result for key '{}' excluded from caching", key);
        } else {
            self.populate(&key, &value).await;
        }

        Ok(value)
    }

    /// Loads an optional value; absent results are never cached.
    pub async fn get_optional<T, F, Fut>(
        &self,
        key: Option<CacheKey>,
        origin: F,
    ) -> StashResult<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = StashResult<Option<T>>> + Send,
    {
        self.get_or_load_unless(key, origin, Option::is_none).await
    }

    /// Evicts every key, collecting failures instead of stopping at the first.
    pub async fn evict(&self, keys: &[CacheKey]) -> EvictionReport {
        let mut report = EvictionReport::default();

        for key in keys {
            let namespace = key.namespace();
            match self.store.evict(key).await {
                Ok(true) => {
                    self.stats.eviction();
                    CacheMetrics::evicted(namespace);
                    report.evicted.push(key.clone());
                }
                Ok(false) => report.missing.push(key.clone()),
                Err(e) => {
                    warn!("Failed to evict key '{}', entry may be stale until TTL: {}", key, e);
                    self.stats.eviction_failure();
                    CacheMetrics::eviction_failed(namespace);
                    report.failures.push(EvictionFailure {
                        key: key.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        debug!(
            evicted = report.evicted.len(),
            missing = report.missing.len(),
            failed = report.failures.len(),
            "Eviction finished"
        );
        report
    }

    /// Runs an origin write, then evicts the keys derived from its result.
    ///
    /// Origin errors are returned before any eviction. `None` keys are
    /// skipped.
    pub async fn write_and_evict<T, F, Fut, K>(
        &self,
        origin: F,
        keys: K,
    ) -> StashResult<WriteOutcome<T>>
    where
        T: Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = StashResult<T>> + Send,
        K: FnOnce(&T) -> Vec<Option<CacheKey>> + Send,
    {
        let value = origin().await?;
        let keys: Vec<CacheKey> = keys(&value).into_iter().flatten().collect();
        let evictions = self.evict(&keys).await;
        Ok(WriteOutcome { value, evictions })
    }

    /// Evicts every entry of a namespace.
    pub async fn evict_namespace(&self, namespace: Namespace) -> StashResult<u64> {
        let removed = self.store.evict_namespace(namespace).await?;
        debug!("Evicted {} entries from namespace '{}'", removed, namespace);
        Ok(removed)
    }
}
