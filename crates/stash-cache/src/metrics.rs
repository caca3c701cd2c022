//! Prometheus metrics for cache-aside monitoring.

use crate::Namespace;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names for the cache layer.
pub mod names {
    /// Lookups answered from the cache.
    pub const CACHE_HITS_TOTAL: &str = "stash_cache_hits_total";
    /// Lookups that found no entry.
    pub const CACHE_MISSES_TOTAL: &str = "stash_cache_misses_total";
    /// Lookups turned into misses by a backend or decode failure.
    pub const CACHE_FORCED_MISSES_TOTAL: &str = "stash_cache_forced_misses_total";
    /// Calls run uncached for lack of a key.
    pub const CACHE_BYPASSES_TOTAL: &str = "stash_cache_bypasses_total";
    /// Entries written after an origin read.
    pub const CACHE_POPULATES_TOTAL: &str = "stash_cache_populates_total";
    /// Populates skipped after a failure.
    pub const CACHE_POPULATE_FAILURES_TOTAL: &str = "stash_cache_populate_failures_total";
    /// Keys evicted after an origin write.
    pub const CACHE_EVICTIONS_TOTAL: &str = "stash_cache_evictions_total";
    /// Evictions that failed.
    pub const CACHE_EVICTION_FAILURES_TOTAL: &str = "stash_cache_eviction_failures_total";
    /// Origin call duration on a miss, in seconds.
    pub const ORIGIN_LOAD_SECONDS: &str = "stash_origin_load_duration_seconds";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_HITS_TOTAL,
        "Total number of lookups answered from the cache"
    );
    describe_counter!(
        names::CACHE_MISSES_TOTAL,
        "Total number of lookups that found no entry"
    );
    describe_counter!(
        names::CACHE_FORCED_MISSES_TOTAL,
        "Total number of lookups treated as misses after a cache failure"
    );
    describe_counter!(
        names::CACHE_BYPASSES_TOTAL,
        "Total number of calls run without caching"
    );
    describe_counter!(
        names::CACHE_POPULATES_TOTAL,
        "Total number of entries written after an origin read"
    );
    describe_counter!(
        names::CACHE_POPULATE_FAILURES_TOTAL,
        "Total number of populates that failed"
    );
    describe_counter!(
        names::CACHE_EVICTIONS_TOTAL,
        "Total number of keys evicted after an origin write"
    );
    describe_counter!(
        names::CACHE_EVICTION_FAILURES_TOTAL,
        "Total number of evictions that failed"
    );
    describe_histogram!(
        names::ORIGIN_LOAD_SECONDS,
        "Duration of origin calls made on a cache miss"
    );
}

/// Cache metrics recorder.
#[derive(Clone)]
pub struct CacheMetrics;

impl CacheMetrics {
    /// Record a cache hit.
    pub fn hit(namespace: Namespace) {
        counter!(names::CACHE_HITS_TOTAL, "namespace" => namespace.as_str()).increment(1);
    }

    /// Record a cache miss.
    pub fn miss(namespace: Namespace) {
        counter!(names::CACHE_MISSES_TOTAL, "namespace" => namespace.as_str()).increment(1);
    }

    /// Record a miss forced by a cache failure.
    pub fn forced_miss(namespace: Namespace, reason: &'static str) {
        counter!(
            names::CACHE_FORCED_MISSES_TOTAL,
            "namespace" => namespace.as_str(),
            "reason" => reason
        )
        .increment(1);
    }

    /// Record an uncached call.
    pub fn bypass() {
        counter!(names::CACHE_BYPASSES_TOTAL).increment(1);
    }

    /// Record a populate.
    pub fn populated(namespace: Namespace) {
        counter!(names::CACHE_POPULATES_TOTAL, "namespace" => namespace.as_str()).increment(1);
    }

    /// Record a failed populate.
    pub fn populate_failed(namespace: Namespace) {
        counter!(
            names::CACHE_POPULATE_FAILURES_TOTAL,
            "namespace" => namespace.as_str()
        )
        .increment(1);
    }

    /// Record an eviction.
    pub fn evicted(namespace: Namespace) {
        counter!(names::CACHE_EVICTIONS_TOTAL, "namespace" => namespace.as_str()).increment(1);
    }

    /// Record a failed eviction.
    pub fn eviction_failed(namespace: Namespace) {
        counter!(
            names::CACHE_EVICTION_FAILURES_TOTAL,
            "namespace" => namespace.as_str()
        )
        .increment(1);
    }

    /// Record the duration of an origin call.
    pub fn origin_loaded(namespace: Namespace, duration: Duration) {
        histogram!(names::ORIGIN_LOAD_SECONDS, "namespace" => namespace.as_str())
            .record(duration.as_secs_f64());
    }
}
