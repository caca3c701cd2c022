//! In-process cache counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by a [`CacheAside`](crate::CacheAside).
///
/// Counters are shared by clones of the same wrapper and are also mirrored
/// to the `metrics` facade.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    forced_misses: AtomicU64,
    bypasses: AtomicU64,
    populates: AtomicU64,
    populate_failures: AtomicU64,
    evictions: AtomicU64,
    eviction_failures: AtomicU64,
}

impl CacheStats {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn forced_miss(&self) {
        self.forced_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn bypass(&self) {
        self.bypasses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn populate(&self) {
        self.populates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn populate_failure(&self) {
        self.populate_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn eviction_failure(&self) {
        self.eviction_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            forced_misses: self.forced_misses.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
            populates: self.populates.load(Ordering::Relaxed),
            populate_failures: self.populate_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            eviction_failures: self.eviction_failures.load(Ordering::Relaxed),
        }
    }
}

/// Copy of the cache counters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found no entry.
    pub misses: u64,
    /// Lookups treated as misses because the backend failed or the entry
    /// could not be decoded.
    pub forced_misses: u64,
    /// Calls that ran uncached because no key could be derived.
    pub bypasses: u64,
    /// Entries written after an origin read.
    pub populates: u64,
    /// Populates that failed and were skipped.
    pub populate_failures: u64,
    /// Keys evicted after an origin write.
    pub evictions: u64,
    /// Evictions that failed.
    pub eviction_failures: u64,
}

impl StatsSnapshot {
    /// Fraction of lookups answered from the cache, or 0 with no lookups.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses + self.forced_misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
