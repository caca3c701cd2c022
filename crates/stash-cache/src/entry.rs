//! Cache entries held by the in-process store.

use crate::Blob;
use std::time::Duration;
use tokio::time::Instant;

/// A single stored value with its expiry metadata.
///
/// Entries are replaced whole on every write; there is no partial update.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    blob: Blob,
    ttl: Option<Duration>,
    created_at: Instant,
}

impl CacheEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn new(blob: Blob, ttl: Option<Duration>) -> Self {
        Self {
            blob,
            ttl,
            created_at: Instant::now(),
        }
    }

    /// Returns the stored blob.
    #[must_use]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Returns the TTL, or `None` if the entry never expires.
    #[must_use]
    pub const fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns the creation instant.
    #[must_use]
    pub const fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Checks whether the entry has expired at `now`.
    ///
    /// An entry is expired once its full TTL has elapsed.
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(self.created_at) >= ttl)
    }

    /// Checks whether the entry has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Returns the remaining time to live, or `None` if the entry never expires.
    #[must_use]
    pub fn remaining_ttl(&self) -> Option<Duration> {
        self.ttl
            .map(|ttl| ttl.saturating_sub(Instant::now().saturating_duration_since(self.created_at)))
    }
}
