//! # Stash Cache
//!
//! Read-through / write-invalidate caching in front of an origin data store.
//!
//! [`CacheAside`] wraps origin calls: it looks the key up in a
//! [`CacheStore`], falls through to the origin on a miss, and populates the
//! entry afterwards. Mutations run the origin write first and then evict
//! the affected keys. Every cache failure is recovered locally, so the
//! origin result is always what the caller sees.

pub mod aside;
pub mod codec;
pub mod entry;
pub mod key;
pub mod metrics;
mod single_flight;
pub mod stats;
pub mod store;

pub use aside::{CacheAside, CachePolicy, EvictionFailure, EvictionReport, WriteOutcome};
pub use codec::{Blob, Codec, JsonCodec};
pub use entry::CacheEntry;
pub use key::{CacheKey, Namespace};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{
    create_pool, CacheStore, MemoryCacheStore, RedisCacheStore, RedisCacheStoreParameters,
    DEFAULT_BACKEND_TIMEOUT,
};
