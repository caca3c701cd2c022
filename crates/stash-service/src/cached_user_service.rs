//! Cache-aside decorator for [`UserService`].

use crate::cache_keys;
use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::user_service::UserService;
use async_trait::async_trait;
use stash_cache::{CacheAside, EvictionReport, StatsSnapshot};
use stash_core::{StashResult, UserId};
use std::sync::Arc;
use tracing::warn;

/// User service serving reads from the cache and evicting on writes.
///
/// | operation              | cached under                 | evicts                                        |
/// |------------------------|------------------------------|-----------------------------------------------|
/// | `get_user`             | `userById:<id>`              |                                               |
/// | `get_user_by_username` | `userByUsername:<name>`      |                                               |
/// | `username_exists`      | `userExistsByUsername:<name>`|                                               |
/// | `create_user`          |                              | `userByUsername`, `userExistsByUsername`      |
/// | `update_user`          |                              | `userById`, `userByUsername`                  |
/// | `delete_user`          |                              | `userById`, `userByUsername`, `userExistsByUsername` |
///
/// Cache failures never fail a call; incomplete evictions are logged.
pub struct CachingUserService {
    inner: Arc<dyn UserService>,
    cache: CacheAside,
}

impl CachingUserService {
    /// Wraps a user service.
    pub fn new(inner: Arc<dyn UserService>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }

    /// Returns the cache-aside wrapper.
    #[must_use]
    pub const fn cache(&self) -> &CacheAside {
        &self.cache
    }

    /// Returns a snapshot of the cache counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.cache.stats()
    }
}

fn warn_incomplete(operation: &str, report: &EvictionReport) {
    if !report.is_complete() {
        let keys: Vec<String> = report.failed_keys().iter().map(|k| k.to_string()).collect();
        warn!(
            "{} succeeded but {} cache key(s) could not be evicted and may be stale until TTL: {}",
            operation,
            keys.len(),
            keys.join(", ")
        );
    }
}

#[async_trait]
impl UserService for CachingUserService {
    async fn get_user(&self, id: UserId) -> StashResult<UserResponse> {
        self.cache
            .get_or_load(cache_keys::user_by_id(id), || self.inner.get_user(id))
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> StashResult<UserResponse> {
        self.cache
            .get_or_load(cache_keys::user_by_username(username), || {
                self.inner.get_user_by_username(username)
            })
            .await
    }

    async fn username_exists(&self, username: &str) -> StashResult<bool> {
        self.cache
            .get_or_load(cache_keys::username_exists(username), || {
                self.inner.username_exists(username)
            })
            .await
    }

    async fn create_user(&self, request: CreateUserRequest) -> StashResult<UserResponse> {
        let outcome = self
            .cache
            .write_and_evict(
                || self.inner.create_user(request),
                |user| {
                    vec![
                        cache_keys::user_by_username(&user.username),
                        cache_keys::username_exists(&user.username),
                    ]
                },
            )
            .await?;

        warn_incomplete("create_user", &outcome.evictions);
        Ok(outcome.value)
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> StashResult<UserResponse> {
        let outcome = self
            .cache
            .write_and_evict(
                || self.inner.update_user(id, request),
                |user| {
                    vec![
                        cache_keys::user_by_id(user.id),
                        cache_keys::user_by_username(&user.username),
                    ]
                },
            )
            .await?;

        warn_incomplete("update_user", &outcome.evictions);
        Ok(outcome.value)
    }

    async fn delete_user(&self, id: UserId) -> StashResult<UserResponse> {
        let outcome = self
            .cache
            .write_and_evict(
                || self.inner.delete_user(id),
                |user| {
                    vec![
                        cache_keys::user_by_id(user.id),
                        cache_keys::user_by_username(&user.username),
                        cache_keys::username_exists(&user.username),
                    ]
                },
            )
            .await?;

        warn_incomplete("delete_user", &outcome.evictions);
        Ok(outcome.value)
    }
}

impl std::fmt::Debug for CachingUserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingUserService")
            .field("backend", &self.cache.store().backend())
            .finish_non_exhaustive()
    }
}
