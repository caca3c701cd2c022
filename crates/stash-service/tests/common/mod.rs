//! Common test infrastructure for user service tests.

#![allow(dead_code)]

use async_trait::async_trait;
use stash_cache::{Blob, CacheAside, CacheKey, CachePolicy, CacheStore, MemoryCacheStore, Namespace};
use stash_core::{StashError, StashResult, User, UserId};
use stash_service::{
    CachingUserService, CreateUserRequest, InMemoryUserRepository, UpdateUserRequest,
    UserRepository, UserResponse, UserService, UserServiceImpl,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// User service counting the calls that reach the origin.
pub struct CountingUserService {
    inner: UserServiceImpl,
    repository: Arc<InMemoryUserRepository>,
    reads: AtomicUsize,
}

impl CountingUserService {
    pub fn new() -> Arc<Self> {
        let repository = Arc::new(InMemoryUserRepository::new());
        Arc::new(Self {
            inner: UserServiceImpl::new(repository.clone()),
            repository,
            reads: AtomicUsize::new(0),
        })
    }

    /// Stores a user directly in the origin.
    pub async fn seed(&self, user: User) {
        self.repository.save(&user).await.expect("seed failed");
    }

    /// Number of read calls that reached the origin.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserService for CountingUserService {
    async fn get_user(&self, id: UserId) -> StashResult<UserResponse> {
        self.record_read();
        self.inner.get_user(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> StashResult<UserResponse> {
        self.record_read();
        self.inner.get_user_by_username(username).await
    }

    async fn username_exists(&self, username: &str) -> StashResult<bool> {
        self.record_read();
        self.inner.username_exists(username).await
    }

    async fn create_user(&self, request: CreateUserRequest) -> StashResult<UserResponse> {
        self.inner.create_user(request).await
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> StashResult<UserResponse> {
        self.inner.update_user(id, request).await
    }

    async fn delete_user(&self, id: UserId) -> StashResult<UserResponse> {
        self.inner.delete_user(id).await
    }
}

/// Store whose backend is never reachable.
pub struct UnreachableStore;

#[async_trait]
impl CacheStore for UnreachableStore {
    async fn get(&self, _key: &CacheKey) -> StashResult<Option<Blob>> {
        Err(StashError::cache_unavailable("Connection refused"))
    }

    async fn put(&self, _key: &CacheKey, _blob: Blob, _ttl: Option<Duration>) -> StashResult<()> {
        Err(StashError::cache_unavailable("Connection refused"))
    }

    async fn evict(&self, key: &CacheKey) -> StashResult<bool> {
        Err(StashError::eviction_failed(key.to_string(), "Connection refused"))
    }

    async fn exists(&self, _key: &CacheKey) -> StashResult<bool> {
        Err(StashError::cache_unavailable("Connection refused"))
    }

    async fn evict_namespace(&self, namespace: Namespace) -> StashResult<u64> {
        Err(StashError::eviction_failed(namespace.to_string(), "Connection refused"))
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "unreachable"
    }
}

/// Caching service over a counting origin and an in-memory store.
pub fn cached_service() -> (CachingUserService, Arc<CountingUserService>, Arc<MemoryCacheStore>) {
    let origin = CountingUserService::new();
    let store = Arc::new(MemoryCacheStore::new());
    let cache = CacheAside::new(store.clone(), CachePolicy::new(Duration::from_secs(300)));
    (CachingUserService::new(origin.clone(), cache), origin, store)
}

pub fn create_request(username: &str, name: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_string(),
        name: name.to_string(),
        email: None,
    }
}
