//! Dependency injection module using Shaku.
//!
//! [`StashModule`] holds the cache store and the origin side (repository and
//! uncached user service). The caching decorator is composed on top of the
//! resolved components by [`build_app_state`].

use crate::rest::AppState;
use shaku::{module, HasComponent};
use stash_cache::{
    create_pool, CacheAside, CachePolicy, CacheStore, MemoryCacheStore, RedisCacheStore,
    RedisCacheStoreParameters,
};
use stash_config::{CacheConfig, CacheProvider};
use stash_core::StashResult;
use stash_service::{
    CachingUserService, InMemoryUserRepository, UserRepository, UserService, UserServiceImpl,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Sweep interval for the in-process cache store.
pub const MEMORY_PURGE_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// Shaku Module Definition
// ============================================================================

module! {
    pub StashModule {
        components = [
            RedisCacheStore,
            InMemoryUserRepository,
            UserServiceImpl,
        ],
        providers = [],
    }
}

// ============================================================================
// Module Builder
// ============================================================================

/// Builds the module for the configured cache provider.
///
/// `redis` gets a pooled store, `memory` overrides the store with an
/// in-process map, and `none` (or `enabled = false`) keeps the Redis store
/// without a pool, which disables it. Must be called from within a Tokio
/// runtime.
pub fn build_module(config: &CacheConfig) -> StashResult<Arc<StashModule>> {
    let provider = config.effective_provider();
    let builder = StashModule::builder();

    let builder = match provider {
        CacheProvider::Redis => {
            builder.with_component_parameters::<RedisCacheStore>(RedisCacheStoreParameters {
                pool: Some(create_pool(config)?),
                key_prefix: config.key_prefix.clone(),
                timeout: config.connection_timeout(),
            })
        }
        CacheProvider::Memory => {
            let store = MemoryCacheStore::new();
            store.spawn_purge_task(MEMORY_PURGE_INTERVAL);
            builder.with_component_override::<dyn CacheStore>(Box::new(store))
        }
        CacheProvider::None => {
            builder.with_component_parameters::<RedisCacheStore>(RedisCacheStoreParameters {
                pool: None,
                key_prefix: config.key_prefix.clone(),
                timeout: config.connection_timeout(),
            })
        }
    };

    let module = builder.build();
    let store: Arc<dyn CacheStore> = module.resolve();
    info!(
        provider = %provider,
        backend = store.backend(),
        enabled = store.is_enabled(),
        "Cache store created"
    );

    Ok(Arc::new(module))
}

/// Composes the caching user service and the REST state from the module.
pub fn build_app_state(module: &StashModule, config: &CacheConfig) -> AppState {
    let cache = CacheAside::new(module.cache_store(), CachePolicy::from_config(config));
    let user_service: Arc<dyn UserService> =
        Arc::new(CachingUserService::new(module.user_service(), cache.clone()));

    AppState::new(user_service, cache)
}

// ============================================================================
// Module Resolution Helpers
// ============================================================================

/// Trait for resolving components from the module.
pub trait ServiceResolver {
    /// Resolves the uncached user service.
    fn user_service(&self) -> Arc<dyn UserService>;

    /// Resolves the user repository.
    fn user_repository(&self) -> Arc<dyn UserRepository>;

    /// Resolves the cache store.
    fn cache_store(&self) -> Arc<dyn CacheStore>;
}

impl ServiceResolver for StashModule {
    fn user_service(&self) -> Arc<dyn UserService> {
        self.resolve()
    }

    fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.resolve()
    }

    fn cache_store(&self) -> Arc<dyn CacheStore> {
        self.resolve()
    }
}
