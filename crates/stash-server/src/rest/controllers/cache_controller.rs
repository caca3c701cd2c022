//! Cache statistics controller.

use crate::rest::{
    responses::{reply, ApiResult},
    state::AppState,
};
use axum::{extract::State, routing::get, Router};
use serde::Serialize;
use stash_cache::StatsSnapshot;

/// Cache statistics response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub backend: &'static str,
    pub enabled: bool,
    pub hit_rate: f64,
    #[serde(flatten)]
    pub counters: StatsSnapshot,
}

/// Creates the cache router.
pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(cache_stats))
}

async fn cache_stats(State(state): State<AppState>) -> ApiResult<CacheStatsResponse> {
    let store = state.cache.store();
    let counters = state.cache.stats();

    reply(CacheStatsResponse {
        backend: store.backend(),
        enabled: store.is_enabled(),
        hit_rate: counters.hit_rate(),
        counters,
    })
}
