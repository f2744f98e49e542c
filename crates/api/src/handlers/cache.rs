use axum::{extract::State, response::Json, routing::get, Router};
use tracing::instrument;

use crate::{dto::CacheStatsResponse, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/cache/stats", get(get_cache_stats))
}

#[instrument(skip(state), name = "api_get_cache_stats")]
async fn get_cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        enabled: state.cache.is_some(),
        cache: state.cache.as_ref().map(|cache| cache.stats()),
        engine: state.engine.stats(),
    })
}
