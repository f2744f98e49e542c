use crate::handlers;
use crate::middleware::require_bearer;
use crate::state::AppState;
use axum::{middleware, routing::get, Router};
use tracing::warn;

/// Builds the control API. Everything except `/api/health` sits behind the
/// bearer-token check unless verification is disabled.
pub fn create_api_routes(state: AppState) -> Router {
    let protected = Router::new()
        .merge(handlers::records::routes())
        .merge(handlers::credentials::routes())
        .merge(handlers::cache::routes());

    let protected = match state.verifier.clone() {
        Some(verifier) => {
            protected.route_layer(middleware::from_fn_with_state(verifier, require_bearer))
        }
        None => {
            warn!("Control API token verification is disabled");
            protected
        }
    };

    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .merge(protected);

    Router::new().nest("/api", api).with_state(state)
}
