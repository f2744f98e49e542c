use crate::errors::ApiError;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use homedns_application::services::TokenVerifier;
use std::sync::Arc;
use tracing::{debug, warn};

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Rejects the request with 401 unless it carries a token the verifier
/// accepts. The verified subject is stored in the request extensions.
pub async fn require_bearer(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        debug!(path = %request.uri().path(), "Request without bearer token");
        return Err(ApiError::unauthorized("missing_token"));
    };

    let subject = verifier.verify(&token, Utc::now()).await.map_err(|e| {
        warn!(path = %request.uri().path(), reason = e.code(), "Token rejected");
        ApiError::from(e)
    })?;

    debug!(subject = %subject.subject_id, "Token accepted");
    request.extensions_mut().insert(subject);

    Ok(next.run(request).await)
}
