use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get},
    Router,
};
use homedns_domain::{InvocationContext, SigningAlgorithm};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    dto::{CredentialResponse, RemovedCredentialResponse},
    errors::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/credentials", get(list_credentials).post(add_credential))
        .route("/credentials/{subject_id}", delete(remove_credential))
}

#[instrument(skip(state), name = "api_list_credentials")]
async fn list_credentials(
    State(state): State<AppState>,
) -> Result<Json<Vec<CredentialResponse>>, ApiError> {
    let subjects = state.list_credentials.execute().await?;
    debug!(count = subjects.len(), "Credentials listed");
    Ok(Json(
        subjects.into_iter().map(CredentialResponse::from).collect(),
    ))
}

/// Remote callers can never add a credential; the use case refuses the
/// `Remote` context and the caller gets 403.
#[instrument(skip(state), name = "api_add_credential")]
async fn add_credential(State(state): State<AppState>) -> Result<Json<CredentialResponse>, ApiError> {
    let issued = state
        .add_credential
        .execute(InvocationContext::Remote, SigningAlgorithm::default())
        .await?;
    Ok(Json(CredentialResponse {
        subject_id: issued.subject_id,
        algorithm: issued.algorithm,
        created_at: issued.created_at.to_rfc3339(),
    }))
}

#[instrument(skip(state), name = "api_remove_credential")]
async fn remove_credential(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<Json<RemovedCredentialResponse>, ApiError> {
    let subject_id = Uuid::parse_str(&subject_id)
        .map_err(|_| ApiError::bad_request(format!("Invalid subject id: {}", subject_id)))?;
    let removed = state.remove_credential.execute(&subject_id).await?;
    if removed {
        info!(subject = %subject_id, "Credential removed through the API");
    }
    Ok(Json(RemovedCredentialResponse { removed }))
}
