use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use homedns_domain::RecordType;
use tracing::{debug, instrument};

use crate::{
    dto::{DeletedRecordsResponse, RecordRequest, RecordResponse, RecordSearchQuery},
    errors::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/records", get(list_records))
        .route("/records/{record_type}", post(create_record).put(update_record))
        .route("/records/{record_type}/upsert", put(upsert_record))
        .route(
            "/records/{record_type}/{name}",
            get(get_record_set).delete(delete_record_set),
        )
}

fn parse_record_type(raw: &str) -> Result<RecordType, ApiError> {
    raw.parse::<RecordType>().map_err(ApiError::bad_request)
}

#[instrument(skip(state), name = "api_list_records")]
async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<RecordSearchQuery>,
) -> Result<Json<Vec<RecordResponse>>, ApiError> {
    let records = state.get_records.list(query.search.as_deref()).await?;
    debug!(count = records.len(), "Records retrieved");
    Ok(Json(records.into_iter().map(RecordResponse::from).collect()))
}

#[instrument(skip(state), name = "api_get_record_set")]
async fn get_record_set(
    State(state): State<AppState>,
    Path((record_type, name)): Path<(String, String)>,
) -> Result<Json<Vec<RecordResponse>>, ApiError> {
    let record_type = parse_record_type(&record_type)?;
    let records = state.get_records.get(&name, record_type).await?;
    if records.is_empty() {
        return Err(ApiError::not_found(format!(
            "No {} records for {}",
            record_type, name
        )));
    }
    Ok(Json(records.into_iter().map(RecordResponse::from).collect()))
}

#[instrument(skip(state, req), name = "api_create_record")]
async fn create_record(
    State(state): State<AppState>,
    Path(record_type): Path<String>,
    Json(req): Json<RecordRequest>,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let record_type = parse_record_type(&record_type)?;
    let record = state
        .create_record
        .execute(&req.name, record_type, &req.value, req.ttl)
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[instrument(skip(state, req), name = "api_update_record")]
async fn update_record(
    State(state): State<AppState>,
    Path(record_type): Path<String>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record_type = parse_record_type(&record_type)?;
    let record = state
        .update_record
        .execute(&req.name, record_type, &req.value, req.ttl)
        .await?;
    Ok(Json(record.into()))
}

#[instrument(skip(state, req), name = "api_upsert_record")]
async fn upsert_record(
    State(state): State<AppState>,
    Path(record_type): Path<String>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record_type = parse_record_type(&record_type)?;
    let record = state
        .upsert_record
        .execute(&req.name, record_type, &req.value, req.ttl)
        .await?;
    Ok(Json(record.into()))
}

#[instrument(skip(state), name = "api_delete_record_set")]
async fn delete_record_set(
    State(state): State<AppState>,
    Path((record_type, name)): Path<(String, String)>,
) -> Result<Json<DeletedRecordsResponse>, ApiError> {
    let record_type = parse_record_type(&record_type)?;
    let removed = state.delete_record.execute(&name, record_type).await?;
    Ok(Json(DeletedRecordsResponse { removed }))
}
