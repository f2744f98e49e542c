use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use homedns_domain::{AuthError, DomainError};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Failure returned by a handler: a status code plus a JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                reason: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// 401 carrying the verifier's reason code; never the token itself.
    pub fn unauthorized(reason: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorBody {
                error: "unauthorized".to_string(),
                reason: Some(reason.to_string()),
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::unauthorized(err.code())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_) | DomainError::InvalidDomainName(_) => {
                ApiError::bad_request(err.to_string())
            }
            DomainError::RecordNotFound(_) => ApiError::not_found(err.to_string()),
            DomainError::DuplicateRecord(_) => ApiError::new(StatusCode::CONFLICT, err.to_string()),
            DomainError::AccessDenied(_) => ApiError::new(StatusCode::FORBIDDEN, err.to_string()),
            DomainError::Auth(auth) => auth.into(),
            other => {
                error!(error = %other, "Request failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
