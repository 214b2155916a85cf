use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use seasonwatch_core::TrackerError;
use serde_json::json;
use tracing::error;

/// Errors surfaced to HTTP clients as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    Upstream(String),
    Internal(String),
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        if err.is_already_exists() {
            return ApiError::Conflict(err.to_string());
        }
        match err {
            TrackerError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            TrackerError::CheckInProgress => ApiError::Conflict(err.to_string()),
            TrackerError::Fetch(_) => ApiError::Upstream(err.to_string()),
            TrackerError::Store(_) | TrackerError::Task(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => {
                error!(operation = "api_error", error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
