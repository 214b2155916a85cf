use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use seasonwatch_core::TrackerError;
use tracing::info;

use super::series::MessageResponse;
use super::{ApiError, AppState};

/// POST /api/v1/check
///
/// Starts a reconciliation in the background and answers immediately.
pub async fn trigger_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    match state.service.trigger_check() {
        Ok(_handle) => {
            info!(operation = "check_triggered", trigger = "api", "Manual check started");
            Ok((
                StatusCode::ACCEPTED,
                Json(MessageResponse { message: "Check started".to_string() }),
            ))
        }
        Err(TrackerError::CheckInProgress) => Ok((
            StatusCode::CONFLICT,
            Json(MessageResponse { message: "Check already in progress".to_string() }),
        )),
        Err(e) => Err(e.into()),
    }
}
