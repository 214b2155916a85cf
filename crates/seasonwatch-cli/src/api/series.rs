use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use seasonwatch_models::Series;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct AddSeriesRequest {
    #[serde(alias = "imdb_id")]
    pub show_id: String,
    pub season: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /api/v1/series
pub async fn list_series(State(state): State<AppState>) -> Result<Json<Vec<Series>>, ApiError> {
    let mut series = state.service.get_all().await?;
    series.sort_by(|a, b| a.show_id.cmp(&b.show_id).then(a.season.cmp(&b.season)));
    Ok(Json(series))
}

/// POST /api/v1/series
pub async fn add_series(
    State(state): State<AppState>,
    payload: Result<Json<AddSeriesRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(format!("invalid request body: {}", e.body_text())))?;

    let season = u32::try_from(request.season)
        .ok()
        .filter(|s| *s > 0)
        .ok_or_else(|| ApiError::BadRequest("invalid show_id or season".to_string()))?;
    if request.show_id.trim().is_empty() {
        return Err(ApiError::BadRequest("invalid show_id or season".to_string()));
    }

    let outcome = state.service.add_series(&request.show_id, season).await?;
    Ok(Json(MessageResponse { message: outcome.message() }))
}
