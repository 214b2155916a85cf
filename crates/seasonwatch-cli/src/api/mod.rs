//! HTTP surface for the tracker
//!
//! A thin routing layer: every handler delegates to [`TrackerService`].

mod check;
mod error;
mod health;
mod series;

use axum::routing::{get, post};
use axum::Router;
use seasonwatch_core::TrackerService;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TrackerService>,
}

impl AppState {
    pub fn new(service: Arc<TrackerService>) -> Self {
        Self { service }
    }
}

/// Build the application router
///
/// `request_timeout` bounds how long a single request may take. Config
/// validation keeps it above the scraper timeout, since adding fetches a page.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/v1/series",
            get(series::list_series).post(series::add_series),
        )
        .route("/api/v1/check", post(check::trigger_check))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
