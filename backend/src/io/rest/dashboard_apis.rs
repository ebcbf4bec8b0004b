//! # REST API for the Dashboard

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::info;

use super::error_response;
use crate::AppState;

/// Create a router for dashboard APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

/// Summary cards, recent activities and upcoming tasks
pub async fn get_dashboard(State(state): State<AppState>) -> Response {
    info!("GET /api/dashboard");

    match state.dashboard_service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response("Failed to load dashboard", e),
    }
}
