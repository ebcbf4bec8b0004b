//! # REST API for Activities and Tasks

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::info;
use serde::Deserialize;
use serde_json::json;
use shared::{NewActivityRequest, NewTaskRequest};

use super::error_response;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityListParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    /// Only tasks due on or after this date (YYYY-MM-DD)
    pub from: Option<String>,
    pub limit: Option<i64>,
}

/// Create a router for recent activity APIs
pub fn activities_router() -> Router<AppState> {
    Router::new().route("/", get(list_activities).post(add_activity))
}

/// Create a router for task APIs
pub fn tasks_router() -> Router<AppState> {
    Router::new().route("/", get(list_tasks).post(add_task))
}

pub async fn list_activities(State(state): State<AppState>, Query(params): Query<ActivityListParams>) -> Response {
    info!("GET /api/activities - limit: {:?}", params.limit);

    match state.reference_service.list_activities(params.limit).await {
        Ok(activities) => (StatusCode::OK, Json(activities)).into_response(),
        Err(e) => error_response("Failed to list activities", e),
    }
}

pub async fn add_activity(State(state): State<AppState>, Json(request): Json<NewActivityRequest>) -> Response {
    info!("POST /api/activities - request: {:?}", request);

    match state.reference_service.add_activity(&request).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "recent_activity_id": id }))).into_response(),
        Err(e) => error_response("Failed to add activity", e),
    }
}

pub async fn list_tasks(State(state): State<AppState>, Query(params): Query<TaskListParams>) -> Response {
    info!("GET /api/tasks - from: {:?}, limit: {:?}", params.from, params.limit);

    match state
        .reference_service
        .list_tasks(params.from.as_deref(), params.limit)
        .await
    {
        Ok(tasks) => (StatusCode::OK, Json(tasks)).into_response(),
        Err(e) => error_response("Failed to list tasks", e),
    }
}

pub async fn add_task(State(state): State<AppState>, Json(request): Json<NewTaskRequest>) -> Response {
    info!("POST /api/tasks - request: {:?}", request);

    match state.reference_service.add_task(&request).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "task_id": id }))).into_response(),
        Err(e) => error_response("Failed to add task", e),
    }
}
