//! # REST API for Reports
//!
//! The arrears report and the property details view.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::info;
use serde_json::json;
use std::collections::HashMap;

use super::{arrears_request_from_params, error_response};
use crate::domain::{DomainError, PropertyDetailsQuery};
use crate::AppState;

/// Create a router for report APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/arrears", get(get_arrears_report))
}

/// Arrears for every tenant, or those of one property, through a month
pub async fn get_arrears_report(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    info!("GET /api/reports/arrears - params: {:?}", params);

    let request = match arrears_request_from_params(&params) {
        Ok(request) => request,
        Err(errors) => return error_response("Invalid arrears request", DomainError::Validation(errors)),
    };

    match state.ledger_service.arrears_report(&request).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response("Failed to build arrears report", e),
    }
}

/// Details view for one property; a missing property is an empty result
pub async fn get_property_details(
    State(state): State<AppState>,
    Path(property_id): Path<i64>,
    Query(query): Query<PropertyDetailsQuery>,
) -> Response {
    info!("GET /api/properties/{}/details - query: {:?}", property_id, query);

    match state.property_details_service.get(property_id, &query).await {
        Ok(Some(details)) => (StatusCode::OK, Json(details)).into_response(),
        Ok(None) => (StatusCode::OK, Json(json!({ "property": null }))).into_response(),
        Err(e) => error_response(&format!("Failed to load details for property {}", property_id), e),
    }
}
