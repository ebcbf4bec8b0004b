//! # REST API Interface Layer
//!
//! HTTP endpoints for the property manager. Every entity shares the generic
//! handlers in [`entity_apis`]; reports, the dashboard and the reference
//! lists have their own small routers.
//!
//! ## Error Responses
//!
//! | Domain error | Status |
//! |---|---|
//! | Validation | 422 |
//! | NotFound | 404 |
//! | ConfirmationRequired | 409 |
//! | Referenced | 409 |
//! | InvalidReference | 422 |
//! | Storage | 500 |

pub mod dashboard_apis;
pub mod entity_apis;
pub mod reference_apis;
pub mod report_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;
use shared::{ArrearsRequest, ErrorResponse, ListQuery, SortDirection};
use std::collections::HashMap;

use crate::domain::{DomainError, ValidationErrors};

/// Query keys with a fixed meaning; any other key is a filter
const RESERVED_LIST_PARAMS: &[&str] = &["search", "sort", "direction", "page"];

/// Translate a domain error into a JSON error response, logging it first
pub fn error_response(context: &str, err: DomainError) -> Response {
    error!("❌ {}: {}", context, err);

    let (status, kind, message, field_errors) = match err {
        DomainError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation",
            errors.to_string(),
            errors.errors,
        ),
        e @ DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found", e.to_string(), Vec::new()),
        e @ DomainError::ConfirmationRequired { .. } => (
            StatusCode::CONFLICT,
            "confirmation_required",
            e.to_string(),
            Vec::new(),
        ),
        e @ DomainError::Referenced { .. } => (StatusCode::CONFLICT, "referenced", e.to_string(), Vec::new()),
        e @ DomainError::InvalidReference { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_reference",
            e.to_string(),
            Vec::new(),
        ),
        DomainError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "An internal error occurred".to_string(),
            Vec::new(),
        ),
    };

    let body = ErrorResponse {
        error: kind.to_string(),
        message,
        field_errors,
    };
    (status, Json(body)).into_response()
}

/// Build a list query from raw query-string parameters
pub fn list_query_from_params(params: &HashMap<String, String>) -> Result<ListQuery, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let direction = match params.get("direction").map(|d| d.trim()).filter(|d| !d.is_empty()) {
        Some(direction) => direction.parse::<SortDirection>().unwrap_or_else(|e| {
            errors.add("direction", e.to_string());
            SortDirection::default()
        }),
        None => SortDirection::default(),
    };

    let page = match params.get("page").map(|p| p.trim()).filter(|p| !p.is_empty()) {
        Some(page) => match page.parse::<usize>() {
            Ok(page) if page >= 1 => Some(page),
            _ => {
                errors.add("page", "must be a positive whole number");
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut filters: Vec<(String, String)> = params
        .iter()
        .filter(|(key, _)| !RESERVED_LIST_PARAMS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    filters.sort();

    Ok(ListQuery {
        search: params.get("search").cloned(),
        sort: params.get("sort").map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        direction,
        page,
        filters,
    })
}

/// Build an arrears request from raw query-string parameters.
/// A blank `property_id` or `month` means "all" and "unbounded".
pub fn arrears_request_from_params(params: &HashMap<String, String>) -> Result<ArrearsRequest, ValidationErrors> {
    let non_blank = |key: &str| params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    let property_id = match non_blank("property_id") {
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                let mut errors = ValidationErrors::default();
                errors.add("property_id", "must be a whole number");
                return Err(errors);
            }
        },
        None => None,
    };

    Ok(ArrearsRequest {
        property_id,
        month: non_blank("month").map(str::to_string),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use axum::response::Response;
    use axum::Router;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::storage::test_utils::TestEnvironment;
    use crate::{create_router, AppState};

    /// Router over a fresh test database
    pub async fn test_app() -> (TestEnvironment, Router) {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let app = create_router(AppState::new(env.connection.clone()), &AppConfig::default());
        (env, app)
    }

    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
        let request = Request::builder().uri(uri).method(method);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("Failed to build request");

        app.clone().oneshot(request).await.expect("Request failed")
    }

    pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        serde_json::from_slice(&body).expect("Response body is not the expected JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_list_query_from_params() {
        let query = list_query_from_params(&params(&[
            ("search", "sun"),
            ("sort", "name"),
            ("direction", "DESC"),
            ("page", "2"),
            ("status", "Active"),
            ("manager_id", "3"),
        ]))
        .unwrap();

        assert_eq!(query.search.as_deref(), Some("sun"));
        assert_eq!(query.sort.as_deref(), Some("name"));
        assert_eq!(query.direction, SortDirection::Desc);
        assert_eq!(query.page, Some(2));
        assert_eq!(
            query.filters,
            vec![
                ("manager_id".to_string(), "3".to_string()),
                ("status".to_string(), "Active".to_string()),
            ]
        );
    }

    #[test]
    fn test_arrears_request_from_params() {
        let request = arrears_request_from_params(&params(&[("property_id", " 4 "), ("month", "2025-03")])).unwrap();
        assert_eq!(request.property_id, Some(4));
        assert_eq!(request.month.as_deref(), Some("2025-03"));

        let request = arrears_request_from_params(&params(&[("property_id", ""), ("month", "  ")])).unwrap();
        assert_eq!(request.property_id, None);
        assert_eq!(request.month, None);

        let errors = arrears_request_from_params(&params(&[("property_id", "all")])).unwrap_err();
        assert_eq!(errors.message_for("property_id"), Some("must be a whole number"));
    }

    #[test]
    fn test_bad_list_params_are_field_errors() {
        let errors = list_query_from_params(&params(&[("direction", "up"), ("page", "0")])).unwrap_err();
        assert!(errors.message_for("direction").is_some());
        assert_eq!(errors.message_for("page"), Some("must be a positive whole number"));
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (DomainError::from(ValidationErrors::single("name", "is required")), StatusCode::UNPROCESSABLE_ENTITY),
            (
                DomainError::NotFound {
                    entity: "Unit",
                    id: "4".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                DomainError::ConfirmationRequired {
                    entity: "Unit",
                    id: "4".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (DomainError::Storage(anyhow::anyhow!("disk full")), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(error_response("test", err).status(), status);
        }
    }
}
