//! # REST API for Entity Lists and Forms
//!
//! One generic set of handlers serves every entity module:
//!
//! - `GET /` list with `search`, `sort`, `direction`, `page`; any other key filters
//! - `POST /` save a form (insert without an id, update with one)
//! - `GET /export` CSV of every matching row
//! - `POST /export/to-path` write that CSV to a directory
//! - `GET /:id` one row
//! - `DELETE /:id?confirm=true` delete

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::ExportToPathRequest;
use std::collections::HashMap;
use std::marker::PhantomData;

use super::{error_response, list_query_from_params};
use crate::domain::{DomainError, EntityForm, EntityService, TableRow};
use crate::storage::{
    BlockRepository, ComplaintRepository, EntityStorage, ExpenseRepository, ManagerRepository, PaymentRepository,
    PropertyRepository, TenantRepository, UnitRepository,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

/// Create a router for one entity's list, form and export APIs
pub fn router<S>() -> Router<AppState>
where
    S: EntityStorage,
    S::Id: Serialize + DeserializeOwned,
    S::Record: TableRow + Serialize,
    S::Form: EntityForm<Id = S::Id> + DeserializeOwned,
    EntityService<S>: FromRef<AppState>,
{
    Router::new()
        .route("/", get(EntityApi::<S>::list).post(EntityApi::<S>::save))
        .route("/export", get(EntityApi::<S>::export_csv))
        .route("/export/to-path", post(EntityApi::<S>::export_to_path))
        .route("/:id", get(EntityApi::<S>::get).delete(EntityApi::<S>::delete))
}

/// Handlers for the entity stored by `S`
pub struct EntityApi<S>(PhantomData<S>);

impl<S> EntityApi<S>
where
    S: EntityStorage,
    S::Id: Serialize + DeserializeOwned,
    S::Record: TableRow + Serialize,
    S::Form: EntityForm<Id = S::Id> + DeserializeOwned,
{
    pub async fn list(
        State(service): State<EntityService<S>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        info!("GET /api/{} - params: {:?}", S::ENTITY, params);

        let query = match list_query_from_params(&params) {
            Ok(query) => query,
            Err(errors) => return error_response(&format!("Invalid {} list query", S::LABEL), errors.into()),
        };

        match service.list(&query).await {
            Ok(page) => (StatusCode::OK, Json(page)).into_response(),
            Err(e) => error_response(&format!("Failed to list {}", S::ENTITY), e),
        }
    }

    pub async fn save(State(service): State<EntityService<S>>, Json(form): Json<S::Form>) -> Response {
        info!("POST /api/{}", S::ENTITY);

        match service.save(form).await {
            Ok(response) => {
                let status = if response.created {
                    StatusCode::CREATED
                } else {
                    StatusCode::OK
                };
                (status, Json(response)).into_response()
            }
            Err(e) => error_response(&format!("Failed to save {}", S::LABEL), e),
        }
    }

    pub async fn get(State(service): State<EntityService<S>>, Path(id): Path<S::Id>) -> Response {
        info!("GET /api/{}/{}", S::ENTITY, id);

        match service.get(&id).await {
            Ok(record) => (StatusCode::OK, Json(record)).into_response(),
            Err(e) => error_response(&format!("Failed to get {} {}", S::LABEL, id), e),
        }
    }

    pub async fn delete(
        State(service): State<EntityService<S>>,
        Path(id): Path<S::Id>,
        Query(params): Query<DeleteParams>,
    ) -> Response {
        info!("DELETE /api/{}/{} - confirm: {}", S::ENTITY, id, params.confirm);

        match service.delete(&id, params.confirm).await {
            Ok(response) => (StatusCode::OK, Json(response)).into_response(),
            Err(e) => error_response(&format!("Failed to delete {} {}", S::LABEL, id), e),
        }
    }

    pub async fn export_csv(
        State(service): State<EntityService<S>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        info!("GET /api/{}/export - params: {:?}", S::ENTITY, params);

        let result = match list_query_from_params(&params) {
            Ok(query) => service.export_csv(&query).await,
            Err(errors) => Err(DomainError::from(errors)),
        };

        match result {
            Ok(export) => {
                info!("✅ Exported {} {} rows", export.row_count, S::ENTITY);
                (StatusCode::OK, Json(export)).into_response()
            }
            Err(e) => error_response(&format!("Failed to export {}", S::ENTITY), e),
        }
    }

    pub async fn export_to_path(
        State(service): State<EntityService<S>>,
        Query(params): Query<HashMap<String, String>>,
        Json(request): Json<ExportToPathRequest>,
    ) -> Response {
        info!("POST /api/{}/export/to-path - directory: {:?}", S::ENTITY, request.directory);

        let result = match list_query_from_params(&params) {
            Ok(query) => service.export_to_path(&query, &request).await,
            Err(errors) => Err(DomainError::from(errors)),
        };

        match result {
            Ok(response) if response.success => (StatusCode::OK, Json(response)).into_response(),
            Ok(response) => (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response(),
            Err(e) => error_response(&format!("Failed to export {}", S::ENTITY), e),
        }
    }
}

macro_rules! entity_state {
    ($($repository:ty => $field:ident),* $(,)?) => {
        $(
            impl FromRef<AppState> for EntityService<$repository> {
                fn from_ref(state: &AppState) -> Self {
                    state.$field.clone()
                }
            }
        )*
    };
}

entity_state! {
    ManagerRepository => managers,
    PropertyRepository => properties,
    BlockRepository => blocks,
    UnitRepository => units,
    TenantRepository => tenants,
    PaymentRepository => payments,
    ComplaintRepository => complaints,
    ExpenseRepository => expenses,
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{read_json, send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::{CsvExport, DeleteResponse, ErrorResponse, ListPage, Manager, Property, SaveResponse, Tenant, Unit};

    #[tokio::test]
    async fn test_manager_crud_round() {
        let (_env, app) = test_app().await;

        let response = send(
            &app,
            Method::POST,
            "/api/managers",
            Some(json!({
                "manager_id": null,
                "name": "  Jane Doe ",
                "email": "jane@example.com",
                "phone": "0700",
                "hire_date": "2024-01-05"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let saved: SaveResponse<i64> = read_json(response).await;

        let response = send(&app, Method::GET, &format!("/api/managers/{}", saved.id), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let manager: Manager = read_json(response).await;
        assert_eq!(manager.name, "Jane Doe");

        let response = send(&app, Method::GET, "/api/managers?search=jane", None).await;
        let page: ListPage<Manager> = read_json(response).await;
        assert_eq!(page.total, 1);

        let uri = format!("/api/managers/{}", saved.id);
        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.error, "confirmation_required");

        let response = send(&app, Method::DELETE, &format!("{}?confirm=true", uri), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let deleted: DeleteResponse = read_json(response).await;
        assert!(deleted.deleted);

        let response = send(&app, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_form_returns_field_errors() {
        let (_env, app) = test_app().await;

        let response = send(
            &app,
            Method::POST,
            "/api/properties",
            Some(json!({
                "property_id": null,
                "name": "",
                "address": "1 Main Street",
                "total_units": -1,
                "property_type": "Residential",
                "status": "Active",
                "last_inspection": null,
                "manager_id": 1
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.error, "validation");
        let fields: Vec<&str> = error.field_errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"total_units"));
    }

    #[tokio::test]
    async fn test_referenced_property_cannot_be_deleted() {
        let (env, app) = test_app().await;
        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        env.add_unit(property_id, "A1", 100.0).await;

        let uri = format!("/api/properties/{}?confirm=true", property_id);
        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.error, "referenced");
        assert!(error.message.contains("1 units"));

        let response = send(&app, Method::GET, &format!("/api/properties/{}", property_id), None).await;
        let property: Property = read_json(response).await;
        assert_eq!(property.manager_name.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn test_units_are_paginated_and_filtered() {
        let (env, app) = test_app().await;
        let manager_id = env.add_manager("Jane").await;
        let sunrise = env.add_property(manager_id, "Sunrise").await;
        let sunset = env.add_property(manager_id, "Sunset").await;
        for i in 0..11 {
            env.add_unit(sunrise, &format!("A{:02}", i), 100.0).await;
        }
        env.add_unit(sunset, "B01", 100.0).await;

        let response = send(&app, Method::GET, "/api/units", None).await;
        let page: ListPage<Unit> = read_json(response).await;
        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_pages, 2);

        let uri = format!("/api/units?property_id={}&page=2&sort=unit_number&direction=desc", sunrise);
        let response = send(&app, Method::GET, &uri, None).await;
        let page: ListPage<Unit> = read_json(response).await;
        assert_eq!(page.total, 11);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].unit_number, "A00");

        let response = send(&app, Method::GET, "/api/units?property_id=all&page=x", None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_saving_tenant_links_unit() {
        let (env, app) = test_app().await;
        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        let unit_id = env.add_unit(property_id, "A1", 100.0).await;

        let response = send(
            &app,
            Method::POST,
            "/api/tenants",
            Some(json!({
                "tenant_id": null,
                "full_name": "Tom",
                "phone_number": null,
                "email": null,
                "id_number": null,
                "lease_start_date": "2025-01-15",
                "lease_end_date": null,
                "rent_amount": 100.0,
                "deposit_amount": 0.0,
                "unit_id": unit_id
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let saved: SaveResponse<i64> = read_json(response).await;

        let response = send(&app, Method::GET, &format!("/api/units/{}", unit_id), None).await;
        let unit: Unit = read_json(response).await;
        assert_eq!(unit.tenant_id, Some(saved.id));
        assert_eq!(unit.unit_status, "Occupied");

        let response = send(&app, Method::GET, &format!("/api/tenants?property_id={}", property_id), None).await;
        let page: ListPage<Tenant> = read_json(response).await;
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_payment_with_unknown_tenant_is_rejected() {
        let (_env, app) = test_app().await;

        let response = send(
            &app,
            Method::POST,
            "/api/payments",
            Some(json!({
                "payment_id": null,
                "tenant_id": 7,
                "unit_id": 7,
                "property_id": 7,
                "amount_paid": 100.0,
                "payment_date": "2025-01-03",
                "due_date": "2025-01-05",
                "receipt_number": null,
                "transaction_reference": null,
                "remarks": null
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.error, "invalid_reference");
    }

    #[tokio::test]
    async fn test_blocks_export() {
        let (env, app) = test_app().await;
        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        env.add_block(property_id, "O'Brien, Towers \"East\"").await;

        let response = send(&app, Method::GET, "/api/blocks/export", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let export: CsvExport = read_json(response).await;
        assert!(export.filename.starts_with("blocks_"));
        assert_eq!(export.row_count, 1);
        assert!(export.csv_content.contains(",\"O'Brien, Towers \"\"East\"\"\","));

        let target = env.base_path.join("exports");
        let response = send(
            &app,
            Method::POST,
            "/api/blocks/export/to-path",
            Some(json!({ "directory": target.to_string_lossy() })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(target.join(&export.filename).exists());
    }
}
