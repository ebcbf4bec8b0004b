//! # Property Manager Backend
//!
//! Contains all non-UI logic for the property manager.
//!
//! This crate is the orchestration layer that brings together:
//! - **Domain**: Business rules for managers, properties, units, tenants, payments and reports
//! - **Storage**: A pooled SQLite database and one repository per table
//! - **IO**: The REST API exposed to the UI
//!
//! ## Architecture
//!
//! ```text
//! UI (browser)
//!     ↓
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (Business logic, services)
//!     ↓
//! Storage Layer (SQLite, repositories)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Load configuration and open the database once at startup
//! - Build the application state shared by every handler
//! - Set up the REST API router with CORS for the UI origin

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use log::{info, warn};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::domain::{DashboardService, EntityService, LedgerService, PropertyDetailsService, ReferenceService};
use crate::io::rest::{dashboard_apis, entity_apis, reference_apis, report_apis};
use crate::storage::{
    BlockRepository, ComplaintRepository, DashboardRepository, DbConnection, ExpenseRepository, ManagerRepository,
    PaymentRepository, PropertyRepository, ReferenceRepository, TenantRepository, UnitRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub db: DbConnection,
    pub managers: EntityService<ManagerRepository>,
    pub properties: EntityService<PropertyRepository>,
    pub blocks: EntityService<BlockRepository>,
    pub units: EntityService<UnitRepository>,
    pub tenants: EntityService<TenantRepository>,
    pub payments: EntityService<PaymentRepository>,
    pub complaints: EntityService<ComplaintRepository>,
    pub expenses: EntityService<ExpenseRepository>,
    pub ledger_service: LedgerService,
    pub dashboard_service: DashboardService,
    pub property_details_service: PropertyDetailsService,
    pub reference_service: ReferenceService,
}

impl AppState {
    /// Wire every service onto one database handle
    pub fn new(db: DbConnection) -> Self {
        let managers = EntityService::new(ManagerRepository::new(db.clone()));
        let properties = EntityService::new(PropertyRepository::new(db.clone()));
        let blocks = EntityService::new(BlockRepository::new(db.clone()));
        let units = EntityService::new(UnitRepository::new(db.clone()));
        let tenants = EntityService::new(TenantRepository::new(db.clone()));
        let payments = EntityService::new(PaymentRepository::new(db.clone()));
        let complaints = EntityService::new(ComplaintRepository::new(db.clone()));
        let expenses = EntityService::new(ExpenseRepository::new(db.clone()));

        let ledger_service = LedgerService::new(
            tenants.storage().clone(),
            units.storage().clone(),
            payments.storage().clone(),
        );
        let dashboard_service = DashboardService::new(
            DashboardRepository::new(db.clone()),
            ReferenceRepository::new(db.clone()),
        );
        let property_details_service = PropertyDetailsService::new(
            properties.storage().clone(),
            units.clone(),
            blocks.clone(),
            tenants.storage().clone(),
            payments.storage().clone(),
            ledger_service.clone(),
        );
        let reference_service = ReferenceService::new(ReferenceRepository::new(db.clone()));

        Self {
            db,
            managers,
            properties,
            blocks,
            units,
            tenants,
            payments,
            complaints,
            expenses,
            ledger_service,
            dashboard_service,
            property_details_service,
            reference_service,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {:?}", config.database_path());
    let db = DbConnection::open(&config.database_path())
        .await
        .context("Failed to initialize database")?;

    info!("Setting up application state");
    Ok(AppState::new(db))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    let cors = match config.ui_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            warn!("Invalid UI origin '{}', allowing any origin", config.ui_origin);
            CorsLayer::new().allow_origin(Any)
        }
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/managers", entity_apis::router::<ManagerRepository>())
        .nest(
            "/properties",
            entity_apis::router::<PropertyRepository>().route("/:id/details", get(report_apis::get_property_details)),
        )
        .nest("/blocks", entity_apis::router::<BlockRepository>())
        .nest("/units", entity_apis::router::<UnitRepository>())
        .nest("/tenants", entity_apis::router::<TenantRepository>())
        .nest("/payments", entity_apis::router::<PaymentRepository>())
        .nest("/complaints", entity_apis::router::<ComplaintRepository>())
        .nest("/expenses", entity_apis::router::<ExpenseRepository>())
        .nest("/reports", report_apis::router())
        .nest("/dashboard", dashboard_apis::router())
        .nest("/activities", reference_apis::activities_router())
        .nest("/tasks", reference_apis::tasks_router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
