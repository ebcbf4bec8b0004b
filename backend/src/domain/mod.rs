//! # Domain Module
//!
//! Contains all business logic for the property manager.
//!
//! This module holds the rules for how managers, properties, blocks, units,
//! tenants, payments, complaints and expenses are validated, listed and
//! reported on. It works against the storage traits and knows nothing about
//! HTTP.
//!
//! ## Module Organization
//!
//! - **entity_service**: Generic list/form service (search, filter, sort, paginate, save, delete, export)
//! - **listing**: The list engine and each record's searchable, sortable and exported columns
//! - **validation**: Form normalization and per-field validation rules
//! - **ledger**: Rent ledger and arrears calculator
//! - **dashboard_service**: Concurrent dashboard aggregates and summary cards
//! - **property_details_service**: Single-property view with units, tenants, payments and arrears
//! - **reference_service**: Recent activities and tasks
//! - **export_service**: CSV rendering and writing exports to disk
//! - **errors**: Typed domain errors
//!
//! ## Business Rules
//!
//! - Every write is validated before it reaches the database
//! - Deletes require explicit confirmation and are refused while other rows reference the target
//! - A payment's month is always the month of its due date
//! - Arrears count whole calendar months from the lease start month through the period end
//! - Only Rent payments count towards arrears

pub mod dashboard_service;
pub mod entity_service;
pub mod errors;
pub mod export_service;
pub mod ledger;
pub mod listing;
pub mod property_details_service;
pub mod reference_service;
pub mod validation;

pub use dashboard_service::*;
pub use entity_service::*;
pub use errors::*;
pub use export_service::*;
pub use ledger::*;
pub use listing::*;
pub use property_details_service::*;
pub use reference_service::*;
pub use validation::*;
