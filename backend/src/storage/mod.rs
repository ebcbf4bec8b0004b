//! # Storage Layer
//!
//! The data access layer: a pooled SQLite connection opened once at startup
//! and the per-table repositories built on top of it. Repositories return
//! `anyhow::Result`; the domain layer turns failures into typed errors.

pub mod connection;
pub mod repositories;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use connection::{DbConnection, SqlParam, DATABASE_FILE};
pub use repositories::*;
pub use traits::{Dependent, EntityStorage};
