//! SQLite repositories, one per table.
//!
//! Rows are mapped by hand from `SqliteRow`; stored ISO dates and enum
//! strings are parsed here so the domain only ever sees typed records.

pub mod block_repository;
pub mod complaint_repository;
pub mod dashboard_repository;
pub mod expense_repository;
pub mod manager_repository;
pub mod payment_repository;
pub mod property_repository;
pub mod reference_repository;
pub mod tenant_repository;
pub mod unit_repository;

pub use block_repository::BlockRepository;
pub use complaint_repository::ComplaintRepository;
pub use dashboard_repository::DashboardRepository;
pub use expense_repository::ExpenseRepository;
pub use manager_repository::ManagerRepository;
pub use payment_repository::PaymentRepository;
pub use property_repository::PropertyRepository;
pub use reference_repository::ReferenceRepository;
pub use tenant_repository::TenantRepository;
pub use unit_repository::UnitRepository;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use shared::DATE_FORMAT;
use std::str::FromStr;

use super::connection::{DbConnection, SqlParam};
use super::traits::Dependent;

/// Parse a non-null ISO date column
pub(crate) fn date_column(row: &SqliteRow, column: &str) -> Result<NaiveDate> {
    let raw: String = row.try_get(column)?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}' in column {}", raw, column))
}

/// Parse a nullable ISO date column; blank text reads as missing
pub(crate) fn optional_date_column(row: &SqliteRow, column: &str) -> Result<Option<NaiveDate>> {
    let raw: Option<String> = row.try_get(column)?;
    match raw {
        Some(value) if !value.trim().is_empty() => NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
            .map(Some)
            .with_context(|| format!("Invalid date '{}' in column {}", value, column)),
        _ => Ok(None),
    }
}

/// Parse a text column holding one of the shared enums
pub(crate) fn enum_column<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| anyhow!("{} in column {}", e, column))
}

/// Count the rows of each `(table, column)` pair that point at `id`; only
/// non-zero counts are returned
pub(crate) async fn count_dependents(
    db: &DbConnection,
    references: &[(&'static str, &'static str)],
    id: SqlParam,
) -> Result<Vec<Dependent>> {
    let mut dependents = Vec::new();
    for &(table, column) in references {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?", table, column);
        let count = db.query_scalar_i64(&sql, std::slice::from_ref(&id)).await?;
        if count > 0 {
            dependents.push(Dependent { table, count });
        }
    }
    Ok(dependents)
}
