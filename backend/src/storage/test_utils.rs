//! Test utilities module for automatic cleanup and consistent test infrastructure
//!
//! Every test gets its own database file inside a temporary directory that is
//! removed when the `TestEnvironment` is dropped, even if the test panics.
use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::{DbConnection, SqlParam, DATABASE_FILE};

/// RAII Test Environment that automatically cleans up on drop
pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    /// The database connection for the test
    pub connection: DbConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
}

impl TestEnvironment {
    /// Create a new test environment with a fresh schema
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = DbConnection::open(&base_path.join(DATABASE_FILE)).await?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub async fn add_manager(&self, name: &str) -> i64 {
        self.connection
            .insert(
                "INSERT INTO managers (name, email, phone, hire_date) VALUES (?, ?, ?, ?)",
                &[name.into(), SqlParam::Null, "0700000000".into(), "2023-01-01".into()],
            )
            .await
            .expect("Failed to insert manager")
    }

    pub async fn add_property(&self, manager_id: i64, name: &str) -> i64 {
        self.connection
            .insert(
                "INSERT INTO properties (name, address, total_units, property_type, status, manager_id) \
                 VALUES (?, ?, ?, ?, ?, ?)",
                &[
                    name.into(),
                    "1 Main Street".into(),
                    10i64.into(),
                    "Residential".into(),
                    "Active".into(),
                    manager_id.into(),
                ],
            )
            .await
            .expect("Failed to insert property")
    }

    pub async fn add_block(&self, property_id: i64, name: &str) -> i64 {
        self.connection
            .insert(
                "INSERT INTO blocks (block_name, property_id, floor_count) VALUES (?, ?, ?)",
                &[name.into(), property_id.into(), 3i64.into()],
            )
            .await
            .expect("Failed to insert block")
    }

    pub async fn add_unit(&self, property_id: i64, unit_number: &str, monthly_rent: f64) -> i64 {
        self.connection
            .insert(
                "INSERT INTO units (unit_number, property_id, unit_status, unit_type, bedroom_count, \
                 bathroom_count, monthly_rent, security_deposit) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    unit_number.into(),
                    property_id.into(),
                    "Vacant".into(),
                    "Apartment".into(),
                    2i64.into(),
                    1i64.into(),
                    monthly_rent.into(),
                    0.0.into(),
                ],
            )
            .await
            .expect("Failed to insert unit")
    }

    /// Inserts the tenant row as given, without linking the unit
    pub async fn add_tenant(&self, full_name: &str, lease_start_date: &str, unit_id: Option<i64>) -> i64 {
        self.connection
            .insert(
                "INSERT INTO tenants (full_name, lease_start_date, rent_amount, deposit_amount, unit_id, status) \
                 VALUES (?, ?, ?, ?, ?, ?)",
                &[
                    full_name.into(),
                    lease_start_date.into(),
                    0.0.into(),
                    0.0.into(),
                    unit_id.into(),
                    "active".into(),
                ],
            )
            .await
            .expect("Failed to insert tenant")
    }

    pub async fn add_payment(
        &self,
        tenant_id: i64,
        unit_id: i64,
        property_id: i64,
        amount_paid: f64,
        payment_date: &str,
        category: &str,
    ) -> String {
        let payment_id = uuid::Uuid::new_v4().to_string();
        self.connection
            .execute(
                "INSERT INTO payments (payment_id, tenant_id, unit_id, property_id, amount_paid, payment_date, \
                 due_date, payment_month, payment_status, payment_method, payment_category) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, substr(?, 1, 7), ?, ?, ?)",
                &[
                    payment_id.clone().into(),
                    tenant_id.into(),
                    unit_id.into(),
                    property_id.into(),
                    amount_paid.into(),
                    payment_date.into(),
                    payment_date.into(),
                    payment_date.into(),
                    "Paid".into(),
                    "Cash".into(),
                    category.into(),
                ],
            )
            .await
            .expect("Failed to insert payment");
        payment_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_environment_cleans_up_on_drop() {
        let base_path = {
            let env = TestEnvironment::new().await.unwrap();
            assert!(env.base_path.join(DATABASE_FILE).exists());
            env.connection.close().await;
            env.base_path.clone()
        };
        assert!(!base_path.exists());
    }
}
