use anyhow::Result;

use crate::storage::connection::DbConnection;

/// Aggregate queries behind the dashboard cards
#[derive(Clone)]
pub struct DashboardRepository {
    db: DbConnection,
}

impl DashboardRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn count_properties(&self) -> Result<i64> {
        self.db.query_scalar_i64("SELECT COUNT(*) FROM properties", &[]).await
    }

    pub async fn count_active_tenants(&self) -> Result<i64> {
        self.db
            .query_scalar_i64("SELECT COUNT(*) FROM tenants WHERE status = 'active'", &[])
            .await
    }

    /// Paid payments whose payment month is `month` (YYYY-MM)
    pub async fn revenue_for_month(&self, month: &str) -> Result<f64> {
        self.db
            .query_scalar_f64(
                r#"
                SELECT COALESCE(SUM(amount_paid), 0.0)
                FROM payments
                WHERE payment_status = 'Paid' AND payment_month = ?
                "#,
                &[month.into()],
            )
            .await
    }

    pub async fn count_open_complaints(&self) -> Result<i64> {
        self.db
            .query_scalar_i64("SELECT COUNT(*) FROM complaints WHERE status <> 'Resolved'", &[])
            .await
    }

    /// Total units and units with a tenant
    pub async fn unit_occupancy(&self) -> Result<(i64, i64)> {
        let total = self.db.query_scalar_i64("SELECT COUNT(*) FROM units", &[]).await?;
        let occupied = self
            .db
            .query_scalar_i64("SELECT COUNT(*) FROM units WHERE tenant_id IS NOT NULL", &[])
            .await?;
        Ok((total, occupied))
    }

    pub async fn average_rent(&self) -> Result<f64> {
        self.db
            .query_scalar_f64("SELECT COALESCE(AVG(monthly_rent), 0.0) FROM units", &[])
            .await
    }

    /// Expenses dated within `month` (YYYY-MM)
    pub async fn expenses_for_month(&self, month: &str) -> Result<f64> {
        self.db
            .query_scalar_f64(
                "SELECT COALESCE(SUM(amount), 0.0) FROM expenses WHERE substr(expense_date, 1, 7) = ?",
                &[month.into()],
            )
            .await
    }
}
