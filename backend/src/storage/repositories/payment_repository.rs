use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{Payment, PaymentForm, DATE_FORMAT};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{date_column, enum_column};
use crate::storage::connection::{DbConnection, SqlParam};
use crate::storage::traits::{Dependent, EntityStorage};

const SELECT_PAYMENTS: &str = r#"
    SELECT p.payment_id, p.tenant_id, t.full_name AS tenant_name, p.unit_id, u.unit_number,
           p.property_id, pr.name AS property_name, p.amount_paid, p.payment_date, p.due_date,
           p.payment_month, p.payment_status, p.payment_method, p.payment_category,
           p.receipt_number, p.transaction_reference, p.remarks, p.created_at, p.updated_at
    FROM payments p
    LEFT JOIN tenants t ON p.tenant_id = t.tenant_id
    LEFT JOIN units u ON p.unit_id = u.unit_id
    LEFT JOIN properties pr ON p.property_id = pr.property_id
"#;

/// Repository for tenant payments. Payment ids are UUID v4 strings and the
/// payment month is always derived from the due date.
#[derive(Clone)]
pub struct PaymentRepository {
    db: DbConnection,
}

impl PaymentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Payment> {
        Ok(Payment {
            payment_id: row.try_get("payment_id")?,
            tenant_id: row.try_get("tenant_id")?,
            tenant_name: row.try_get("tenant_name")?,
            unit_id: row.try_get("unit_id")?,
            unit_number: row.try_get("unit_number")?,
            property_id: row.try_get("property_id")?,
            property_name: row.try_get("property_name")?,
            amount_paid: row.try_get("amount_paid")?,
            payment_date: date_column(row, "payment_date")?,
            due_date: date_column(row, "due_date")?,
            payment_month: row.try_get("payment_month")?,
            payment_status: enum_column(row, "payment_status")?,
            payment_method: enum_column(row, "payment_method")?,
            payment_category: enum_column(row, "payment_category")?,
            receipt_number: row.try_get("receipt_number")?,
            transaction_reference: row.try_get("transaction_reference")?,
            remarks: row.try_get("remarks")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Column values shared by INSERT and UPDATE, payment month included
    fn form_params(form: &PaymentForm) -> Result<Vec<SqlParam>> {
        let due_date = NaiveDate::parse_from_str(&form.due_date, DATE_FORMAT)
            .with_context(|| format!("Invalid due date '{}'", form.due_date))?;
        let payment_month = due_date.format("%Y-%m").to_string();

        Ok(vec![
            form.tenant_id.into(),
            form.unit_id.into(),
            form.property_id.into(),
            form.amount_paid.into(),
            form.payment_date.as_str().into(),
            form.due_date.as_str().into(),
            payment_month.into(),
            form.payment_status.as_str().into(),
            form.payment_method.as_str().into(),
            form.payment_category.as_str().into(),
            form.receipt_number.clone().into(),
            form.transaction_reference.clone().into(),
            form.remarks.clone().into(),
        ])
    }

    /// Payments recorded against a property
    pub async fn list_for_property(&self, property_id: i64) -> Result<Vec<Payment>> {
        let sql = format!(
            "{} WHERE p.property_id = ? ORDER BY p.payment_date DESC",
            SELECT_PAYMENTS
        );
        let rows = self.db.query(&sql, &[property_id.into()]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    /// Date and amount of every Rent payment made by a tenant
    pub async fn rent_payments_for_tenant(&self, tenant_id: i64) -> Result<Vec<(NaiveDate, f64)>> {
        let rows = self
            .db
            .query(
                r#"
                SELECT payment_date, amount_paid
                FROM payments
                WHERE tenant_id = ? AND payment_category = 'Rent'
                ORDER BY payment_date
                "#,
                &[tenant_id.into()],
            )
            .await?;

        rows.iter()
            .map(|row| -> Result<(NaiveDate, f64)> {
                Ok((date_column(row, "payment_date")?, row.try_get("amount_paid")?))
            })
            .collect()
    }
}

#[async_trait]
impl EntityStorage for PaymentRepository {
    type Id = String;
    type Record = Payment;
    type Form = PaymentForm;

    const ENTITY: &'static str = "payments";
    const LABEL: &'static str = "Payment";

    async fn list(&self) -> Result<Vec<Payment>> {
        let sql = format!("{} ORDER BY p.payment_date DESC", SELECT_PAYMENTS);
        let rows = self.db.query(&sql, &[]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: &String) -> Result<Option<Payment>> {
        let sql = format!("{} WHERE p.payment_id = ?", SELECT_PAYMENTS);
        let row = self.db.query_optional(&sql, &[id.into()]).await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, form: &PaymentForm) -> Result<String> {
        let payment_id = uuid::Uuid::new_v4().to_string();
        let mut params = vec![SqlParam::from(payment_id.as_str())];
        params.extend(Self::form_params(form)?);

        self.db
            .execute(
                r#"
                INSERT INTO payments (payment_id, tenant_id, unit_id, property_id, amount_paid, payment_date,
                                      due_date, payment_month, payment_status, payment_method, payment_category,
                                      receipt_number, transaction_reference, remarks)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                &params,
            )
            .await?;

        Ok(payment_id)
    }

    async fn update(&self, id: &String, form: &PaymentForm) -> Result<bool> {
        let mut params = Self::form_params(form)?;
        params.push(id.into());

        let affected = self
            .db
            .execute(
                r#"
                UPDATE payments
                SET tenant_id = ?, unit_id = ?, property_id = ?, amount_paid = ?, payment_date = ?,
                    due_date = ?, payment_month = ?, payment_status = ?, payment_method = ?,
                    payment_category = ?, receipt_number = ?, transaction_reference = ?, remarks = ?,
                    updated_at = datetime('now')
                WHERE payment_id = ?
                "#,
                &params,
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &String) -> Result<bool> {
        let affected = self
            .db
            .execute("DELETE FROM payments WHERE payment_id = ?", &[id.into()])
            .await?;
        Ok(affected > 0)
    }

    async fn dependents(&self, _id: &String) -> Result<Vec<Dependent>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::TestEnvironment;
    use shared::{PaymentCategory, PaymentMethod, PaymentStatus};

    struct Ids {
        tenant_id: i64,
        unit_id: i64,
        property_id: i64,
    }

    async fn seed(env: &TestEnvironment) -> Ids {
        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        let unit_id = env.add_unit(property_id, "A1", 10000.0).await;
        let tenant_id = env.add_tenant("Tom", "2025-01-01", Some(unit_id)).await;
        Ids { tenant_id, unit_id, property_id }
    }

    fn form(ids: &Ids, due_date: &str) -> PaymentForm {
        PaymentForm {
            payment_id: None,
            tenant_id: ids.tenant_id,
            unit_id: ids.unit_id,
            property_id: ids.property_id,
            amount_paid: 10000.0,
            payment_date: "2025-03-02".to_string(),
            due_date: due_date.to_string(),
            payment_status: PaymentStatus::Paid,
            payment_method: PaymentMethod::MobileMoney,
            payment_category: PaymentCategory::Rent,
            receipt_number: Some("R-001".to_string()),
            transaction_reference: None,
            remarks: None,
        }
    }

    #[tokio::test]
    async fn test_insert_derives_payment_month_and_uuid() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = PaymentRepository::new(env.connection.clone());
        let ids = seed(&env).await;

        let id = repo.insert(&form(&ids, "2025-02-28")).await.unwrap();
        assert!(uuid::Uuid::parse_str(&id).is_ok());

        let payment = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(payment.payment_month, "2025-02");
        assert_eq!(payment.payment_method, PaymentMethod::MobileMoney);
        assert_eq!(payment.tenant_name.as_deref(), Some("Tom"));
        assert_eq!(payment.unit_number.as_deref(), Some("A1"));
        assert_eq!(payment.property_name.as_deref(), Some("Sunrise"));
    }

    #[tokio::test]
    async fn test_update_rederives_payment_month() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = PaymentRepository::new(env.connection.clone());
        let ids = seed(&env).await;

        let id = repo.insert(&form(&ids, "2025-02-28")).await.unwrap();
        assert!(repo.update(&id, &form(&ids, "2025-04-01")).await.unwrap());
        assert_eq!(repo.get(&id).await.unwrap().unwrap().payment_month, "2025-04");

        assert!(!repo.update(&"missing".to_string(), &form(&ids, "2025-04-01")).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_receipt_number_is_rejected() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = PaymentRepository::new(env.connection.clone());
        let ids = seed(&env).await;

        repo.insert(&form(&ids, "2025-02-28")).await.unwrap();
        assert!(repo.insert(&form(&ids, "2025-03-31")).await.is_err());
    }

    #[tokio::test]
    async fn test_rent_payments_for_tenant_excludes_other_categories() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = PaymentRepository::new(env.connection.clone());
        let ids = seed(&env).await;

        env.add_payment(ids.tenant_id, ids.unit_id, ids.property_id, 500.0, "2025-01-05", "Rent").await;
        env.add_payment(ids.tenant_id, ids.unit_id, ids.property_id, 80.0, "2025-01-06", "Utilities").await;
        env.add_payment(ids.tenant_id, ids.unit_id, ids.property_id, 500.0, "2025-02-05", "Rent").await;

        let payments = repo.rent_payments_for_tenant(ids.tenant_id).await.unwrap();
        assert_eq!(
            payments,
            vec![
                (NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(), 500.0),
                (NaiveDate::from_ymd_opt(2025, 2, 5).unwrap(), 500.0),
            ]
        );
        assert_eq!(repo.list_for_property(ids.property_id).await.unwrap().len(), 3);
    }
}
