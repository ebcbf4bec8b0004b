use anyhow::Result;
use async_trait::async_trait;
use shared::{Expense, ExpenseForm};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::date_column;
use crate::storage::connection::{DbConnection, SqlParam};
use crate::storage::traits::{Dependent, EntityStorage};

const SELECT_EXPENSES: &str = r#"
    SELECT e.expense_id, e.amount, e.category, e.description, e.expense_date,
           e.unit_id, u.unit_number, e.block_id, b.block_name, e.property_id, p.name AS property_name,
           e.payment_method, e.vendor, e.invoice_number, e.paid_by, e.created_at
    FROM expenses e
    LEFT JOIN units u ON e.unit_id = u.unit_id
    LEFT JOIN blocks b ON e.block_id = b.block_id
    LEFT JOIN properties p ON e.property_id = p.property_id
"#;

/// Repository for property expenses
#[derive(Clone)]
pub struct ExpenseRepository {
    db: DbConnection,
}

impl ExpenseRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Expense> {
        Ok(Expense {
            expense_id: row.try_get("expense_id")?,
            amount: row.try_get("amount")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            expense_date: date_column(row, "expense_date")?,
            unit_id: row.try_get("unit_id")?,
            unit_number: row.try_get("unit_number")?,
            block_id: row.try_get("block_id")?,
            block_name: row.try_get("block_name")?,
            property_id: row.try_get("property_id")?,
            property_name: row.try_get("property_name")?,
            payment_method: row.try_get("payment_method")?,
            vendor: row.try_get("vendor")?,
            invoice_number: row.try_get("invoice_number")?,
            paid_by: row.try_get("paid_by")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn form_params(form: &ExpenseForm) -> Vec<SqlParam> {
        vec![
            form.amount.into(),
            form.category.as_str().into(),
            form.description.clone().into(),
            form.expense_date.as_str().into(),
            form.unit_id.into(),
            form.block_id.into(),
            form.property_id.into(),
            form.payment_method.as_str().into(),
            form.vendor.as_str().into(),
            form.invoice_number.clone().into(),
            form.paid_by.clone().into(),
        ]
    }
}

#[async_trait]
impl EntityStorage for ExpenseRepository {
    type Id = i64;
    type Record = Expense;
    type Form = ExpenseForm;

    const ENTITY: &'static str = "expenses";
    const LABEL: &'static str = "Expense";

    async fn list(&self) -> Result<Vec<Expense>> {
        let sql = format!("{} ORDER BY e.expense_date DESC", SELECT_EXPENSES);
        let rows = self.db.query(&sql, &[]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: &i64) -> Result<Option<Expense>> {
        let sql = format!("{} WHERE e.expense_id = ?", SELECT_EXPENSES);
        let row = self.db.query_optional(&sql, &[(*id).into()]).await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, form: &ExpenseForm) -> Result<i64> {
        self.db
            .insert(
                r#"
                INSERT INTO expenses (amount, category, description, expense_date, unit_id, block_id,
                                      property_id, payment_method, vendor, invoice_number, paid_by)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                &Self::form_params(form),
            )
            .await
    }

    async fn update(&self, id: &i64, form: &ExpenseForm) -> Result<bool> {
        let mut params = Self::form_params(form);
        params.push((*id).into());

        let affected = self
            .db
            .execute(
                r#"
                UPDATE expenses
                SET amount = ?, category = ?, description = ?, expense_date = ?, unit_id = ?, block_id = ?,
                    property_id = ?, payment_method = ?, vendor = ?, invoice_number = ?, paid_by = ?
                WHERE expense_id = ?
                "#,
                &params,
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &i64) -> Result<bool> {
        let affected = self
            .db
            .execute("DELETE FROM expenses WHERE expense_id = ?", &[(*id).into()])
            .await?;
        Ok(affected > 0)
    }

    async fn dependents(&self, _id: &i64) -> Result<Vec<Dependent>> {
        Ok(Vec::new())
    }
}
