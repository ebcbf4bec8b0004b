use anyhow::Result;
use async_trait::async_trait;
use shared::{Unit, UnitForm};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::count_dependents;
use crate::storage::connection::{DbConnection, SqlParam};
use crate::storage::traits::{Dependent, EntityStorage};

const SELECT_UNITS: &str = r#"
    SELECT u.unit_id, u.unit_number, u.property_id, p.name AS property_name, u.block_id, b.block_name,
           u.floor_number, u.unit_status, u.unit_type, u.bedroom_count, u.bathroom_count,
           u.monthly_rent, u.security_deposit, u.tenant_id, t.full_name AS tenant_name, u.notes
    FROM units u
    LEFT JOIN properties p ON u.property_id = p.property_id
    LEFT JOIN blocks b ON u.block_id = b.block_id
    LEFT JOIN tenants t ON u.tenant_id = t.tenant_id
"#;

/// Unit number and monthly rent, as used by the rent ledger
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRent {
    pub unit_number: String,
    pub monthly_rent: f64,
}

/// Repository for rentable units.
///
/// `tenant_id` is never written from a unit form; only tenant saves move it.
#[derive(Clone)]
pub struct UnitRepository {
    db: DbConnection,
}

impl UnitRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Unit> {
        Ok(Unit {
            unit_id: row.try_get("unit_id")?,
            unit_number: row.try_get("unit_number")?,
            property_id: row.try_get("property_id")?,
            property_name: row.try_get("property_name")?,
            block_id: row.try_get("block_id")?,
            block_name: row.try_get("block_name")?,
            floor_number: row.try_get("floor_number")?,
            unit_status: row.try_get("unit_status")?,
            unit_type: row.try_get("unit_type")?,
            bedroom_count: row.try_get("bedroom_count")?,
            bathroom_count: row.try_get("bathroom_count")?,
            monthly_rent: row.try_get("monthly_rent")?,
            security_deposit: row.try_get("security_deposit")?,
            tenant_id: row.try_get("tenant_id")?,
            tenant_name: row.try_get("tenant_name")?,
            notes: row.try_get("notes")?,
        })
    }

    fn form_params(form: &UnitForm) -> Vec<SqlParam> {
        vec![
            form.unit_number.as_str().into(),
            form.property_id.into(),
            form.block_id.into(),
            form.floor_number.into(),
            form.unit_status.as_str().into(),
            form.unit_type.as_str().into(),
            form.bedroom_count.into(),
            form.bathroom_count.into(),
            form.monthly_rent.into(),
            form.security_deposit.into(),
            form.notes.clone().into(),
        ]
    }

    /// Unit number and monthly rent of a single unit
    pub async fn rent_for_unit(&self, unit_id: i64) -> Result<Option<UnitRent>> {
        let row = self
            .db
            .query_optional(
                "SELECT unit_number, monthly_rent FROM units WHERE unit_id = ?",
                &[unit_id.into()],
            )
            .await?;

        match row {
            Some(r) => Ok(Some(UnitRent {
                unit_number: r.try_get("unit_number")?,
                monthly_rent: r.try_get("monthly_rent")?,
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl EntityStorage for UnitRepository {
    type Id = i64;
    type Record = Unit;
    type Form = UnitForm;

    const ENTITY: &'static str = "units";
    const LABEL: &'static str = "Unit";

    async fn list(&self) -> Result<Vec<Unit>> {
        let sql = format!("{} ORDER BY u.unit_number", SELECT_UNITS);
        let rows = self.db.query(&sql, &[]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: &i64) -> Result<Option<Unit>> {
        let sql = format!("{} WHERE u.unit_id = ?", SELECT_UNITS);
        let row = self.db.query_optional(&sql, &[(*id).into()]).await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, form: &UnitForm) -> Result<i64> {
        self.db
            .insert(
                r#"
                INSERT INTO units (unit_number, property_id, block_id, floor_number, unit_status, unit_type,
                                   bedroom_count, bathroom_count, monthly_rent, security_deposit, notes)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                &Self::form_params(form),
            )
            .await
    }

    async fn update(&self, id: &i64, form: &UnitForm) -> Result<bool> {
        let mut params = Self::form_params(form);
        params.push((*id).into());

        let affected = self
            .db
            .execute(
                r#"
                UPDATE units
                SET unit_number = ?, property_id = ?, block_id = ?, floor_number = ?, unit_status = ?,
                    unit_type = ?, bedroom_count = ?, bathroom_count = ?, monthly_rent = ?,
                    security_deposit = ?, notes = ?
                WHERE unit_id = ?
                "#,
                &params,
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &i64) -> Result<bool> {
        let affected = self
            .db
            .execute("DELETE FROM units WHERE unit_id = ?", &[(*id).into()])
            .await?;
        Ok(affected > 0)
    }

    async fn dependents(&self, id: &i64) -> Result<Vec<Dependent>> {
        count_dependents(
            &self.db,
            &[
                ("tenants", "unit_id"),
                ("payments", "unit_id"),
                ("complaints", "unit_id"),
                ("expenses", "unit_id"),
            ],
            (*id).into(),
        )
        .await
    }
}
