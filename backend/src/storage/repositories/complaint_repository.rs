use anyhow::Result;
use async_trait::async_trait;
use shared::{Complaint, ComplaintForm};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::enum_column;
use crate::storage::connection::DbConnection;
use crate::storage::traits::{Dependent, EntityStorage};

const SELECT_COMPLAINTS: &str = r#"
    SELECT c.complaint_id, c.unit_id, u.unit_number, c.tenant_id, t.full_name AS tenant_name,
           c.description, c.status, c.created_at, c.updated_at
    FROM complaints c
    LEFT JOIN units u ON c.unit_id = u.unit_id
    LEFT JOIN tenants t ON c.tenant_id = t.tenant_id
"#;

/// Repository for maintenance complaints
#[derive(Clone)]
pub struct ComplaintRepository {
    db: DbConnection,
}

impl ComplaintRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Complaint> {
        Ok(Complaint {
            complaint_id: row.try_get("complaint_id")?,
            unit_id: row.try_get("unit_id")?,
            unit_number: row.try_get("unit_number")?,
            tenant_id: row.try_get("tenant_id")?,
            tenant_name: row.try_get("tenant_name")?,
            description: row.try_get("description")?,
            status: enum_column(row, "status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl EntityStorage for ComplaintRepository {
    type Id = i64;
    type Record = Complaint;
    type Form = ComplaintForm;

    const ENTITY: &'static str = "complaints";
    const LABEL: &'static str = "Complaint";

    async fn list(&self) -> Result<Vec<Complaint>> {
        let sql = format!("{} ORDER BY c.created_at DESC, c.complaint_id DESC", SELECT_COMPLAINTS);
        let rows = self.db.query(&sql, &[]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: &i64) -> Result<Option<Complaint>> {
        let sql = format!("{} WHERE c.complaint_id = ?", SELECT_COMPLAINTS);
        let row = self.db.query_optional(&sql, &[(*id).into()]).await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, form: &ComplaintForm) -> Result<i64> {
        self.db
            .insert(
                "INSERT INTO complaints (unit_id, tenant_id, description, status) VALUES (?, ?, ?, ?)",
                &[
                    form.unit_id.into(),
                    form.tenant_id.into(),
                    form.description.as_str().into(),
                    form.status.as_str().into(),
                ],
            )
            .await
    }

    async fn update(&self, id: &i64, form: &ComplaintForm) -> Result<bool> {
        let affected = self
            .db
            .execute(
                r#"
                UPDATE complaints
                SET unit_id = ?, tenant_id = ?, description = ?, status = ?, updated_at = datetime('now')
                WHERE complaint_id = ?
                "#,
                &[
                    form.unit_id.into(),
                    form.tenant_id.into(),
                    form.description.as_str().into(),
                    form.status.as_str().into(),
                    (*id).into(),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &i64) -> Result<bool> {
        let affected = self
            .db
            .execute("DELETE FROM complaints WHERE complaint_id = ?", &[(*id).into()])
            .await?;
        Ok(affected > 0)
    }

    async fn dependents(&self, _id: &i64) -> Result<Vec<Dependent>> {
        Ok(Vec::new())
    }
}
