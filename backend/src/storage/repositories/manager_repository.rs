use anyhow::Result;
use async_trait::async_trait;
use shared::{Manager, ManagerForm};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{count_dependents, date_column};
use crate::storage::connection::DbConnection;
use crate::storage::traits::{Dependent, EntityStorage};

const SELECT_MANAGERS: &str = r#"
    SELECT manager_id, name, email, phone, hire_date
    FROM managers
"#;

/// Repository for property managers
#[derive(Clone)]
pub struct ManagerRepository {
    db: DbConnection,
}

impl ManagerRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Manager> {
        Ok(Manager {
            manager_id: row.try_get("manager_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            hire_date: date_column(row, "hire_date")?,
        })
    }
}

#[async_trait]
impl EntityStorage for ManagerRepository {
    type Id = i64;
    type Record = Manager;
    type Form = ManagerForm;

    const ENTITY: &'static str = "managers";
    const LABEL: &'static str = "Manager";

    async fn list(&self) -> Result<Vec<Manager>> {
        let sql = format!("{} ORDER BY name", SELECT_MANAGERS);
        let rows = self.db.query(&sql, &[]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: &i64) -> Result<Option<Manager>> {
        let sql = format!("{} WHERE manager_id = ?", SELECT_MANAGERS);
        let row = self.db.query_optional(&sql, &[(*id).into()]).await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, form: &ManagerForm) -> Result<i64> {
        self.db
            .insert(
                "INSERT INTO managers (name, email, phone, hire_date) VALUES (?, ?, ?, ?)",
                &[
                    form.name.as_str().into(),
                    form.email.clone().into(),
                    form.phone.as_str().into(),
                    form.hire_date.as_str().into(),
                ],
            )
            .await
    }

    async fn update(&self, id: &i64, form: &ManagerForm) -> Result<bool> {
        let affected = self
            .db
            .execute(
                "UPDATE managers SET name = ?, email = ?, phone = ?, hire_date = ? WHERE manager_id = ?",
                &[
                    form.name.as_str().into(),
                    form.email.clone().into(),
                    form.phone.as_str().into(),
                    form.hire_date.as_str().into(),
                    (*id).into(),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &i64) -> Result<bool> {
        let affected = self
            .db
            .execute("DELETE FROM managers WHERE manager_id = ?", &[(*id).into()])
            .await?;
        Ok(affected > 0)
    }

    async fn dependents(&self, id: &i64) -> Result<Vec<Dependent>> {
        count_dependents(&self.db, &[("properties", "manager_id")], (*id).into()).await
    }
}
