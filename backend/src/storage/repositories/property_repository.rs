use anyhow::Result;
use async_trait::async_trait;
use shared::{Property, PropertyForm};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{count_dependents, optional_date_column};
use crate::storage::connection::DbConnection;
use crate::storage::traits::{Dependent, EntityStorage};

const SELECT_PROPERTIES: &str = r#"
    SELECT p.property_id, p.name, p.address, p.total_units, p.property_type, p.status,
           p.last_inspection, p.manager_id, m.name AS manager_name, p.created_at, p.updated_at
    FROM properties p
    LEFT JOIN managers m ON p.manager_id = m.manager_id
"#;

/// Repository for properties
#[derive(Clone)]
pub struct PropertyRepository {
    db: DbConnection,
}

impl PropertyRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Property> {
        Ok(Property {
            property_id: row.try_get("property_id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            total_units: row.try_get("total_units")?,
            property_type: row.try_get("property_type")?,
            status: row.try_get("status")?,
            last_inspection: optional_date_column(row, "last_inspection")?,
            manager_id: row.try_get("manager_id")?,
            manager_name: row.try_get("manager_name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl EntityStorage for PropertyRepository {
    type Id = i64;
    type Record = Property;
    type Form = PropertyForm;

    const ENTITY: &'static str = "properties";
    const LABEL: &'static str = "Property";

    async fn list(&self) -> Result<Vec<Property>> {
        let sql = format!("{} ORDER BY p.name", SELECT_PROPERTIES);
        let rows = self.db.query(&sql, &[]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: &i64) -> Result<Option<Property>> {
        let sql = format!("{} WHERE p.property_id = ?", SELECT_PROPERTIES);
        let row = self.db.query_optional(&sql, &[(*id).into()]).await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, form: &PropertyForm) -> Result<i64> {
        self.db
            .insert(
                r#"
                INSERT INTO properties (name, address, total_units, property_type, status, last_inspection, manager_id)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
                &[
                    form.name.as_str().into(),
                    form.address.as_str().into(),
                    form.total_units.into(),
                    form.property_type.as_str().into(),
                    form.status.as_str().into(),
                    form.last_inspection.clone().into(),
                    form.manager_id.into(),
                ],
            )
            .await
    }

    async fn update(&self, id: &i64, form: &PropertyForm) -> Result<bool> {
        let affected = self
            .db
            .execute(
                r#"
                UPDATE properties
                SET name = ?, address = ?, total_units = ?, property_type = ?, status = ?,
                    last_inspection = ?, manager_id = ?, updated_at = datetime('now')
                WHERE property_id = ?
                "#,
                &[
                    form.name.as_str().into(),
                    form.address.as_str().into(),
                    form.total_units.into(),
                    form.property_type.as_str().into(),
                    form.status.as_str().into(),
                    form.last_inspection.clone().into(),
                    form.manager_id.into(),
                    (*id).into(),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &i64) -> Result<bool> {
        let affected = self
            .db
            .execute("DELETE FROM properties WHERE property_id = ?", &[(*id).into()])
            .await?;
        Ok(affected > 0)
    }

    async fn dependents(&self, id: &i64) -> Result<Vec<Dependent>> {
        count_dependents(
            &self.db,
            &[
                ("blocks", "property_id"),
                ("units", "property_id"),
                ("payments", "property_id"),
                ("expenses", "property_id"),
            ],
            (*id).into(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::TestEnvironment;

    #[tokio::test]
    async fn test_list_resolves_manager_name() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = PropertyRepository::new(env.connection.clone());

        let manager_id = env.add_manager("Jane Doe").await;
        let form = PropertyForm {
            property_id: None,
            name: "Sunrise Court".to_string(),
            address: "12 Hill Road".to_string(),
            total_units: 24,
            property_type: "Residential".to_string(),
            status: "Active".to_string(),
            last_inspection: Some("2025-01-10".to_string()),
            manager_id,
        };
        let id = repo.insert(&form).await.unwrap();

        let properties = repo.list().await.unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].property_id, id);
        assert_eq!(properties[0].manager_name.as_deref(), Some("Jane Doe"));
        assert!(properties[0].last_inspection.is_some());
    }

    #[tokio::test]
    async fn test_insert_with_unknown_manager_fails() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = PropertyRepository::new(env.connection.clone());

        let form = PropertyForm {
            name: "Orphan".to_string(),
            address: "Nowhere".to_string(),
            property_type: "Commercial".to_string(),
            status: "Active".to_string(),
            manager_id: 77,
            ..Default::default()
        };
        assert!(repo.insert(&form).await.is_err());
    }

    #[tokio::test]
    async fn test_dependents_lists_each_table() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = PropertyRepository::new(env.connection.clone());

        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        env.add_block(property_id, "A").await;
        env.add_unit(property_id, "A1", 100.0).await;
        env.add_unit(property_id, "A2", 100.0).await;

        let dependents = repo.dependents(&property_id).await.unwrap();
        assert_eq!(
            dependents,
            vec![
                Dependent { table: "blocks", count: 1 },
                Dependent { table: "units", count: 2 },
            ]
        );
    }
}
