use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use shared::{Tenant, TenantForm};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::{count_dependents, enum_column};
use crate::storage::connection::{bind_params, DbConnection, SqlParam};
use crate::storage::traits::{Dependent, EntityStorage};

const SELECT_TENANTS: &str = r#"
    SELECT t.tenant_id, t.full_name, t.phone_number, t.email, t.id_number, t.lease_start_date,
           t.lease_end_date, t.rent_amount, t.deposit_amount, t.unit_id, u.unit_number, u.property_id,
           t.status, t.created_at, t.updated_at
    FROM tenants t
    LEFT JOIN units u ON t.unit_id = u.unit_id
"#;

/// Repository for tenants.
///
/// Tenant writes also maintain `units.tenant_id` in the same transaction: the
/// unit a tenant occupies points back at them, no other unit does, and no
/// other tenant keeps that unit.
#[derive(Clone)]
pub struct TenantRepository {
    db: DbConnection,
}

impl TenantRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Tenant> {
        Ok(Tenant {
            tenant_id: row.try_get("tenant_id")?,
            full_name: row.try_get("full_name")?,
            phone_number: row.try_get("phone_number")?,
            email: row.try_get("email")?,
            id_number: row.try_get("id_number")?,
            lease_start_date: row.try_get("lease_start_date")?,
            lease_end_date: row.try_get("lease_end_date")?,
            rent_amount: row.try_get("rent_amount")?,
            deposit_amount: row.try_get("deposit_amount")?,
            unit_id: row.try_get("unit_id")?,
            unit_number: row.try_get("unit_number")?,
            property_id: row.try_get("property_id")?,
            status: enum_column(row, "status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn form_params(form: &TenantForm) -> Vec<SqlParam> {
        vec![
            form.full_name.as_str().into(),
            form.phone_number.clone().into(),
            form.email.clone().into(),
            form.id_number.clone().into(),
            form.lease_start_date.as_str().into(),
            form.lease_end_date.clone().into(),
            form.rent_amount.into(),
            form.deposit_amount.into(),
            form.unit_id.into(),
            form.status.as_str().into(),
        ]
    }

    /// Tenants living in any unit of a property
    pub async fn list_for_property(&self, property_id: i64) -> Result<Vec<Tenant>> {
        let sql = format!("{} WHERE u.property_id = ? ORDER BY t.full_name", SELECT_TENANTS);
        let rows = self.db.query(&sql, &[property_id.into()]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    /// Point units at the tenant they house. A unit still naming this tenant
    /// is released unless it is the one the tenant now occupies, and any other
    /// tenant recorded against the occupied unit loses it.
    async fn sync_unit_link(
        tx: &mut Transaction<'static, Sqlite>,
        tenant_id: i64,
        occupied_unit: Option<i64>,
    ) -> Result<()> {
        let released = bind_params(
            sqlx::query(
                "UPDATE units SET tenant_id = NULL, unit_status = 'Vacant' WHERE tenant_id = ? AND unit_id IS NOT ?",
            ),
            &[tenant_id.into(), occupied_unit.into()],
        )
        .execute(&mut **tx)
        .await
        .context("Failed to release units of tenant")?;

        if let Some(unit_id) = occupied_unit {
            let displaced = bind_params(
                sqlx::query(
                    "UPDATE tenants SET unit_id = NULL, updated_at = datetime('now') \
                     WHERE unit_id = ? AND tenant_id != ?",
                ),
                &[unit_id.into(), tenant_id.into()],
            )
            .execute(&mut **tx)
            .await
            .context("Failed to move previous occupant out of unit")?;
            if displaced.rows_affected() > 0 {
                debug!(
                    "Unit {} handed to tenant {}, {} previous tenant(s) unlinked",
                    unit_id,
                    tenant_id,
                    displaced.rows_affected()
                );
            }

            bind_params(
                sqlx::query("UPDATE units SET tenant_id = ?, unit_status = 'Occupied' WHERE unit_id = ?"),
                &[tenant_id.into(), unit_id.into()],
            )
            .execute(&mut **tx)
            .await
            .context("Failed to link unit to tenant")?;
        }

        debug!(
            "Tenant {} unit link synced: occupied={:?}, released={}",
            tenant_id,
            occupied_unit,
            released.rows_affected()
        );
        Ok(())
    }

    fn occupied_unit(form: &TenantForm) -> Option<i64> {
        if form.status.occupies_unit() {
            form.unit_id
        } else {
            None
        }
    }
}

#[async_trait]
impl EntityStorage for TenantRepository {
    type Id = i64;
    type Record = Tenant;
    type Form = TenantForm;

    const ENTITY: &'static str = "tenants";
    const LABEL: &'static str = "Tenant";

    async fn list(&self) -> Result<Vec<Tenant>> {
        let sql = format!("{} ORDER BY t.full_name", SELECT_TENANTS);
        let rows = self.db.query(&sql, &[]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: &i64) -> Result<Option<Tenant>> {
        let sql = format!("{} WHERE t.tenant_id = ?", SELECT_TENANTS);
        let row = self.db.query_optional(&sql, &[(*id).into()]).await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, form: &TenantForm) -> Result<i64> {
        let mut tx = self.db.begin().await?;

        let result = bind_params(
            sqlx::query(
                r#"
                INSERT INTO tenants (full_name, phone_number, email, id_number, lease_start_date, lease_end_date,
                                     rent_amount, deposit_amount, unit_id, status)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            ),
            &Self::form_params(form),
        )
        .execute(&mut *tx)
        .await
        .context("Failed to insert tenant")?;
        let tenant_id = result.last_insert_rowid();

        Self::sync_unit_link(&mut tx, tenant_id, Self::occupied_unit(form)).await?;
        tx.commit().await?;

        Ok(tenant_id)
    }

    async fn update(&self, id: &i64, form: &TenantForm) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        let mut params = Self::form_params(form);
        params.push((*id).into());
        let result = bind_params(
            sqlx::query(
                r#"
                UPDATE tenants
                SET full_name = ?, phone_number = ?, email = ?, id_number = ?, lease_start_date = ?,
                    lease_end_date = ?, rent_amount = ?, deposit_amount = ?, unit_id = ?, status = ?,
                    updated_at = datetime('now')
                WHERE tenant_id = ?
                "#,
            ),
            &params,
        )
        .execute(&mut *tx)
        .await
        .context("Failed to update tenant")?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        Self::sync_unit_link(&mut tx, *id, Self::occupied_unit(form)).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn delete(&self, id: &i64) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        Self::sync_unit_link(&mut tx, *id, None).await?;
        let result = bind_params(sqlx::query("DELETE FROM tenants WHERE tenant_id = ?"), &[(*id).into()])
            .execute(&mut *tx)
            .await
            .context("Failed to delete tenant")?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn dependents(&self, id: &i64) -> Result<Vec<Dependent>> {
        count_dependents(
            &self.db,
            &[("payments", "tenant_id"), ("complaints", "tenant_id")],
            (*id).into(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::TestEnvironment;
    use shared::TenantStatus;

    fn form(name: &str, unit_id: Option<i64>, status: TenantStatus) -> TenantForm {
        TenantForm {
            tenant_id: None,
            full_name: name.to_string(),
            phone_number: Some("0722000000".to_string()),
            email: None,
            id_number: None,
            lease_start_date: "2025-01-15".to_string(),
            lease_end_date: None,
            rent_amount: 10000.0,
            deposit_amount: 10000.0,
            unit_id,
            status,
        }
    }

    async fn unit_tenant(env: &TestEnvironment, unit_id: i64) -> (Option<i64>, String) {
        let row = env
            .connection
            .query("SELECT tenant_id, unit_status FROM units WHERE unit_id = ?", &[unit_id.into()])
            .await
            .unwrap()
            .remove(0);
        (row.get("tenant_id"), row.get("unit_status"))
    }

    #[tokio::test]
    async fn test_insert_links_unit() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TenantRepository::new(env.connection.clone());

        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        let unit_id = env.add_unit(property_id, "A1", 10000.0).await;

        let tenant_id = repo.insert(&form("Tom", Some(unit_id), TenantStatus::Active)).await.unwrap();

        assert_eq!(unit_tenant(&env, unit_id).await, (Some(tenant_id), "Occupied".to_string()));
        let tenant = repo.get(&tenant_id).await.unwrap().unwrap();
        assert_eq!(tenant.unit_number.as_deref(), Some("A1"));
        assert_eq!(tenant.property_id, Some(property_id));
    }

    #[tokio::test]
    async fn test_moving_to_another_unit_releases_the_old_one() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TenantRepository::new(env.connection.clone());

        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        let first = env.add_unit(property_id, "A1", 10000.0).await;
        let second = env.add_unit(property_id, "A2", 12000.0).await;

        let tenant_id = repo.insert(&form("Tom", Some(first), TenantStatus::Active)).await.unwrap();
        assert!(repo
            .update(&tenant_id, &form("Tom", Some(second), TenantStatus::MovingOut))
            .await
            .unwrap());

        assert_eq!(unit_tenant(&env, first).await, (None, "Vacant".to_string()));
        assert_eq!(unit_tenant(&env, second).await, (Some(tenant_id), "Occupied".to_string()));
    }

    #[tokio::test]
    async fn test_new_tenant_takes_over_occupied_unit() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TenantRepository::new(env.connection.clone());

        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        let unit_id = env.add_unit(property_id, "A1", 1000.0).await;

        let alice = repo.insert(&form("Alice", Some(unit_id), TenantStatus::Active)).await.unwrap();
        let bob = repo.insert(&form("Bob", Some(unit_id), TenantStatus::Active)).await.unwrap();

        assert_eq!(unit_tenant(&env, unit_id).await, (Some(bob), "Occupied".to_string()));
        assert_eq!(repo.get(&alice).await.unwrap().unwrap().unit_id, None);
        assert_eq!(repo.get(&bob).await.unwrap().unwrap().unit_id, Some(unit_id));

        let housed = repo.list_for_property(property_id).await.unwrap();
        assert_eq!(housed.len(), 1);
        assert_eq!(housed[0].full_name, "Bob");
    }

    #[tokio::test]
    async fn test_inactive_tenant_releases_unit() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TenantRepository::new(env.connection.clone());

        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        let unit_id = env.add_unit(property_id, "A1", 10000.0).await;

        let tenant_id = repo.insert(&form("Tom", Some(unit_id), TenantStatus::Active)).await.unwrap();
        repo.update(&tenant_id, &form("Tom", Some(unit_id), TenantStatus::Inactive))
            .await
            .unwrap();

        assert_eq!(unit_tenant(&env, unit_id).await, (None, "Vacant".to_string()));
        assert_eq!(repo.get(&tenant_id).await.unwrap().unwrap().status, TenantStatus::Inactive);
    }

    #[tokio::test]
    async fn test_update_missing_tenant_touches_nothing() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TenantRepository::new(env.connection.clone());

        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        let unit_id = env.add_unit(property_id, "A1", 10000.0).await;

        let updated = repo.update(&404, &form("Ghost", Some(unit_id), TenantStatus::Active)).await.unwrap();
        assert!(!updated);
        assert_eq!(unit_tenant(&env, unit_id).await, (None, "Vacant".to_string()));
    }

    #[tokio::test]
    async fn test_delete_clears_unit_link() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TenantRepository::new(env.connection.clone());

        let manager_id = env.add_manager("Jane").await;
        let property_id = env.add_property(manager_id, "Sunrise").await;
        let unit_id = env.add_unit(property_id, "A1", 10000.0).await;
        let tenant_id = repo.insert(&form("Tom", Some(unit_id), TenantStatus::Active)).await.unwrap();

        assert!(repo.delete(&tenant_id).await.unwrap());
        assert_eq!(unit_tenant(&env, unit_id).await, (None, "Vacant".to_string()));
        assert!(!repo.delete(&tenant_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_for_property() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = TenantRepository::new(env.connection.clone());

        let manager_id = env.add_manager("Jane").await;
        let sunrise = env.add_property(manager_id, "Sunrise").await;
        let harbor = env.add_property(manager_id, "Harbor").await;
        let a1 = env.add_unit(sunrise, "A1", 100.0).await;
        let h1 = env.add_unit(harbor, "H1", 100.0).await;
        env.add_tenant("Tom", "2025-01-01", Some(a1)).await;
        env.add_tenant("Ann", "2025-01-01", Some(h1)).await;
        env.add_tenant("Nobody", "2025-01-01", None).await;

        let tenants = repo.list_for_property(sunrise).await.unwrap();
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].full_name, "Tom");
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }
}
