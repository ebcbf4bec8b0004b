use anyhow::Result;
use async_trait::async_trait;
use shared::{Block, BlockForm};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::count_dependents;
use crate::storage::connection::DbConnection;
use crate::storage::traits::{Dependent, EntityStorage};

const SELECT_BLOCKS: &str = r#"
    SELECT b.block_id, b.block_name, b.property_id, p.name AS property_name, b.floor_count, b.notes
    FROM blocks b
    LEFT JOIN properties p ON b.property_id = p.property_id
"#;

/// Repository for the blocks (buildings, wings) of a property
#[derive(Clone)]
pub struct BlockRepository {
    db: DbConnection,
}

impl BlockRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Block> {
        Ok(Block {
            block_id: row.try_get("block_id")?,
            block_name: row.try_get("block_name")?,
            property_id: row.try_get("property_id")?,
            property_name: row.try_get("property_name")?,
            floor_count: row.try_get("floor_count")?,
            notes: row.try_get("notes")?,
        })
    }
}

#[async_trait]
impl EntityStorage for BlockRepository {
    type Id = i64;
    type Record = Block;
    type Form = BlockForm;

    const ENTITY: &'static str = "blocks";
    const LABEL: &'static str = "Block";

    async fn list(&self) -> Result<Vec<Block>> {
        let sql = format!("{} ORDER BY b.block_name", SELECT_BLOCKS);
        let rows = self.db.query(&sql, &[]).await?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: &i64) -> Result<Option<Block>> {
        let sql = format!("{} WHERE b.block_id = ?", SELECT_BLOCKS);
        let row = self.db.query_optional(&sql, &[(*id).into()]).await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, form: &BlockForm) -> Result<i64> {
        self.db
            .insert(
                "INSERT INTO blocks (block_name, property_id, floor_count, notes) VALUES (?, ?, ?, ?)",
                &[
                    form.block_name.as_str().into(),
                    form.property_id.into(),
                    form.floor_count.into(),
                    form.notes.clone().into(),
                ],
            )
            .await
    }

    async fn update(&self, id: &i64, form: &BlockForm) -> Result<bool> {
        let affected = self
            .db
            .execute(
                "UPDATE blocks SET block_name = ?, property_id = ?, floor_count = ?, notes = ? WHERE block_id = ?",
                &[
                    form.block_name.as_str().into(),
                    form.property_id.into(),
                    form.floor_count.into(),
                    form.notes.clone().into(),
                    (*id).into(),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &i64) -> Result<bool> {
        let affected = self
            .db
            .execute("DELETE FROM blocks WHERE block_id = ?", &[(*id).into()])
            .await?;
        Ok(affected > 0)
    }

    async fn dependents(&self, id: &i64) -> Result<Vec<Dependent>> {
        count_dependents(&self.db, &[("units", "block_id"), ("expenses", "block_id")], (*id).into()).await
    }
}
