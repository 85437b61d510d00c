use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Block, CreateBlockRequest, GenderDesignation, UpdateBlockRequest},
    error::{AppError, Result},
    repository::{map_delete_error, parse_stored, parse_uuid, to_utc, BlockRepository},
};

// Room totals are computed from the rooms table rather than stored.
const BLOCK_SELECT: &str = r#"
    SELECT b.id, b.name, b.gender, b.description,
           (SELECT COUNT(*) FROM rooms r WHERE r.block_id = b.id) AS total_rooms,
           (SELECT COUNT(*) FROM rooms r WHERE r.block_id = b.id AND r.status = 'available') AS available_rooms,
           b.created_at, b.updated_at
    FROM blocks b
"#;

#[derive(FromRow)]
struct BlockRow {
    id: String,
    name: String,
    gender: String,
    description: Option<String>,
    total_rooms: i64,
    available_rooms: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteBlockRepository {
    pool: SqlitePool,
}

impl SqliteBlockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_block(row: BlockRow) -> Result<Block> {
        Ok(Block {
            id: parse_uuid(&row.id)?,
            name: row.name,
            gender: parse_stored(&row.gender, GenderDesignation::from_str, "block gender")?,
            description: row.description,
            total_rooms: row.total_rooms,
            available_rooms: row.available_rooms,
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }
}

#[async_trait]
impl BlockRepository for SqliteBlockRepository {
    async fn create(&self, block: CreateBlockRequest) -> Result<Block> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO blocks (id, name, gender, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(block.name.trim())
        .bind(block.gender.as_str())
        .bind(&block.description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created block".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Block>> {
        let sql = format!("{} WHERE b.id = ?", BLOCK_SELECT);
        let row = sqlx::query_as::<_, BlockRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_block).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Block>> {
        let sql = format!("{} WHERE LOWER(b.name) = LOWER(?)", BLOCK_SELECT);
        let row = sqlx::query_as::<_, BlockRow>(&sql)
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_block).transpose()
    }

    async fn list(&self) -> Result<Vec<Block>> {
        let sql = format!("{} ORDER BY b.name", BLOCK_SELECT);
        let rows = sqlx::query_as::<_, BlockRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_block).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateBlockRequest) -> Result<Block> {
        self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Block not found".to_string()))?;

        sqlx::query(
            r#"
            UPDATE blocks
            SET name = COALESCE(?, name),
                gender = COALESCE(?, gender),
                description = COALESCE(?, description),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.gender.map(|g| g.as_str()))
        .bind(&update.description)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated block".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM blocks WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Block"))?;

        Ok(())
    }
}
