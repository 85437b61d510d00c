use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateRoomRequest, GenderDesignation, Room, RoomFilter, RoomStatus, RoomType, UpdateRoomRequest},
    error::{AppError, Result},
    repository::{map_delete_error, parse_stored, parse_uuid, to_utc, RoomRepository},
};

const ROOM_COLUMNS: &str = "id, block_id, room_number, floor, capacity, room_type, gender, \
     status, amenities, created_at, updated_at";

#[derive(FromRow)]
struct RoomRow {
    id: String,
    block_id: String,
    room_number: String,
    floor: i32,
    capacity: i32,
    room_type: String,
    gender: String,
    status: String,
    amenities: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteRoomRepository {
    pool: SqlitePool,
}

impl SqliteRoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_room(row: RoomRow) -> Result<Room> {
        let amenities: Vec<String> = serde_json::from_str(&row.amenities)
            .map_err(|e| AppError::Database(format!("Invalid amenities list: {}", e)))?;

        Ok(Room {
            id: parse_uuid(&row.id)?,
            block_id: parse_uuid(&row.block_id)?,
            room_number: row.room_number,
            floor: row.floor,
            capacity: row.capacity,
            room_type: parse_stored(&row.room_type, RoomType::from_str, "room type")?,
            gender: parse_stored(&row.gender, GenderDesignation::from_str, "room gender")?,
            status: parse_stored(&row.status, RoomStatus::from_str, "room status")?,
            amenities,
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }

    fn amenities_json(amenities: &[String]) -> Result<String> {
        serde_json::to_string(amenities).map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[async_trait]
impl RoomRepository for SqliteRoomRepository {
    async fn create(&self, room: CreateRoomRequest) -> Result<Room> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let amenities = Self::amenities_json(&room.amenities)?;

        sqlx::query(
            r#"
            INSERT INTO rooms (
                id, block_id, room_number, floor, capacity, room_type, gender,
                status, amenities, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(room.block_id.to_string())
        .bind(room.room_number.trim())
        .bind(room.floor)
        .bind(room.capacity)
        .bind(room.room_type.as_str())
        .bind(room.gender.as_str())
        .bind(RoomStatus::Available.as_str())
        .bind(amenities)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created room".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Room>> {
        let sql = format!("SELECT {} FROM rooms WHERE id = ?", ROOM_COLUMNS);
        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_room).transpose()
    }

    async fn find_by_number(&self, block_id: Uuid, room_number: &str) -> Result<Option<Room>> {
        let sql = format!(
            "SELECT {} FROM rooms WHERE block_id = ? AND room_number = ?",
            ROOM_COLUMNS
        );
        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(block_id.to_string())
            .bind(room_number.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_room).transpose()
    }

    async fn list(&self, filter: RoomFilter) -> Result<Vec<Room>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM rooms WHERE 1 = 1", ROOM_COLUMNS));

        if let Some(block_id) = filter.block_id {
            query.push(" AND block_id = ").push_bind(block_id.to_string());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(gender) = filter.gender {
            query.push(" AND gender = ").push_bind(gender.as_str());
        }
        if let Some(room_type) = filter.room_type {
            query.push(" AND room_type = ").push_bind(room_type.as_str());
        }
        query.push(" ORDER BY block_id, floor, room_number");

        let rows = query
            .build_query_as::<RoomRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_room).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateRoomRequest) -> Result<Room> {
        self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        let amenities = update
            .amenities
            .as_deref()
            .map(Self::amenities_json)
            .transpose()?;

        sqlx::query(
            r#"
            UPDATE rooms
            SET room_number = COALESCE(?, room_number),
                floor = COALESCE(?, floor),
                capacity = COALESCE(?, capacity),
                room_type = COALESCE(?, room_type),
                gender = COALESCE(?, gender),
                status = COALESCE(?, status),
                amenities = COALESCE(?, amenities),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(update.room_number.as_deref().map(str::trim))
        .bind(update.floor)
        .bind(update.capacity)
        .bind(update.room_type.map(|t| t.as_str()))
        .bind(update.gender.map(|g| g.as_str()))
        .bind(update.status.map(|s| s.as_str()))
        .bind(amenities)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated room".to_string())
        })
    }

    async fn set_status(&self, id: Uuid, status: RoomStatus) -> Result<Room> {
        let result = sqlx::query("UPDATE rooms SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Room not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated room".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Room"))?;

        Ok(())
    }
}
