use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Message, NewNotification},
    error::{AppError, Result},
    repository::{notification_repository::insert_notification, parse_uuid, to_utc, MessageRepository},
};

#[derive(FromRow)]
struct MessageRow {
    id: String,
    sender_id: String,
    receiver_id: String,
    content: String,
    is_read: i32,
    created_at: NaiveDateTime,
}

pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_message(row: MessageRow) -> Result<Message> {
        Ok(Message {
            id: parse_uuid(&row.id)?,
            sender_id: parse_uuid(&row.sender_id)?,
            receiver_id: parse_uuid(&row.receiver_id)?,
            content: row.content,
            read: row.is_read != 0,
            created_at: to_utc(row.created_at),
        })
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn create(&self, sender_id: Uuid, receiver_id: Uuid, content: &str, notification: NewNotification) -> Result<Message> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, receiver_id, content, is_read, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#
        )
        .bind(id.to_string())
        .bind(sender_id.to_string())
        .bind(receiver_id.to_string())
        .bind(content)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_notification(&mut tx, &notification, now).await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve sent message".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, sender_id, receiver_id, content, is_read, created_at FROM messages WHERE id = ?"
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_message).transpose()
    }

    async fn conversation(&self, user_id: Uuid, other_id: Uuid) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, is_read, created_at
            FROM messages
            WHERE (sender_id = ?1 AND receiver_id = ?2)
               OR (sender_id = ?2 AND receiver_id = ?1)
            ORDER BY created_at ASC
            "#
        )
        .bind(user_id.to_string())
        .bind(other_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_message).collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, is_read, created_at
            FROM messages
            WHERE sender_id = ?1 OR receiver_id = ?1
            ORDER BY created_at DESC
            "#
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_message).collect()
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = ? AND is_read = 0"
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count.0)
    }

    async fn mark_read(&self, id: Uuid, receiver_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE messages SET is_read = 1 WHERE id = ? AND receiver_id = ?")
            .bind(id.to_string())
            .bind(receiver_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_conversation_read(&self, receiver_id: Uuid, sender_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1 WHERE receiver_id = ? AND sender_id = ? AND is_read = 0"
        )
        .bind(receiver_id.to_string())
        .bind(sender_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
