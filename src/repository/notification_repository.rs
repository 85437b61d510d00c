use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{NewNotification, Notification, NotificationType},
    error::{AppError, Result},
    repository::{parse_stored, parse_uuid, to_utc, NotificationRepository},
};

#[derive(FromRow)]
struct NotificationRow {
    id: String,
    user_id: String,
    title: String,
    content: String,
    notification_type: String,
    is_read: i32,
    created_at: NaiveDateTime,
}

/// Inserts a notification on an existing connection so callers can include
/// it in their own transaction.
pub(crate) async fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &NewNotification,
    now: NaiveDateTime,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, title, content, notification_type, is_read, created_at)
        VALUES (?, ?, ?, ?, ?, 0, ?)
        "#
    )
    .bind(id.to_string())
    .bind(notification.user_id.to_string())
    .bind(&notification.title)
    .bind(&notification.content)
    .bind(notification.notification_type.as_str())
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(id)
}

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_notification(row: NotificationRow) -> Result<Notification> {
        Ok(Notification {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            title: row.title,
            content: row.content,
            notification_type: parse_stored(
                &row.notification_type,
                NotificationType::from_str,
                "notification type",
            )?,
            read: row.is_read != 0,
            created_at: to_utc(row.created_at),
        })
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn create(&self, notification: NewNotification) -> Result<Notification> {
        let mut conn = self.pool.acquire().await?;
        let id = insert_notification(&mut conn, &notification, Utc::now().naive_utc()).await?;
        drop(conn);

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created notification".to_string())
        })
    }

    async fn create_many(&self, notifications: Vec<NewNotification>) -> Result<u64> {
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        for notification in &notifications {
            insert_notification(&mut tx, notification, now).await?;
        }

        tx.commit().await?;
        Ok(notifications.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, title, content, notification_type, is_read, created_at
            FROM notifications
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_notification).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid, unread_only: bool, limit: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, title, content, notification_type, is_read, created_at
            FROM notifications
            WHERE user_id = ? AND (? = 0 OR is_read = 0)
            ORDER BY created_at DESC
            LIMIT ?
            "#
        )
        .bind(user_id.to_string())
        .bind(if unread_only { 1i32 } else { 0i32 })
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_notification).collect()
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0"
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count.0)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
