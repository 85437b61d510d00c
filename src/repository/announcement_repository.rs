use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow, QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::{
    domain::{
        Announcement, AnnouncementFilter, AnnouncementPriority, AnnouncementStatus,
        AnnouncementType, NewNotification, TargetAudience,
    },
    error::{AppError, Result},
    repository::{
        map_delete_error, notification_repository::insert_notification, parse_stored, parse_uuid, to_utc,
        AnnouncementRepository,
    },
};

const ANNOUNCEMENT_COLUMNS: &str = "id, title, content, announcement_type, priority, target_audience, \
     status, published_at, expires_at, created_by, created_at, updated_at";

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    content: String,
    announcement_type: String,
    priority: String,
    target_audience: String,
    status: String,
    published_at: Option<NaiveDateTime>,
    expires_at: Option<NaiveDateTime>,
    created_by: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: parse_uuid(&row.id)?,
            title: row.title,
            content: row.content,
            announcement_type: parse_stored(&row.announcement_type, AnnouncementType::from_str, "announcement type")?,
            priority: parse_stored(&row.priority, AnnouncementPriority::from_str, "announcement priority")?,
            target_audience: parse_stored(&row.target_audience, TargetAudience::from_str, "target audience")?,
            status: parse_stored(&row.status, AnnouncementStatus::from_str, "announcement status")?,
            published_at: row.published_at.map(to_utc),
            expires_at: row.expires_at.map(to_utc),
            created_by: parse_uuid(&row.created_by)?,
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, announcement: Announcement) -> Result<Announcement> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO announcements (
                id, title, content, announcement_type, priority, priority_rank,
                target_audience, status, published_at, expires_at, created_by,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(announcement.id.to_string())
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.announcement_type.as_str())
        .bind(announcement.priority.as_str())
        .bind(announcement.priority.rank())
        .bind(announcement.target_audience.as_str())
        .bind(announcement.status.as_str())
        .bind(announcement.published_at.map(|dt| dt.naive_utc()))
        .bind(announcement.expires_at.map(|dt| dt.naive_utc()))
        .bind(announcement.created_by.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(announcement.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>> {
        let sql = format!("SELECT {} FROM announcements WHERE id = ?", ANNOUNCEMENT_COLUMNS);
        let row = sqlx::query_as::<_, AnnouncementRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_announcement(r)?)),
            None => Ok(None)
        }
    }

    async fn list(&self, filter: AnnouncementFilter) -> Result<Vec<Announcement>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM announcements WHERE 1 = 1",
            ANNOUNCEMENT_COLUMNS
        ));

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(priority) = filter.priority {
            query.push(" AND priority = ").push_bind(priority.as_str());
        }
        if let Some(audience) = filter.target_audience {
            query.push(" AND target_audience = ").push_bind(audience.as_str());
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<AnnouncementRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_announcement)
            .collect()
    }

    async fn list_visible(&self, audiences: &[TargetAudience], now: DateTime<Utc>) -> Result<Vec<Announcement>> {
        if audiences.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM announcements WHERE status = 'published' AND (expires_at IS NULL OR expires_at > ",
            ANNOUNCEMENT_COLUMNS
        ));
        query.push_bind(now.naive_utc());
        query.push(") AND target_audience IN (");
        let mut separated = query.separated(", ");
        for audience in audiences {
            separated.push_bind(audience.as_str());
        }
        separated.push_unseparated(") ORDER BY priority_rank DESC, published_at DESC");

        let rows = query
            .build_query_as::<AnnouncementRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_announcement)
            .collect()
    }

    async fn update(&self, id: Uuid, announcement: Announcement) -> Result<Announcement> {
        sqlx::query(
            r#"
            UPDATE announcements
            SET title = ?, content = ?, announcement_type = ?,
                priority = ?, priority_rank = ?, target_audience = ?,
                expires_at = ?, updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.announcement_type.as_str())
        .bind(announcement.priority.as_str())
        .bind(announcement.priority.rank())
        .bind(announcement.target_audience.as_str())
        .bind(announcement.expires_at.map(|dt| dt.naive_utc()))
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated announcement".to_string())
        })
    }

    async fn publish(&self, id: Uuid, published_at: DateTime<Utc>, notifications: Vec<NewNotification>) -> Result<Announcement> {
        let now = published_at.naive_utc();
        let mut tx = self.pool.begin().await?;

        let published = sqlx::query(
            r#"
            UPDATE announcements
            SET status = ?, published_at = ?, updated_at = ?
            WHERE id = ? AND status != 'published'
            "#
        )
        .bind(AnnouncementStatus::Published.as_str())
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if published.rows_affected() == 0 {
            return Err(AppError::Conflict("Announcement is already published".to_string()));
        }

        for notification in &notifications {
            insert_notification(&mut tx, notification, now).await?;
        }

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve published announcement".to_string())
        })
    }

    async fn set_status(&self, id: Uuid, status: AnnouncementStatus) -> Result<Announcement> {
        let result = sqlx::query("UPDATE announcements SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated announcement".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Announcement"))?;

        Ok(())
    }
}
