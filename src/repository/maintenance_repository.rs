use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        MaintenanceCategory, MaintenanceFilter, MaintenancePriority, MaintenanceRequest,
        MaintenanceStatus, NewMaintenanceRequest,
    },
    error::{AppError, Result},
    repository::{map_delete_error, parse_stored, parse_uuid, to_utc, MaintenanceRepository},
};

const MAINTENANCE_COLUMNS: &str = "id, student_id, room_id, title, category, description, \
     priority, status, resolution_notes, resolved_at, created_at, updated_at";

#[derive(FromRow)]
struct MaintenanceRow {
    id: String,
    student_id: String,
    room_id: String,
    title: String,
    category: String,
    description: String,
    priority: String,
    status: String,
    resolution_notes: Option<String>,
    resolved_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteMaintenanceRepository {
    pool: SqlitePool,
}

impl SqliteMaintenanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_request(row: MaintenanceRow) -> Result<MaintenanceRequest> {
        Ok(MaintenanceRequest {
            id: parse_uuid(&row.id)?,
            student_id: parse_uuid(&row.student_id)?,
            room_id: parse_uuid(&row.room_id)?,
            title: row.title,
            category: parse_stored(&row.category, MaintenanceCategory::from_str, "maintenance category")?,
            description: row.description,
            priority: parse_stored(&row.priority, MaintenancePriority::from_str, "maintenance priority")?,
            status: parse_stored(&row.status, MaintenanceStatus::from_str, "maintenance status")?,
            resolution_notes: row.resolution_notes,
            resolved_at: row.resolved_at.map(to_utc),
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }
}

#[async_trait]
impl MaintenanceRepository for SqliteMaintenanceRepository {
    async fn create(&self, request: NewMaintenanceRequest) -> Result<MaintenanceRequest> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO maintenance_requests (
                id, student_id, room_id, title, category, description,
                priority, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(request.student_id.to_string())
        .bind(request.room_id.to_string())
        .bind(&request.title)
        .bind(request.category.as_str())
        .bind(&request.description)
        .bind(request.priority.as_str())
        .bind(MaintenanceStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created maintenance request".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MaintenanceRequest>> {
        let sql = format!("SELECT {} FROM maintenance_requests WHERE id = ?", MAINTENANCE_COLUMNS);
        let row = sqlx::query_as::<_, MaintenanceRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_request).transpose()
    }

    async fn list(&self, filter: MaintenanceFilter) -> Result<Vec<MaintenanceRequest>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM maintenance_requests WHERE 1 = 1",
            MAINTENANCE_COLUMNS
        ));

        if let Some(student_id) = filter.student_id {
            query.push(" AND student_id = ").push_bind(student_id.to_string());
        }
        if let Some(room_id) = filter.room_id {
            query.push(" AND room_id = ").push_bind(room_id.to_string());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(priority) = filter.priority {
            query.push(" AND priority = ").push_bind(priority.as_str());
        }
        if let Some(from) = filter.created_from {
            query.push(" AND DATE(created_at) >= ").push_bind(from);
        }
        if let Some(to) = filter.created_to {
            query.push(" AND DATE(created_at) <= ").push_bind(to);
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<MaintenanceRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_request).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: MaintenanceStatus,
        resolution_notes: Option<String>,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<MaintenanceRequest> {
        let result = sqlx::query(
            r#"
            UPDATE maintenance_requests
            SET status = ?,
                resolution_notes = COALESCE(?, resolution_notes),
                resolved_at = ?,
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(status.as_str())
        .bind(&resolution_notes)
        .bind(resolved_at.map(|dt| dt.naive_utc()))
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Maintenance request not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated maintenance request".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM maintenance_requests WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Maintenance request"))?;

        Ok(())
    }
}
