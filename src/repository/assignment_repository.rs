use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Assignment, AssignmentStatus, RoomStatus},
    error::{AppError, Result},
    repository::{parse_stored, parse_uuid, to_utc, AssignmentRepository},
};

const ASSIGNMENT_COLUMNS: &str = "id, room_id, student_id, application_id, check_in_date, \
     check_out_date, status, created_at, updated_at";

#[derive(FromRow)]
struct AssignmentRow {
    id: String,
    room_id: String,
    student_id: String,
    application_id: String,
    check_in_date: NaiveDate,
    check_out_date: Option<NaiveDate>,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteAssignmentRepository {
    pool: SqlitePool,
}

impl SqliteAssignmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_assignment(row: AssignmentRow) -> Result<Assignment> {
        Ok(Assignment {
            id: parse_uuid(&row.id)?,
            room_id: parse_uuid(&row.room_id)?,
            student_id: parse_uuid(&row.student_id)?,
            application_id: parse_uuid(&row.application_id)?,
            check_in_date: row.check_in_date,
            check_out_date: row.check_out_date,
            status: parse_stored(&row.status, AssignmentStatus::from_str, "assignment status")?,
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }

    async fn fetch_where(&self, clause: &str, value: String) -> Result<Vec<Assignment>> {
        let sql = format!(
            "SELECT {} FROM room_assignments WHERE {} ORDER BY created_at DESC",
            ASSIGNMENT_COLUMNS, clause
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_assignment).collect()
    }
}

#[async_trait]
impl AssignmentRepository for SqliteAssignmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>> {
        Ok(self.fetch_where("id = ?", id.to_string()).await?.into_iter().next())
    }

    async fn find_by_application(&self, application_id: Uuid) -> Result<Option<Assignment>> {
        Ok(self
            .fetch_where("application_id = ?", application_id.to_string())
            .await?
            .into_iter()
            .next())
    }

    async fn list(&self, status: Option<AssignmentStatus>) -> Result<Vec<Assignment>> {
        if let Some(status) = status {
            return self.fetch_where("status = ?", status.as_str().to_string()).await;
        }

        let sql = format!(
            "SELECT {} FROM room_assignments ORDER BY created_at DESC",
            ASSIGNMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_assignment).collect()
    }

    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Assignment>> {
        self.fetch_where("student_id = ?", student_id.to_string()).await
    }

    async fn find_active_by_student(&self, student_id: Uuid) -> Result<Option<Assignment>> {
        Ok(self
            .fetch_where("status = 'active' AND student_id = ?", student_id.to_string())
            .await?
            .into_iter()
            .next())
    }

    async fn list_active_by_room(&self, room_id: Uuid) -> Result<Vec<Assignment>> {
        self.fetch_where("status = 'active' AND room_id = ?", room_id.to_string()).await
    }

    async fn check_out(&self, id: Uuid, check_out_date: NaiveDate) -> Result<Assignment> {
        let assignment = self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;

        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        let completed = sqlx::query(
            r#"
            UPDATE room_assignments
            SET status = ?, check_out_date = ?, updated_at = ?
            WHERE id = ? AND status = 'active'
            "#
        )
        .bind(AssignmentStatus::Completed.as_str())
        .bind(check_out_date)
        .bind(now)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if completed.rows_affected() == 0 {
            return Err(AppError::Conflict("Assignment is not active".to_string()));
        }

        // Keep the room occupied while anyone else is still checked in.
        sqlx::query(
            r#"
            UPDATE rooms
            SET status = ?, updated_at = ?
            WHERE id = ? AND status = 'occupied'
              AND NOT EXISTS (
                  SELECT 1 FROM room_assignments
                  WHERE room_id = rooms.id AND status = 'active'
              )
            "#
        )
        .bind(RoomStatus::Available.as_str())
        .bind(now)
        .bind(assignment.room_id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated assignment".to_string())
        })
    }
}
