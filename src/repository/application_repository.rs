use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        Application, ApplicationCounts, ApplicationFilter, ApplicationStatus, Assignment,
        AssignmentStatus, NewApplication, RoomStatus, RoomType, UpdateApplicationRequest,
    },
    error::{AppError, Result},
    repository::{
        map_delete_error, notification_repository::insert_notification, parse_stored, parse_uuid, to_utc,
        ApplicationRepository, ApprovalRecord, AssignmentRepository, DenialRecord,
        SqliteAssignmentRepository,
    },
};

const APPLICATION_COLUMNS: &str = "id, student_id, preferred_block_id, room_type, special_requirements, \
     emergency_contact_name, emergency_contact_phone, emergency_contact_relationship, \
     academic_year, semester, status, admin_notes, reviewed_by, reviewed_at, created_at, updated_at";

#[derive(FromRow)]
struct ApplicationRow {
    id: String,
    student_id: String,
    preferred_block_id: Option<String>,
    room_type: String,
    special_requirements: Option<String>,
    emergency_contact_name: Option<String>,
    emergency_contact_phone: Option<String>,
    emergency_contact_relationship: Option<String>,
    academic_year: Option<String>,
    semester: Option<String>,
    status: String,
    admin_notes: Option<String>,
    reviewed_by: Option<String>,
    reviewed_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteApplicationRepository {
    pool: SqlitePool,
}

impl SqliteApplicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_application(row: ApplicationRow) -> Result<Application> {
        Ok(Application {
            id: parse_uuid(&row.id)?,
            student_id: parse_uuid(&row.student_id)?,
            preferred_block_id: row.preferred_block_id.as_deref().map(parse_uuid).transpose()?,
            room_type: parse_stored(&row.room_type, RoomType::from_str, "room type")?,
            special_requirements: row.special_requirements,
            emergency_contact_name: row.emergency_contact_name,
            emergency_contact_phone: row.emergency_contact_phone,
            emergency_contact_relationship: row.emergency_contact_relationship,
            academic_year: row.academic_year,
            semester: row.semester,
            status: parse_stored(&row.status, ApplicationStatus::from_str, "application status")?,
            admin_notes: row.admin_notes,
            reviewed_by: row.reviewed_by.as_deref().map(parse_uuid).transpose()?,
            reviewed_at: row.reviewed_at.map(to_utc),
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }
}

#[async_trait]
impl ApplicationRepository for SqliteApplicationRepository {
    async fn create(&self, application: NewApplication) -> Result<Application> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let request = application.request;

        sqlx::query(
            r#"
            INSERT INTO applications (
                id, student_id, preferred_block_id, room_type, special_requirements,
                emergency_contact_name, emergency_contact_phone, emergency_contact_relationship,
                academic_year, semester, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(application.student_id.to_string())
        .bind(request.preferred_block_id.map(|b| b.to_string()))
        .bind(request.room_type.as_str())
        .bind(&request.special_requirements)
        .bind(&request.emergency_contact_name)
        .bind(&request.emergency_contact_phone)
        .bind(&request.emergency_contact_relationship)
        .bind(&request.academic_year)
        .bind(&request.semester)
        .bind(ApplicationStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created application".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let sql = format!("SELECT {} FROM applications WHERE id = ?", APPLICATION_COLUMNS);
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_application).transpose()
    }

    async fn list(&self, filter: ApplicationFilter) -> Result<Vec<Application>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM applications WHERE 1 = 1",
            APPLICATION_COLUMNS
        ));

        if let Some(student_id) = filter.student_id {
            query.push(" AND student_id = ").push_bind(student_id.to_string());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(block_id) = filter.block_id {
            query.push(" AND preferred_block_id = ").push_bind(block_id.to_string());
        }
        if let Some(from) = filter.created_from {
            query.push(" AND DATE(created_at) >= ").push_bind(from);
        }
        if let Some(to) = filter.created_to {
            query.push(" AND DATE(created_at) <= ").push_bind(to);
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<ApplicationRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_application).collect()
    }

    async fn count_by_status(&self) -> Result<ApplicationCounts> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM applications GROUP BY status"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let mut counts = ApplicationCounts::default();
        for (status, count) in rows {
            match ApplicationStatus::from_str(&status) {
                Some(ApplicationStatus::Pending) => counts.pending = count,
                Some(ApplicationStatus::Approved) => counts.approved = count,
                Some(ApplicationStatus::Denied) => counts.denied = count,
                None => tracing::warn!("Ignoring unknown application status {}", status),
            }
        }

        Ok(counts)
    }

    async fn update_details(&self, id: Uuid, update: UpdateApplicationRequest) -> Result<Application> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET preferred_block_id = COALESCE(?, preferred_block_id),
                room_type = COALESCE(?, room_type),
                special_requirements = COALESCE(?, special_requirements),
                emergency_contact_name = COALESCE(?, emergency_contact_name),
                emergency_contact_phone = COALESCE(?, emergency_contact_phone),
                emergency_contact_relationship = COALESCE(?, emergency_contact_relationship),
                updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#
        )
        .bind(update.preferred_block_id.map(|b| b.to_string()))
        .bind(update.room_type.map(|t| t.as_str()))
        .bind(&update.special_requirements)
        .bind(&update.emergency_contact_name)
        .bind(&update.emergency_contact_phone)
        .bind(&update.emergency_contact_relationship)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Only pending applications can be changed".to_string(),
            ));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated application".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM applications WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Application"))?;

        Ok(())
    }

    async fn approve(&self, record: ApprovalRecord) -> Result<(Application, Assignment)> {
        let now = Utc::now().naive_utc();
        let assignment_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let reviewed = sqlx::query(
            r#"
            UPDATE applications
            SET status = ?, admin_notes = ?, reviewed_by = ?, reviewed_at = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#
        )
        .bind(ApplicationStatus::Approved.as_str())
        .bind(&record.notes)
        .bind(record.reviewer_id.to_string())
        .bind(now)
        .bind(now)
        .bind(record.application_id.to_string())
        .execute(&mut *tx)
        .await?;

        if reviewed.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Application has already been reviewed".to_string(),
            ));
        }

        let (active,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM room_assignments WHERE student_id = ? AND status = 'active'"
        )
        .bind(record.student_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        if active > 0 {
            return Err(AppError::Conflict(
                "Student already has an active room assignment".to_string(),
            ));
        }

        let mut occupy: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE rooms SET status = ");
        occupy
            .push_bind(RoomStatus::Occupied.as_str())
            .push(", updated_at = ")
            .push_bind(now)
            .push(" WHERE id = ")
            .push_bind(record.room_id.to_string())
            .push(" AND status = 'available' AND gender IN (");
        let mut genders = occupy.separated(", ");
        for gender in &record.room_genders {
            genders.push_bind(gender.as_str());
        }
        genders.push_unseparated(")");

        let occupied = occupy.build().execute(&mut *tx).await?;

        if occupied.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Room is no longer available for this student".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO room_assignments (
                id, room_id, student_id, application_id, check_in_date, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(assignment_id.to_string())
        .bind(record.room_id.to_string())
        .bind(record.student_id.to_string())
        .bind(record.application_id.to_string())
        .bind(record.check_in_date)
        .bind(AssignmentStatus::Active.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_notification(&mut tx, &record.notification, now).await?;

        tx.commit().await?;

        let application = self.find_by_id(record.application_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve approved application".to_string())
        })?;
        let assignment = SqliteAssignmentRepository::new(self.pool.clone())
            .find_by_id(assignment_id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created assignment".to_string()))?;

        Ok((application, assignment))
    }

    async fn deny(&self, record: DenialRecord) -> Result<Application> {
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        let reviewed = sqlx::query(
            r#"
            UPDATE applications
            SET status = ?, admin_notes = ?, reviewed_by = ?, reviewed_at = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#
        )
        .bind(ApplicationStatus::Denied.as_str())
        .bind(&record.reason)
        .bind(record.reviewer_id.to_string())
        .bind(now)
        .bind(now)
        .bind(record.application_id.to_string())
        .execute(&mut *tx)
        .await?;

        if reviewed.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Application has already been reviewed".to_string(),
            ));
        }

        insert_notification(&mut tx, &record.notification, now).await?;

        tx.commit().await?;

        self.find_by_id(record.application_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve denied application".to_string())
        })
    }
}
