use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Gender, NewUser, UpdateProfileRequest, User, UserFilter, UserRole},
    error::{AppError, Result},
    repository::{parse_stored, parse_uuid, to_utc, UserRepository},
};

const USER_COLUMNS: &str = "id, email, full_name, role, gender, student_number, phone, \
     faculty, program, year_of_study, is_active, created_at, updated_at";

// Database row struct that matches the users table
#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    full_name: String,
    role: String,
    gender: Option<String>,
    student_number: Option<String>,
    phone: Option<String>,
    faculty: Option<String>,
    program: Option<String>,
    year_of_study: Option<i32>,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            email: row.email,
            full_name: row.full_name,
            role: parse_stored(&row.role, UserRole::from_str, "user role")?,
            gender: row
                .gender
                .as_deref()
                .map(|g| parse_stored(g, Gender::from_str, "gender"))
                .transpose()?,
            student_number: row.student_number,
            phone: row.phone,
            faculty: row.faculty,
            program: row.program,
            year_of_study: row.year_of_study,
            is_active: row.is_active != 0,
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }

    async fn fetch_one_where(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, full_name, role, gender,
                student_number, phone, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(user.email.trim().to_lowercase())
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.gender.map(|g| g.as_str()))
        .bind(&user.student_number)
        .bind(&user.phone)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created user".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.fetch_one_where("id", &id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_one_where("email", &email.trim().to_lowercase()).await
    }

    async fn find_by_student_number(&self, student_number: &str) -> Result<Option<User>> {
        self.fetch_one_where("student_number", student_number).await
    }

    async fn list(&self, filter: UserFilter, limit: i64, offset: i64) -> Result<Vec<User>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE 1 = 1", USER_COLUMNS));

        if let Some(role) = filter.role {
            query.push(" AND role = ").push_bind(role.as_str());
        }
        if !filter.include_inactive {
            query.push(" AND is_active = 1");
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query
                .push(" AND (LOWER(full_name) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(email) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(COALESCE(student_number, '')) LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = query
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn list_active_by_roles(&self, roles: &[UserRole]) -> Result<Vec<User>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM users WHERE is_active = 1 AND role IN (",
            USER_COLUMNS
        ));
        let mut separated = query.separated(", ");
        for role in roles {
            separated.push_bind(role.as_str());
        }
        separated.push_unseparated(") ORDER BY created_at");

        let rows = query
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn count_by_role(&self, role: UserRole) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE role = ? AND is_active = 1"
        )
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count.0)
    }

    async fn update_profile(&self, id: Uuid, update: UpdateProfileRequest) -> Result<User> {
        self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE users
            SET full_name = COALESCE(?, full_name),
                gender = COALESCE(?, gender),
                phone = COALESCE(?, phone),
                faculty = COALESCE(?, faculty),
                program = COALESCE(?, program),
                year_of_study = COALESCE(?, year_of_study),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&update.full_name)
        .bind(update.gender.map(|g| g.as_str()))
        .bind(&update.phone)
        .bind(&update.faculty)
        .bind(&update.program)
        .bind(update.year_of_study)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<User> {
        let result = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(if active { 1i32 } else { 0i32 })
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        if !active {
            sqlx::query("DELETE FROM sessions WHERE user_id = ?")
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
