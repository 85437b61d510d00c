use std::sync::Arc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{self, AuthService},
    domain::*,
    error::{AppError, Result},
    repository::{
        ApplicationRepository, AssignmentRepository, MaintenanceRepository, UserRepository,
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Everything an administrator sees on a student's page.
#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    #[serde(flatten)]
    pub student: User,
    pub applications: Vec<Application>,
    pub current_assignment: Option<Assignment>,
    pub maintenance_requests: Vec<MaintenanceRequest>,
}

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    application_repo: Arc<dyn ApplicationRepository>,
    assignment_repo: Arc<dyn AssignmentRepository>,
    maintenance_repo: Arc<dyn MaintenanceRepository>,
    db_pool: SqlitePool,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        application_repo: Arc<dyn ApplicationRepository>,
        assignment_repo: Arc<dyn AssignmentRepository>,
        maintenance_repo: Arc<dyn MaintenanceRepository>,
        db_pool: SqlitePool,
    ) -> Self {
        Self {
            user_repo,
            application_repo,
            assignment_repo,
            maintenance_repo,
            db_pool,
        }
    }

    /// Self-service sign-up. Only students can register this way.
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        request.validate()?;

        if self.user_repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        if let Some(number) = &request.student_number {
            if self.user_repo.find_by_student_number(number).await?.is_some() {
                return Err(AppError::Conflict("Student number already registered".to_string()));
            }
        }

        let password_hash = AuthService::hash_password(&request.password).await?;

        let user = self
            .user_repo
            .create(NewUser {
                email: request.email,
                password_hash,
                full_name: request.full_name.trim().to_string(),
                role: UserRole::Student,
                gender: request.gender,
                student_number: request.student_number,
                phone: request.phone,
            })
            .await?;

        tracing::info!("Registered student {}", user.id);
        Ok(user)
    }

    pub async fn create_admin(&self, email: &str, password: &str, full_name: &str) -> Result<User> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = AuthService::hash_password(password).await?;

        self.user_repo
            .create(NewUser {
                email: email.to_string(),
                password_hash,
                full_name: full_name.to_string(),
                role: UserRole::Admin,
                gender: None,
                student_number: None,
                phone: None,
            })
            .await
    }

    /// Checks credentials for an active account. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let password_hash = auth::get_password_hash(&self.db_pool, email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !AuthService::verify_password(password, &password_hash).await? {
            tracing::warn!("Failed login attempt for {}", email);
            return Err(AppError::Unauthorized);
        }

        self.user_repo
            .find_by_email(email)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AppError::Unauthorized)
    }

    pub async fn change_password(&self, user_id: Uuid, request: ChangePasswordRequest) -> Result<()> {
        request.validate()?;

        let current_hash = auth::get_password_hash_by_id(&self.db_pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !AuthService::verify_password(&request.current_password, &current_hash).await? {
            return Err(AppError::BadRequest("Current password is incorrect".to_string()));
        }

        let new_hash = AuthService::hash_password(&request.new_password).await?;
        self.user_repo.update_password_hash(user_id, &new_hash).await?;

        tracing::info!("User {} changed their password", user_id);
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(&self, id: Uuid, request: UpdateProfileRequest) -> Result<User> {
        request.validate()?;
        self.user_repo.update_profile(id, request).await
    }

    pub async fn list_students(&self, search: Option<String>, include_inactive: bool, limit: i64, offset: i64) -> Result<Vec<User>> {
        self.user_repo
            .list(
                UserFilter {
                    role: Some(UserRole::Student),
                    search,
                    include_inactive,
                },
                limit,
                offset,
            )
            .await
    }

    pub async fn student_detail(&self, id: Uuid) -> Result<StudentDetail> {
        let student = self.get(id).await?;
        if student.role != UserRole::Student {
            return Err(AppError::NotFound("Student not found".to_string()));
        }

        let applications = self
            .application_repo
            .list(ApplicationFilter {
                student_id: Some(id),
                ..Default::default()
            })
            .await?;
        let current_assignment = self.assignment_repo.find_active_by_student(id).await?;
        let maintenance_requests = self
            .maintenance_repo
            .list(MaintenanceFilter {
                student_id: Some(id),
                ..Default::default()
            })
            .await?;

        Ok(StudentDetail {
            student,
            applications,
            current_assignment,
            maintenance_requests,
        })
    }

    /// Soft delete. The account keeps its history but can no longer sign in.
    pub async fn deactivate(&self, admin: &User, id: Uuid) -> Result<User> {
        if admin.id == id {
            return Err(AppError::BadRequest("You cannot deactivate your own account".to_string()));
        }

        let user = self.user_repo.set_active(id, false).await?;
        tracing::info!("Admin {} deactivated user {}", admin.id, id);
        Ok(user)
    }

    pub async fn reactivate(&self, admin: &User, id: Uuid) -> Result<User> {
        let user = self.user_repo.set_active(id, true).await?;
        tracing::info!("Admin {} reactivated user {}", admin.id, id);
        Ok(user)
    }

    pub async fn count_students(&self) -> Result<i64> {
        self.user_repo.count_by_role(UserRole::Student).await
    }

    pub async fn count_admins(&self) -> Result<i64> {
        self.user_repo.count_by_role(UserRole::Admin).await
    }
}
