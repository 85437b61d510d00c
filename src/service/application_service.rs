use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    integrations::{HousingEvent, IntegrationManager},
    repository::{
        ApplicationRepository, ApprovalRecord, AssignmentRepository, BlockRepository,
        DenialRecord, RoomRepository, UserRepository,
    },
};

const APPROVED_TITLE: &str = "Application Approved";
const APPROVED_CONTENT: &str =
    "Your accommodation application has been approved and you have been assigned a room.";
const DENIED_TITLE: &str = "Application Denied";

/// An application together with the review actions open to an administrator.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    pub student: Option<User>,
    pub assignment: Option<Assignment>,
    pub available_actions: Vec<ReviewAction>,
}

pub struct ApplicationService {
    application_repo: Arc<dyn ApplicationRepository>,
    user_repo: Arc<dyn UserRepository>,
    block_repo: Arc<dyn BlockRepository>,
    room_repo: Arc<dyn RoomRepository>,
    assignment_repo: Arc<dyn AssignmentRepository>,
    integration_manager: Arc<IntegrationManager>,
}

impl ApplicationService {
    pub fn new(
        application_repo: Arc<dyn ApplicationRepository>,
        user_repo: Arc<dyn UserRepository>,
        block_repo: Arc<dyn BlockRepository>,
        room_repo: Arc<dyn RoomRepository>,
        assignment_repo: Arc<dyn AssignmentRepository>,
        integration_manager: Arc<IntegrationManager>,
    ) -> Self {
        Self {
            application_repo,
            user_repo,
            block_repo,
            room_repo,
            assignment_repo,
            integration_manager,
        }
    }

    pub async fn submit(&self, student: &User, request: SubmitApplicationRequest) -> Result<Application> {
        request.validate()?;

        if student.role != UserRole::Student {
            return Err(AppError::Forbidden);
        }

        let gender = student.gender.ok_or_else(|| {
            AppError::BadRequest("Set your gender on your profile before applying".to_string())
        })?;

        if let Some(block_id) = request.preferred_block_id {
            self.ensure_block_admits(block_id, gender).await?;
        }

        let pending = self
            .application_repo
            .list(ApplicationFilter {
                student_id: Some(student.id),
                status: Some(ApplicationStatus::Pending),
                ..Default::default()
            })
            .await?;
        if !pending.is_empty() {
            return Err(AppError::Conflict(
                "You already have a pending application".to_string(),
            ));
        }

        if self.assignment_repo.find_active_by_student(student.id).await?.is_some() {
            return Err(AppError::Conflict(
                "You already have an active room assignment".to_string(),
            ));
        }

        let application = self
            .application_repo
            .create(NewApplication {
                student_id: student.id,
                request,
            })
            .await?;

        tracing::info!("Student {} submitted application {}", student.id, application.id);

        self.integration_manager
            .handle_event(HousingEvent::ApplicationSubmitted(application.clone()))
            .await;

        Ok(application)
    }

    pub async fn list(&self, filter: ApplicationFilter) -> Result<Vec<Application>> {
        self.application_repo.list(filter).await
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<Application>> {
        self.application_repo
            .list(ApplicationFilter {
                student_id: Some(student_id),
                ..Default::default()
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Application> {
        self.application_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
    }

    /// Fetches an application only if it belongs to the student.
    pub async fn get_for_student(&self, student_id: Uuid, id: Uuid) -> Result<Application> {
        let application = self.get(id).await?;
        if application.student_id != student_id {
            return Err(AppError::NotFound("Application not found".to_string()));
        }
        Ok(application)
    }

    pub async fn detail(&self, id: Uuid) -> Result<ApplicationDetail> {
        let application = self.get(id).await?;
        let student = self.user_repo.find_by_id(application.student_id).await?;
        let assignment = self.assignment_repo.find_by_application(application.id).await?;
        let available_actions = Self::available_actions(&application);

        Ok(ApplicationDetail {
            application,
            student,
            assignment,
            available_actions,
        })
    }

    pub fn available_actions(application: &Application) -> Vec<ReviewAction> {
        application.status.available_actions()
    }

    pub async fn approve(
        &self,
        admin: &User,
        id: Uuid,
        request: ApproveApplicationRequest,
    ) -> Result<(Application, Assignment)> {
        request.validate()?;

        let application = self.get(id).await?;
        if !application.status.is_reviewable() {
            return Err(AppError::Conflict(format!(
                "Application is already {}",
                application.status.as_str()
            )));
        }

        let student = self
            .user_repo
            .find_by_id(application.student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

        let room = self
            .room_repo
            .find_by_id(request.room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        if room.status != RoomStatus::Available {
            return Err(AppError::Conflict(format!(
                "Room {} is not available",
                room.room_number
            )));
        }

        if let Some(gender) = student.gender {
            if !room.gender.admits(gender) {
                return Err(AppError::BadRequest(format!(
                    "Room {} is designated {} and cannot house this student",
                    room.room_number,
                    room.gender.as_str()
                )));
            }
        }

        if self.assignment_repo.find_active_by_student(student.id).await?.is_some() {
            return Err(AppError::Conflict(
                "Student already has an active room assignment".to_string(),
            ));
        }

        let notes = request
            .notes
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APPROVAL_NOTE.to_string());

        let record = ApprovalRecord {
            application_id: application.id,
            student_id: student.id,
            room_id: room.id,
            room_genders: GenderDesignation::admitting(student.gender),
            reviewer_id: admin.id,
            notes,
            check_in_date: Utc::now().date_naive(),
            notification: NewNotification::new(
                student.id,
                NotificationType::ApplicationStatus,
                APPROVED_TITLE,
                APPROVED_CONTENT,
            ),
        };

        let (application, assignment) = match self.application_repo.approve(record).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Approval of application {} rolled back: {}", id, e);
                return Err(e);
            }
        };

        tracing::info!(
            "Admin {} approved application {} into room {}",
            admin.id,
            application.id,
            room.room_number
        );

        self.integration_manager
            .handle_event(HousingEvent::ApplicationApproved {
                application: application.clone(),
                assignment: assignment.clone(),
            })
            .await;

        Ok((application, assignment))
    }

    pub async fn deny(&self, admin: &User, id: Uuid, request: DenyApplicationRequest) -> Result<Application> {
        request.validate()?;

        let application = self.get(id).await?;
        if !application.status.is_reviewable() {
            return Err(AppError::Conflict(format!(
                "Application is already {}",
                application.status.as_str()
            )));
        }

        let reason = request
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_DENIAL_REASON.to_string());

        let record = DenialRecord {
            application_id: application.id,
            reviewer_id: admin.id,
            notification: NewNotification::new(
                application.student_id,
                NotificationType::ApplicationStatus,
                DENIED_TITLE,
                format!("Your accommodation application has been denied. Reason: {}", reason),
            ),
            reason,
        };

        let application = self.application_repo.deny(record).await?;

        tracing::info!("Admin {} denied application {}", admin.id, application.id);

        self.integration_manager
            .handle_event(HousingEvent::ApplicationDenied(application.clone()))
            .await;

        Ok(application)
    }

    pub async fn update_details(
        &self,
        student: &User,
        id: Uuid,
        changes: UpdateApplicationRequest,
    ) -> Result<Application> {
        changes.validate()?;

        let application = self.get_for_student(student.id, id).await?;
        if !application.status.is_reviewable() {
            return Err(AppError::Conflict(
                "Only pending applications can be changed".to_string(),
            ));
        }

        if let (Some(block_id), Some(gender)) = (changes.preferred_block_id, student.gender) {
            self.ensure_block_admits(block_id, gender).await?;
        }

        self.application_repo.update_details(id, changes).await
    }

    pub async fn withdraw(&self, student: &User, id: Uuid) -> Result<()> {
        let application = self.get_for_student(student.id, id).await?;
        if !application.status.is_reviewable() {
            return Err(AppError::Conflict(
                "Only pending applications can be withdrawn".to_string(),
            ));
        }

        self.application_repo.delete(id).await?;
        tracing::info!("Student {} withdrew application {}", student.id, id);
        Ok(())
    }

    pub async fn counts(&self) -> Result<ApplicationCounts> {
        self.application_repo.count_by_status().await
    }

    async fn ensure_block_admits(&self, block_id: Uuid, gender: Gender) -> Result<()> {
        let block = self
            .block_repo
            .find_by_id(block_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Block not found".to_string()))?;

        if !block.gender.admits(gender) {
            return Err(AppError::BadRequest(format!(
                "{} is not open to {} applicants",
                block.name,
                gender.as_str()
            )));
        }

        Ok(())
    }
}
