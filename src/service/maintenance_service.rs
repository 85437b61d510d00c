use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    integrations::{HousingEvent, IntegrationManager},
    repository::{AssignmentRepository, MaintenanceRepository, NotificationRepository, RoomRepository},
};

pub struct MaintenanceService {
    maintenance_repo: Arc<dyn MaintenanceRepository>,
    room_repo: Arc<dyn RoomRepository>,
    assignment_repo: Arc<dyn AssignmentRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    integration_manager: Arc<IntegrationManager>,
}

impl MaintenanceService {
    pub fn new(
        maintenance_repo: Arc<dyn MaintenanceRepository>,
        room_repo: Arc<dyn RoomRepository>,
        assignment_repo: Arc<dyn AssignmentRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        integration_manager: Arc<IntegrationManager>,
    ) -> Self {
        Self {
            maintenance_repo,
            room_repo,
            assignment_repo,
            notification_repo,
            integration_manager,
        }
    }

    pub async fn submit(&self, student: &User, request: SubmitMaintenanceRequest) -> Result<MaintenanceRequest> {
        request.validate()?;

        let room_id = match request.room_id {
            Some(room_id) => room_id,
            None => self
                .assignment_repo
                .find_active_by_student(student.id)
                .await?
                .map(|assignment| assignment.room_id)
                .ok_or_else(|| {
                    AppError::BadRequest(
                        "Choose a room; you have no active room assignment".to_string(),
                    )
                })?,
        };

        self.room_repo
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        let created = self
            .maintenance_repo
            .create(NewMaintenanceRequest {
                student_id: student.id,
                room_id,
                title: request.title.trim().to_string(),
                category: request.category,
                description: request.description,
                priority: request.priority,
            })
            .await?;

        tracing::info!(
            "Maintenance request {} submitted by {} ({} priority)",
            created.id,
            student.id,
            created.priority.as_str()
        );

        self.integration_manager
            .handle_event(HousingEvent::MaintenanceSubmitted(created.clone()))
            .await;

        Ok(created)
    }

    pub async fn list(&self, filter: MaintenanceFilter) -> Result<Vec<MaintenanceRequest>> {
        self.maintenance_repo.list(filter).await
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<MaintenanceRequest>> {
        self.maintenance_repo
            .list(MaintenanceFilter {
                student_id: Some(student_id),
                ..Default::default()
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<MaintenanceRequest> {
        self.maintenance_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Maintenance request not found".to_string()))
    }

    pub async fn get_for_student(&self, student_id: Uuid, id: Uuid) -> Result<MaintenanceRequest> {
        let request = self.get(id).await?;
        if request.student_id != student_id {
            return Err(AppError::NotFound("Maintenance request not found".to_string()));
        }
        Ok(request)
    }

    pub async fn update_status(
        &self,
        admin: &User,
        id: Uuid,
        update: UpdateMaintenanceStatusRequest,
    ) -> Result<MaintenanceRequest> {
        update.validate()?;

        let existing = self.get(id).await?;

        let resolved_at = match update.status {
            MaintenanceStatus::Completed => existing.resolved_at.or_else(|| Some(Utc::now())),
            _ => None,
        };

        let updated = self
            .maintenance_repo
            .update_status(id, update.status, update.resolution_notes, resolved_at)
            .await?;

        tracing::info!(
            "Admin {} moved maintenance request {} from {} to {}",
            admin.id,
            id,
            existing.status.as_str(),
            updated.status.as_str()
        );

        if existing.status != updated.status {
            let content = format!(
                "Your maintenance request \"{}\" is now {}.",
                updated.title,
                updated.status.as_str().replace('_', " ")
            );
            self.notification_repo
                .create(NewNotification::new(
                    updated.student_id,
                    NotificationType::MaintenanceUpdate,
                    "Maintenance Request Updated",
                    content,
                ))
                .await?;

            self.integration_manager
                .handle_event(HousingEvent::MaintenanceStatusChanged {
                    previous: existing.status,
                    request: updated.clone(),
                })
                .await;
        }

        Ok(updated)
    }

    pub async fn cancel(&self, student: &User, id: Uuid) -> Result<MaintenanceRequest> {
        let request = self.get_for_student(student.id, id).await?;

        if request.status != MaintenanceStatus::Pending {
            return Err(AppError::Conflict(
                "Only pending maintenance requests can be cancelled".to_string(),
            ));
        }

        self.maintenance_repo
            .update_status(id, MaintenanceStatus::Cancelled, None, None)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.get(id).await?;
        self.maintenance_repo.delete(id).await
    }
}
