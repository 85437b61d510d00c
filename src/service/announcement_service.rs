use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    integrations::{HousingEvent, IntegrationManager},
    repository::{AnnouncementRepository, UserRepository},
};

const PUBLISHED_TITLE: &str = "New Announcement";

pub struct AnnouncementService {
    announcement_repo: Arc<dyn AnnouncementRepository>,
    user_repo: Arc<dyn UserRepository>,
    integration_manager: Arc<IntegrationManager>,
}

impl AnnouncementService {
    pub fn new(
        announcement_repo: Arc<dyn AnnouncementRepository>,
        user_repo: Arc<dyn UserRepository>,
        integration_manager: Arc<IntegrationManager>,
    ) -> Self {
        Self {
            announcement_repo,
            user_repo,
            integration_manager,
        }
    }

    /// Saves a draft, or publishes straight away when `publish_now` is set.
    pub async fn create(&self, author: &User, request: CreateAnnouncementRequest) -> Result<Announcement> {
        request.validate()?;

        let now = Utc::now();
        let draft = Announcement {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            content: request.content,
            announcement_type: request.announcement_type,
            priority: request.priority,
            target_audience: request.target_audience,
            status: AnnouncementStatus::Draft,
            published_at: None,
            expires_at: request.expires_at,
            created_by: author.id,
            created_at: now,
            updated_at: now,
        };

        let created = self.announcement_repo.create(draft).await?;
        tracing::info!("Admin {} created announcement {}", author.id, created.id);

        if request.publish_now {
            return self.publish(created.id).await;
        }

        Ok(created)
    }

    pub async fn list(&self, filter: AnnouncementFilter) -> Result<Vec<Announcement>> {
        self.announcement_repo.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Announcement> {
        self.announcement_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
    }

    pub async fn update(&self, id: Uuid, request: UpdateAnnouncementRequest) -> Result<Announcement> {
        request.validate()?;

        let mut announcement = self.get(id).await?;

        if let Some(title) = request.title {
            announcement.title = title.trim().to_string();
        }
        if let Some(content) = request.content {
            announcement.content = content;
        }
        if let Some(announcement_type) = request.announcement_type {
            announcement.announcement_type = announcement_type;
        }
        if let Some(priority) = request.priority {
            announcement.priority = priority;
        }
        if let Some(audience) = request.target_audience {
            announcement.target_audience = audience;
        }
        if request.clear_expiry {
            announcement.expires_at = None;
        } else if request.expires_at.is_some() {
            announcement.expires_at = request.expires_at;
        }

        self.announcement_repo.update(id, announcement).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.get(id).await?;
        self.announcement_repo.delete(id).await
    }

    /// Publishes and notifies every active user in the target audience.
    pub async fn publish(&self, id: Uuid) -> Result<Announcement> {
        let announcement = self.get(id).await?;

        if announcement.status == AnnouncementStatus::Published {
            return Err(AppError::Conflict("Announcement is already published".to_string()));
        }

        let recipients = self
            .user_repo
            .list_active_by_roles(&announcement.target_audience.roles())
            .await?;

        let notifications: Vec<NewNotification> = recipients
            .iter()
            .map(|user| {
                NewNotification::new(
                    user.id,
                    NotificationType::Announcement,
                    PUBLISHED_TITLE,
                    announcement.title.clone(),
                )
            })
            .collect();

        let count = notifications.len();
        let published = self
            .announcement_repo
            .publish(id, Utc::now(), notifications)
            .await?;

        tracing::info!(
            "Published announcement {} to {} ({} notified)",
            published.id,
            published.target_audience.as_str(),
            count
        );

        self.integration_manager
            .handle_event(HousingEvent::AnnouncementPublished(published.clone()))
            .await;

        Ok(published)
    }

    pub async fn archive(&self, id: Uuid) -> Result<Announcement> {
        self.get(id).await?;
        self.announcement_repo.set_status(id, AnnouncementStatus::Archived).await
    }

    /// Published, unexpired announcements addressed to the role, most urgent first.
    pub async fn visible_for(&self, role: UserRole) -> Result<Vec<Announcement>> {
        let audiences = match role {
            UserRole::Student => [TargetAudience::All, TargetAudience::Students],
            UserRole::Admin => [TargetAudience::All, TargetAudience::Admins],
        };

        self.announcement_repo.list_visible(&audiences, Utc::now()).await
    }
}
