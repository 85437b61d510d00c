use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{NewNotification, Notification},
    error::{AppError, Result},
    repository::NotificationRepository,
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    pub async fn notify(&self, notification: NewNotification) -> Result<Notification> {
        self.repo.create(notification).await
    }

    pub async fn list(&self, user_id: Uuid, unread_only: bool, limit: Option<i64>) -> Result<Vec<Notification>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        self.repo.list_for_user(user_id, unread_only, limit).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        self.repo.unread_count(user_id).await
    }

    /// Only the owner can mark a notification read.
    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        if !self.repo.mark_read(id, user_id).await? {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        self.repo.mark_all_read(user_id).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        if !self.repo.delete(id, user_id).await? {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }
}
