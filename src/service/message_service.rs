use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{MessageRepository, UserRepository},
};

pub struct MessageService {
    message_repo: Arc<dyn MessageRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl MessageService {
    pub fn new(message_repo: Arc<dyn MessageRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { message_repo, user_repo }
    }

    pub async fn send(&self, sender: &User, request: SendMessageRequest) -> Result<Message> {
        request.validate()?;

        let content = request.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Message must not be empty".to_string()));
        }

        if request.receiver_id == sender.id {
            return Err(AppError::BadRequest("You cannot message yourself".to_string()));
        }

        let receiver = self
            .user_repo
            .find_by_id(request.receiver_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;

        let notification = NewNotification::new(
            receiver.id,
            NotificationType::Message,
            "New Message",
            format!("{} sent you a message", sender.full_name),
        );

        let message = self
            .message_repo
            .create(sender.id, receiver.id, content, notification)
            .await?;

        tracing::debug!("Message {} sent from {} to {}", message.id, sender.id, receiver.id);
        Ok(message)
    }

    /// The full thread with `other_id`, oldest first. Messages addressed to
    /// `user_id` are marked read.
    pub async fn conversation(&self, user_id: Uuid, other_id: Uuid) -> Result<Vec<Message>> {
        self.user_repo
            .find_by_id(other_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.message_repo.mark_conversation_read(user_id, other_id).await?;
        self.message_repo.conversation(user_id, other_id).await
    }

    pub async fn conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>> {
        let messages = self.message_repo.list_for_user(user_id).await?;
        let mut summaries = Vec::new();

        for (counterpart_id, last_message, unread_count) in summarize_conversations(user_id, &messages) {
            let counterpart_name = self
                .user_repo
                .find_by_id(counterpart_id)
                .await?
                .map(|user| user.full_name)
                .unwrap_or_else(|| "Unknown user".to_string());

            summaries.push(ConversationSummary {
                counterpart_id,
                counterpart_name,
                last_message,
                unread_count,
            });
        }

        Ok(summaries)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        self.message_repo.unread_count(user_id).await
    }

    /// Only the receiver can mark a message read.
    pub async fn mark_read(&self, user_id: Uuid, message_id: Uuid) -> Result<()> {
        if !self.message_repo.mark_read(message_id, user_id).await? {
            return Err(AppError::NotFound("Message not found".to_string()));
        }
        Ok(())
    }
}
