use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub notification_type: NotificationType,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ApplicationStatus,
    MaintenanceUpdate,
    Announcement,
    Message,
    Info,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::ApplicationStatus => "application_status",
            NotificationType::MaintenanceUpdate => "maintenance_update",
            NotificationType::Announcement => "announcement",
            NotificationType::Message => "message",
            NotificationType::Info => "info",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "application_status" => Some(NotificationType::ApplicationStatus),
            "maintenance_update" => Some(NotificationType::MaintenanceUpdate),
            "announcement" => Some(NotificationType::Announcement),
            "message" => Some(NotificationType::Message),
            "info" => Some(NotificationType::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub notification_type: NotificationType,
}

impl NewNotification {
    pub fn new(
        user_id: Uuid,
        notification_type: NotificationType,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            content: content.into(),
            notification_type,
        }
    }
}
