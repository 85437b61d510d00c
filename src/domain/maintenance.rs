use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub title: String,
    pub category: MaintenanceCategory,
    pub description: String,
    pub priority: MaintenancePriority,
    pub status: MaintenanceStatus,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceCategory {
    Plumbing,
    Electrical,
    Furniture,
    Cleaning,
    Other,
}

impl MaintenanceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceCategory::Plumbing => "plumbing",
            MaintenanceCategory::Electrical => "electrical",
            MaintenanceCategory::Furniture => "furniture",
            MaintenanceCategory::Cleaning => "cleaning",
            MaintenanceCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plumbing" => Some(MaintenanceCategory::Plumbing),
            "electrical" => Some(MaintenanceCategory::Electrical),
            "furniture" => Some(MaintenanceCategory::Furniture),
            "cleaning" => Some(MaintenanceCategory::Cleaning),
            "other" => Some(MaintenanceCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePriority {
    Low,
    Medium,
    High,
    Emergency,
}

impl MaintenancePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenancePriority::Low => "low",
            MaintenancePriority::Medium => "medium",
            MaintenancePriority::High => "high",
            MaintenancePriority::Emergency => "emergency",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(MaintenancePriority::Low),
            "medium" => Some(MaintenancePriority::Medium),
            "high" => Some(MaintenancePriority::High),
            "emergency" => Some(MaintenancePriority::Emergency),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "pending",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Cancelled => "cancelled",
        }
    }

    /// Accepts both "in_progress" and "in-progress".
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pending" => Some(MaintenanceStatus::Pending),
            "in_progress" => Some(MaintenanceStatus::InProgress),
            "completed" => Some(MaintenanceStatus::Completed),
            "cancelled" => Some(MaintenanceStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, MaintenanceStatus::Pending | MaintenanceStatus::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitMaintenanceRequest {
    /// Defaults to the room of the student's active assignment.
    pub room_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    pub category: MaintenanceCategory,
    #[validate(length(min = 1, max = 4000))]
    pub description: String,
    pub priority: MaintenancePriority,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMaintenanceStatusRequest {
    pub status: MaintenanceStatus,
    #[validate(length(max = 4000))]
    pub resolution_notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMaintenanceRequest {
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub title: String,
    pub category: MaintenanceCategory,
    pub description: String,
    pub priority: MaintenancePriority,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaintenanceFilter {
    pub student_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub status: Option<MaintenanceStatus>,
    pub priority: Option<MaintenancePriority>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accepts_hyphenated_form() {
        assert_eq!(MaintenanceStatus::from_str("in-progress"), Some(MaintenanceStatus::InProgress));
        assert_eq!(MaintenanceStatus::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn test_open_statuses() {
        assert!(MaintenanceStatus::Pending.is_open());
        assert!(MaintenanceStatus::InProgress.is_open());
        assert!(!MaintenanceStatus::Completed.is_open());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(MaintenancePriority::Emergency > MaintenancePriority::High);
        assert!(MaintenancePriority::Low < MaintenancePriority::Medium);
    }
}
