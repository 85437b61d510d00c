use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::RoomType;

/// Stored when an administrator denies an application without giving a reason.
pub const DEFAULT_DENIAL_REASON: &str = "Application denied by administrator";

/// Stored when an administrator approves an application without notes.
pub const DEFAULT_APPROVAL_NOTE: &str = "Application approved";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub student_id: Uuid,
    pub preferred_block_id: Option<Uuid>,
    pub room_type: RoomType,
    pub special_requirements: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub academic_year: Option<String>,
    pub semester: Option<String>,
    pub status: ApplicationStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Denied,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Denied => "denied",
        }
    }

    /// "rejected" is what older clients send for a denial.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "denied" | "rejected" => Some(ApplicationStatus::Denied),
            _ => None,
        }
    }

    pub fn is_reviewable(&self) -> bool {
        matches!(self, ApplicationStatus::Pending)
    }

    /// Review actions an administrator may take on an application in this state.
    pub fn available_actions(&self) -> Vec<ReviewAction> {
        if self.is_reviewable() {
            vec![ReviewAction::Approve, ReviewAction::Deny]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Deny,
}

impl ReviewAction {
    pub fn requires_room(&self) -> bool {
        matches!(self, ReviewAction::Approve)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitApplicationRequest {
    pub preferred_block_id: Option<Uuid>,
    pub room_type: RoomType,
    #[validate(length(max = 2000))]
    pub special_requirements: Option<String>,
    #[validate(length(max = 120))]
    pub emergency_contact_name: Option<String>,
    #[validate(length(max = 32))]
    pub emergency_contact_phone: Option<String>,
    #[validate(length(max = 60))]
    pub emergency_contact_relationship: Option<String>,
    #[validate(length(max = 16))]
    pub academic_year: Option<String>,
    #[validate(length(max = 16))]
    pub semester: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateApplicationRequest {
    pub preferred_block_id: Option<Uuid>,
    pub room_type: Option<RoomType>,
    #[validate(length(max = 2000))]
    pub special_requirements: Option<String>,
    #[validate(length(max = 120))]
    pub emergency_contact_name: Option<String>,
    #[validate(length(max = 32))]
    pub emergency_contact_phone: Option<String>,
    #[validate(length(max = 60))]
    pub emergency_contact_relationship: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApproveApplicationRequest {
    pub room_id: Uuid,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct DenyApplicationRequest {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

/// Fields for inserting an application; status always starts as pending.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub student_id: Uuid,
    pub request: SubmitApplicationRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilter {
    pub student_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
    pub block_id: Option<Uuid>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationCounts {
    pub pending: i64,
    pub approved: i64,
    pub denied: i64,
}

impl ApplicationCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.approved + self.denied
    }
}
