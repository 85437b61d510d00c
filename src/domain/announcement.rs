use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub announcement_type: AnnouncementType,
    pub priority: AnnouncementPriority,
    pub target_audience: TargetAudience,
    pub status: AnnouncementStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Published, not yet expired, and addressed to the given role.
    pub fn is_visible_to(&self, role: UserRole, now: DateTime<Utc>) -> bool {
        self.status == AnnouncementStatus::Published
            && self.expires_at.map(|at| at > now).unwrap_or(true)
            && self.target_audience.includes(role)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementType {
    General,
    Emergency,
    Event,
}

impl AnnouncementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementType::General => "general",
            AnnouncementType::Emergency => "emergency",
            AnnouncementType::Event => "event",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "general" => Some(AnnouncementType::General),
            "emergency" => Some(AnnouncementType::Emergency),
            "event" => Some(AnnouncementType::Event),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementPriority {
    Low,
    Medium,
    High,
}

impl AnnouncementPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementPriority::Low => "low",
            AnnouncementPriority::Medium => "medium",
            AnnouncementPriority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(AnnouncementPriority::Low),
            "medium" => Some(AnnouncementPriority::Medium),
            "high" => Some(AnnouncementPriority::High),
            _ => None,
        }
    }

    /// Sort key used by the database, higher is more urgent.
    pub fn rank(&self) -> i32 {
        match self {
            AnnouncementPriority::Low => 0,
            AnnouncementPriority::Medium => 1,
            AnnouncementPriority::High => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetAudience {
    All,
    Students,
    Admins,
}

impl TargetAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetAudience::All => "all",
            TargetAudience::Students => "students",
            TargetAudience::Admins => "admins",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(TargetAudience::All),
            "students" => Some(TargetAudience::Students),
            "admins" => Some(TargetAudience::Admins),
            _ => None,
        }
    }

    pub fn includes(&self, role: UserRole) -> bool {
        match self {
            TargetAudience::All => true,
            TargetAudience::Students => role == UserRole::Student,
            TargetAudience::Admins => role == UserRole::Admin,
        }
    }

    pub fn roles(&self) -> Vec<UserRole> {
        match self {
            TargetAudience::All => vec![UserRole::Student, UserRole::Admin],
            TargetAudience::Students => vec![UserRole::Student],
            TargetAudience::Admins => vec![UserRole::Admin],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementStatus {
    Draft,
    Published,
    Archived,
}

impl AnnouncementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementStatus::Draft => "draft",
            AnnouncementStatus::Published => "published",
            AnnouncementStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(AnnouncementStatus::Draft),
            "published" => Some(AnnouncementStatus::Published),
            "archived" => Some(AnnouncementStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
    pub announcement_type: AnnouncementType,
    pub priority: AnnouncementPriority,
    pub target_audience: TargetAudience,
    pub expires_at: Option<DateTime<Utc>>,
    /// Publish (and notify the audience) straight away instead of saving a draft.
    #[serde(default)]
    pub publish_now: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    pub content: Option<String>,
    pub announcement_type: Option<AnnouncementType>,
    pub priority: Option<AnnouncementPriority>,
    pub target_audience: Option<TargetAudience>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clear_expiry: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementFilter {
    pub status: Option<AnnouncementStatus>,
    pub priority: Option<AnnouncementPriority>,
    pub target_audience: Option<TargetAudience>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn announcement(audience: TargetAudience, status: AnnouncementStatus) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: "Room selection open".to_string(),
            content: "Apply before the deadline".to_string(),
            announcement_type: AnnouncementType::General,
            priority: AnnouncementPriority::Medium,
            target_audience: audience,
            status,
            published_at: Some(Utc::now()),
            expires_at: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_visibility_by_audience() {
        let now = Utc::now();
        let students_only = announcement(TargetAudience::Students, AnnouncementStatus::Published);
        assert!(students_only.is_visible_to(UserRole::Student, now));
        assert!(!students_only.is_visible_to(UserRole::Admin, now));

        let everyone = announcement(TargetAudience::All, AnnouncementStatus::Published);
        assert!(everyone.is_visible_to(UserRole::Admin, now));
    }

    #[test]
    fn test_drafts_and_expired_are_hidden() {
        let now = Utc::now();
        let draft = announcement(TargetAudience::All, AnnouncementStatus::Draft);
        assert!(!draft.is_visible_to(UserRole::Student, now));

        let mut expired = announcement(TargetAudience::All, AnnouncementStatus::Published);
        expired.expires_at = Some(now - Duration::hours(1));
        assert!(!expired.is_visible_to(UserRole::Student, now));
    }
}
