use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;
use crate::domain::*;
use crate::error::{AppError, Result};

pub mod user_repository;
pub mod block_repository;
pub mod room_repository;
pub mod application_repository;
pub mod assignment_repository;
pub mod maintenance_repository;
pub mod announcement_repository;
pub mod notification_repository;
pub mod message_repository;

pub use user_repository::SqliteUserRepository;
pub use block_repository::SqliteBlockRepository;
pub use room_repository::SqliteRoomRepository;
pub use application_repository::SqliteApplicationRepository;
pub use assignment_repository::SqliteAssignmentRepository;
pub use maintenance_repository::SqliteMaintenanceRepository;
pub use announcement_repository::SqliteAnnouncementRepository;
pub use notification_repository::SqliteNotificationRepository;
pub use message_repository::SqliteMessageRepository;

/// Writes performed together when an administrator approves an application.
#[derive(Debug, Clone)]
pub struct ApprovalRecord {
    pub application_id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    /// Room designations the student may be placed in.
    pub room_genders: Vec<GenderDesignation>,
    pub reviewer_id: Uuid,
    pub notes: String,
    pub check_in_date: NaiveDate,
    pub notification: NewNotification,
}

#[derive(Debug, Clone)]
pub struct DenialRecord {
    pub application_id: Uuid,
    pub reviewer_id: Uuid,
    pub reason: String,
    pub notification: NewNotification,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_student_number(&self, student_number: &str) -> Result<Option<User>>;
    async fn list(&self, filter: UserFilter, limit: i64, offset: i64) -> Result<Vec<User>>;
    async fn list_active_by_roles(&self, roles: &[UserRole]) -> Result<Vec<User>>;
    async fn count_by_role(&self, role: UserRole) -> Result<i64>;
    async fn update_profile(&self, id: Uuid, update: UpdateProfileRequest) -> Result<User>;
    async fn set_active(&self, id: Uuid, active: bool) -> Result<User>;
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()>;
}

#[async_trait]
pub trait BlockRepository: Send + Sync {
    async fn create(&self, block: CreateBlockRequest) -> Result<Block>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Block>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Block>>;
    async fn list(&self) -> Result<Vec<Block>>;
    async fn update(&self, id: Uuid, update: UpdateBlockRequest) -> Result<Block>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, room: CreateRoomRequest) -> Result<Room>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Room>>;
    async fn find_by_number(&self, block_id: Uuid, room_number: &str) -> Result<Option<Room>>;
    async fn list(&self, filter: RoomFilter) -> Result<Vec<Room>>;
    async fn update(&self, id: Uuid, update: UpdateRoomRequest) -> Result<Room>;
    async fn set_status(&self, id: Uuid, status: RoomStatus) -> Result<Room>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, application: NewApplication) -> Result<Application>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>>;
    async fn list(&self, filter: ApplicationFilter) -> Result<Vec<Application>>;
    async fn count_by_status(&self) -> Result<ApplicationCounts>;
    async fn update_details(&self, id: Uuid, update: UpdateApplicationRequest) -> Result<Application>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Marks the application approved, occupies the room, records the
    /// assignment and notifies the student. Nothing is written unless every
    /// step succeeds.
    async fn approve(&self, record: ApprovalRecord) -> Result<(Application, Assignment)>;
    async fn deny(&self, record: DenialRecord) -> Result<Application>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>>;
    async fn find_by_application(&self, application_id: Uuid) -> Result<Option<Assignment>>;
    async fn list(&self, status: Option<AssignmentStatus>) -> Result<Vec<Assignment>>;
    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Assignment>>;
    async fn find_active_by_student(&self, student_id: Uuid) -> Result<Option<Assignment>>;
    async fn list_active_by_room(&self, room_id: Uuid) -> Result<Vec<Assignment>>;
    /// Completes the assignment and frees its room in one transaction.
    async fn check_out(&self, id: Uuid, check_out_date: NaiveDate) -> Result<Assignment>;
}

#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    async fn create(&self, request: NewMaintenanceRequest) -> Result<MaintenanceRequest>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MaintenanceRequest>>;
    async fn list(&self, filter: MaintenanceFilter) -> Result<Vec<MaintenanceRequest>>;
    async fn update_status(
        &self,
        id: Uuid,
        status: MaintenanceStatus,
        resolution_notes: Option<String>,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<MaintenanceRequest>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, announcement: Announcement) -> Result<Announcement>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>>;
    async fn list(&self, filter: AnnouncementFilter) -> Result<Vec<Announcement>>;
    /// Published, unexpired announcements for any of the given audiences,
    /// most urgent first and newest first within a priority.
    async fn list_visible(&self, audiences: &[TargetAudience], now: DateTime<Utc>) -> Result<Vec<Announcement>>;
    async fn update(&self, id: Uuid, announcement: Announcement) -> Result<Announcement>;
    /// Publishes the announcement and inserts the audience notifications atomically.
    async fn publish(&self, id: Uuid, published_at: DateTime<Utc>, notifications: Vec<NewNotification>) -> Result<Announcement>;
    async fn set_status(&self, id: Uuid, status: AnnouncementStatus) -> Result<Announcement>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification>;
    async fn create_many(&self, notifications: Vec<NewNotification>) -> Result<u64>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>>;
    async fn list_for_user(&self, user_id: Uuid, unread_only: bool, limit: i64) -> Result<Vec<Notification>>;
    async fn unread_count(&self, user_id: Uuid) -> Result<i64>;
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Stores the message and the receiver's notification together.
    async fn create(&self, sender_id: Uuid, receiver_id: Uuid, content: &str, notification: NewNotification) -> Result<Message>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>>;
    /// Both directions between two users, oldest first.
    async fn conversation(&self, user_id: Uuid, other_id: Uuid) -> Result<Vec<Message>>;
    /// Every message the user sent or received, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Message>>;
    async fn unread_count(&self, user_id: Uuid) -> Result<i64>;
    async fn mark_read(&self, id: Uuid, receiver_id: Uuid) -> Result<bool>;
    async fn mark_conversation_read(&self, receiver_id: Uuid, sender_id: Uuid) -> Result<u64>;
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::Database(e.to_string()))
}

pub(crate) fn to_utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(dt, Utc)
}

/// Maps a stored enum string back to its variant, treating unknown values as corruption.
pub(crate) fn parse_stored<T>(value: &str, parse: fn(&str) -> Option<T>, what: &str) -> Result<T> {
    parse(value).ok_or_else(|| AppError::Database(format!("Invalid {}: {}", what, value)))
}

/// Deletes that trip a foreign key surface as a conflict rather than a database failure.
pub(crate) fn map_delete_error(err: sqlx::Error, what: &str) -> AppError {
    let referenced = err
        .as_database_error()
        .map(|db| db.message().contains("FOREIGN KEY"))
        .unwrap_or(false);

    if referenced {
        AppError::Conflict(format!("{} is still referenced by other records", what))
    } else {
        AppError::Database(err.to_string())
    }
}
