pub mod user_service;
pub mod application_service;
pub mod room_service;
pub mod maintenance_service;
pub mod announcement_service;
pub mod notification_service;
pub mod message_service;
pub mod report_service;
pub mod report_export;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::integrations::IntegrationManager;
use crate::auth::AuthService;
use user_service::UserService;
use application_service::ApplicationService;
use room_service::RoomService;
use maintenance_service::MaintenanceService;
use announcement_service::AnnouncementService;
use notification_service::NotificationService;
use message_service::MessageService;
use report_service::ReportService;

pub use report_export::ExportFormat;
pub use report_service::{Report, ReportKind, ReportQuery, ReportValue};

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub block_repo: Arc<dyn BlockRepository>,
    pub room_repo: Arc<dyn RoomRepository>,
    pub application_repo: Arc<dyn ApplicationRepository>,
    pub assignment_repo: Arc<dyn AssignmentRepository>,
    pub maintenance_repo: Arc<dyn MaintenanceRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub message_repo: Arc<dyn MessageRepository>,
    pub integration_manager: Arc<IntegrationManager>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub application_service: Arc<ApplicationService>,
    pub room_service: Arc<RoomService>,
    pub maintenance_service: Arc<MaintenanceService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub notification_service: Arc<NotificationService>,
    pub message_service: Arc<MessageService>,
    pub report_service: Arc<ReportService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        db_pool: SqlitePool,
        integration_manager: Arc<IntegrationManager>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let block_repo: Arc<dyn BlockRepository> = Arc::new(SqliteBlockRepository::new(db_pool.clone()));
        let room_repo: Arc<dyn RoomRepository> = Arc::new(SqliteRoomRepository::new(db_pool.clone()));
        let application_repo: Arc<dyn ApplicationRepository> =
            Arc::new(SqliteApplicationRepository::new(db_pool.clone()));
        let assignment_repo: Arc<dyn AssignmentRepository> =
            Arc::new(SqliteAssignmentRepository::new(db_pool.clone()));
        let maintenance_repo: Arc<dyn MaintenanceRepository> =
            Arc::new(SqliteMaintenanceRepository::new(db_pool.clone()));
        let announcement_repo: Arc<dyn AnnouncementRepository> =
            Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));
        let notification_repo: Arc<dyn NotificationRepository> =
            Arc::new(SqliteNotificationRepository::new(db_pool.clone()));
        let message_repo: Arc<dyn MessageRepository> = Arc::new(SqliteMessageRepository::new(db_pool.clone()));

        let user_service = Arc::new(UserService::new(
            user_repo.clone(),
            application_repo.clone(),
            assignment_repo.clone(),
            maintenance_repo.clone(),
            db_pool.clone(),
        ));
        let application_service = Arc::new(ApplicationService::new(
            application_repo.clone(),
            user_repo.clone(),
            block_repo.clone(),
            room_repo.clone(),
            assignment_repo.clone(),
            integration_manager.clone(),
        ));
        let room_service = Arc::new(RoomService::new(
            block_repo.clone(),
            room_repo.clone(),
            assignment_repo.clone(),
            integration_manager.clone(),
        ));
        let maintenance_service = Arc::new(MaintenanceService::new(
            maintenance_repo.clone(),
            room_repo.clone(),
            assignment_repo.clone(),
            notification_repo.clone(),
            integration_manager.clone(),
        ));
        let announcement_service = Arc::new(AnnouncementService::new(
            announcement_repo.clone(),
            user_repo.clone(),
            integration_manager.clone(),
        ));
        let notification_service = Arc::new(NotificationService::new(notification_repo.clone()));
        let message_service = Arc::new(MessageService::new(message_repo.clone(), user_repo.clone()));
        let report_service = Arc::new(ReportService::new(
            user_repo.clone(),
            block_repo.clone(),
            room_repo.clone(),
            application_repo.clone(),
            assignment_repo.clone(),
            maintenance_repo.clone(),
        ));

        Self {
            user_repo,
            block_repo,
            room_repo,
            application_repo,
            assignment_repo,
            maintenance_repo,
            announcement_repo,
            notification_repo,
            message_repo,
            integration_manager,
            auth_service,
            user_service,
            application_service,
            room_service,
            maintenance_service,
            announcement_service,
            notification_service,
            message_service,
            report_service,
            db_pool,
        }
    }
}
