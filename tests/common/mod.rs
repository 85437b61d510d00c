#![allow(dead_code)]

use std::sync::Arc;

use residence::{
    auth::AuthService,
    domain::*,
    integrations::IntegrationManager,
    service::ServiceContext,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const PASSWORD: &str = "password123";

/// One connection that never recycles, so the in-memory database survives the test.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

pub async fn test_context() -> anyhow::Result<Arc<ServiceContext>> {
    let pool = test_pool().await?;
    let auth_service = Arc::new(AuthService::new(pool.clone(), 24));

    Ok(Arc::new(ServiceContext::new(
        pool,
        Arc::new(IntegrationManager::new()),
        auth_service,
    )))
}

pub async fn admin(ctx: &ServiceContext) -> anyhow::Result<User> {
    Ok(ctx
        .user_service
        .create_admin("warden@residence.test", PASSWORD, "Head Warden")
        .await?)
}

pub async fn student(ctx: &ServiceContext, name: &str, gender: Gender) -> anyhow::Result<User> {
    let handle = name.to_lowercase().replace(' ', ".");

    Ok(ctx
        .user_service
        .register(RegisterRequest {
            email: format!("{}@students.test", handle),
            password: PASSWORD.to_string(),
            full_name: name.to_string(),
            gender: Some(gender),
            student_number: Some(format!("S-{}", handle)),
            phone: None,
        })
        .await?)
}

pub async fn block(ctx: &ServiceContext, name: &str, gender: GenderDesignation) -> anyhow::Result<Block> {
    Ok(ctx
        .room_service
        .create_block(CreateBlockRequest {
            name: name.to_string(),
            gender,
            description: None,
        })
        .await?)
}

pub async fn room(ctx: &ServiceContext, block: &Block, number: &str) -> anyhow::Result<Room> {
    Ok(ctx
        .room_service
        .create_room(CreateRoomRequest {
            block_id: block.id,
            room_number: number.to_string(),
            floor: 1,
            capacity: 1,
            room_type: RoomType::Single,
            gender: block.gender,
            amenities: vec!["Desk".to_string(), "WiFi".to_string()],
        })
        .await?)
}

pub fn application_request(preferred_block_id: Option<uuid::Uuid>) -> SubmitApplicationRequest {
    SubmitApplicationRequest {
        preferred_block_id,
        room_type: RoomType::Single,
        special_requirements: None,
        emergency_contact_name: Some("Pat Guardian".to_string()),
        emergency_contact_phone: Some("555-0100".to_string()),
        emergency_contact_relationship: Some("Parent".to_string()),
        academic_year: Some("2025/2026".to_string()),
        semester: Some("First".to_string()),
    }
}
