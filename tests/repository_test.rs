mod common;

use residence::{
    domain::*,
    error::AppError,
    repository::{
        BlockRepository, RoomRepository, SqliteBlockRepository, SqliteRoomRepository,
        SqliteUserRepository, UserRepository,
    },
};

#[tokio::test]
async fn test_user_crud() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let repo = SqliteUserRepository::new(pool.clone());

    let user = repo.create(NewUser {
        email: "Amara.Obi@Students.test".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        full_name: "Amara Obi".to_string(),
        role: UserRole::Student,
        gender: Some(Gender::Female),
        student_number: Some("S1001".to_string()),
        phone: None,
    }).await?;

    assert_eq!(user.email, "amara.obi@students.test");
    assert_eq!(user.role, UserRole::Student);
    assert!(user.is_active);

    let found = repo.find_by_email("AMARA.OBI@students.test").await?;
    assert_eq!(found.map(|u| u.id), Some(user.id));

    let by_number = repo.find_by_student_number("S1001").await?;
    assert_eq!(by_number.map(|u| u.id), Some(user.id));

    let updated = repo.update_profile(user.id, UpdateProfileRequest {
        phone: Some("555-0101".to_string()),
        faculty: Some("Engineering".to_string()),
        ..Default::default()
    }).await?;
    assert_eq!(updated.phone.as_deref(), Some("555-0101"));
    assert_eq!(updated.faculty.as_deref(), Some("Engineering"));
    assert_eq!(updated.full_name, "Amara Obi");

    let search = repo.list(UserFilter {
        search: Some("obi".to_string()),
        ..Default::default()
    }, 10, 0).await?;
    assert_eq!(search.len(), 1);

    let deactivated = repo.set_active(user.id, false).await?;
    assert!(!deactivated.is_active);

    let active = repo.list(UserFilter::default(), 10, 0).await?;
    assert!(active.is_empty());

    let everyone = repo.list(UserFilter { include_inactive: true, ..Default::default() }, 10, 0).await?;
    assert_eq!(everyone.len(), 1);

    assert_eq!(repo.count_by_role(UserRole::Student).await?, 1);
    assert_eq!(repo.count_by_role(UserRole::Admin).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_block_room_counts_are_derived() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let blocks = SqliteBlockRepository::new(pool.clone());
    let rooms = SqliteRoomRepository::new(pool.clone());

    let block = blocks.create(CreateBlockRequest {
        name: "Kilimanjaro".to_string(),
        gender: GenderDesignation::Mixed,
        description: Some("Near the library".to_string()),
    }).await?;
    assert_eq!(block.total_rooms, 0);

    let mut created = Vec::new();
    for number in ["K101", "K102", "K103"] {
        created.push(rooms.create(CreateRoomRequest {
            block_id: block.id,
            room_number: number.to_string(),
            floor: 1,
            capacity: 2,
            room_type: RoomType::Double,
            gender: GenderDesignation::Mixed,
            amenities: vec!["Balcony".to_string()],
        }).await?);
    }

    assert_eq!(created[0].status, RoomStatus::Available);
    assert_eq!(created[0].amenities, vec!["Balcony".to_string()]);

    rooms.set_status(created[1].id, RoomStatus::Maintenance).await?;

    let block = blocks.find_by_id(block.id).await?.expect("block exists");
    assert_eq!(block.total_rooms, 3);
    assert_eq!(block.available_rooms, 2);

    let by_name = blocks.find_by_name("kilimanjaro").await?;
    assert_eq!(by_name.map(|b| b.id), Some(block.id));

    let maintenance = rooms.list(RoomFilter {
        status: Some(RoomStatus::Maintenance),
        ..Default::default()
    }).await?;
    assert_eq!(maintenance.len(), 1);
    assert_eq!(maintenance[0].room_number, "K102");

    let found = rooms.find_by_number(block.id, "K103").await?;
    assert_eq!(found.map(|r| r.id), Some(created[2].id));

    Ok(())
}

#[tokio::test]
async fn test_block_with_rooms_cannot_be_deleted() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;

    let block = common::block(&ctx, "Serengeti", GenderDesignation::Male).await?;
    let room = common::room(&ctx, &block, "S1").await?;

    let result = ctx.room_service.delete_block(block.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    ctx.room_service.delete_room(room.id).await?;
    ctx.room_service.delete_block(block.id).await?;

    assert!(matches!(
        ctx.room_service.get_block(block.id).await,
        Err(AppError::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_names_conflict() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;

    let block = common::block(&ctx, "Zambezi", GenderDesignation::Female).await?;
    common::room(&ctx, &block, "Z1").await?;

    let duplicate_block = common::block(&ctx, "zambezi", GenderDesignation::Mixed).await;
    assert!(duplicate_block.is_err());

    let duplicate_room = common::room(&ctx, &block, "Z1").await;
    assert!(duplicate_room.is_err());

    Ok(())
}
