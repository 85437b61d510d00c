mod common;

use residence::{domain::*, error::AppError};

#[tokio::test]
async fn test_female_applicant_sees_two_of_three_blocks() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;

    common::block(&ctx, "Elgon", GenderDesignation::Male).await?;
    let female = common::block(&ctx, "Kenya", GenderDesignation::Female).await?;
    let mixed = common::block(&ctx, "Meru", GenderDesignation::Mixed).await?;

    let blocks = ctx.room_service.eligible_blocks(Gender::Female).await?;
    let mut ids: Vec<_> = blocks.iter().map(|b| b.id).collect();
    ids.sort();
    let mut expected = vec![female.id, mixed.id];
    expected.sort();

    assert_eq!(ids, expected);

    let other = ctx.room_service.eligible_blocks(Gender::Other).await?;
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].id, mixed.id);

    Ok(())
}

#[tokio::test]
async fn test_available_rooms_respect_gender_and_status() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let student = common::student(&ctx, "Ayo Bello", Gender::Male).await?;

    let male = common::block(&ctx, "Kilima", GenderDesignation::Male).await?;
    let female = common::block(&ctx, "Tana", GenderDesignation::Female).await?;
    let mixed = common::block(&ctx, "Athi", GenderDesignation::Mixed).await?;

    let m1 = common::room(&ctx, &male, "M1").await?;
    let m2 = common::room(&ctx, &male, "M2").await?;
    common::room(&ctx, &female, "F1").await?;
    let x1 = common::room(&ctx, &mixed, "X1").await?;

    ctx.room_service.set_room_status(m2.id, RoomStatus::Maintenance).await?;

    let rooms = ctx.room_service.available_rooms_for(&student, RoomFilter::default()).await?;
    let mut ids: Vec<_> = rooms.iter().map(|r| r.id).collect();
    ids.sort();
    let mut expected = vec![m1.id, x1.id];
    expected.sort();
    assert_eq!(ids, expected);

    let in_mixed = ctx.room_service
        .available_rooms_for(&student, RoomFilter { block_id: Some(mixed.id), ..Default::default() })
        .await?;
    assert_eq!(in_mixed.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_approval_rejects_room_of_other_gender() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Ama Owusu", Gender::Female).await?;
    let male = common::block(&ctx, "Volta", GenderDesignation::Male).await?;
    let room = common::room(&ctx, &male, "V1").await?;

    let application = ctx.application_service
        .submit(&student, common::application_request(None))
        .await?;

    let result = ctx.application_service
        .approve(&admin, application.id, ApproveApplicationRequest { room_id: room.id, notes: None })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    assert_eq!(ctx.room_service.get_room(room.id).await?.status, RoomStatus::Available);

    Ok(())
}
