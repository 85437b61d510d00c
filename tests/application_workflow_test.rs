mod common;

use chrono::Utc;
use residence::{
    domain::*,
    error::AppError,
    repository::{ApplicationRepository, ApprovalRecord},
};

#[tokio::test]
async fn test_approval_applies_every_write() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Wanjiru Kamau", Gender::Female).await?;
    let block = common::block(&ctx, "Baobab", GenderDesignation::Female).await?;
    let room = common::room(&ctx, &block, "B101").await?;

    let application = ctx.application_service
        .submit(&student, common::application_request(Some(block.id)))
        .await?;
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(
        ctx.application_service.detail(application.id).await?.available_actions,
        vec![ReviewAction::Approve, ReviewAction::Deny]
    );

    let (approved, assignment) = ctx.application_service
        .approve(&admin, application.id, ApproveApplicationRequest { room_id: room.id, notes: None })
        .await?;

    assert_eq!(approved.status, ApplicationStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(admin.id));
    assert_eq!(approved.admin_notes.as_deref(), Some(DEFAULT_APPROVAL_NOTE));
    assert_eq!(assignment.room_id, room.id);
    assert_eq!(assignment.student_id, student.id);
    assert_eq!(assignment.status, AssignmentStatus::Active);

    let assignments = ctx.room_service.list_assignments(None).await?;
    assert_eq!(assignments.len(), 1);

    let room = ctx.room_service.get_room(room.id).await?;
    assert_eq!(room.status, RoomStatus::Occupied);

    let notifications = ctx.notification_service.list(student.id, false, None).await?;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Application Approved");

    let detail = ctx.application_service.detail(application.id).await?;
    assert!(detail.available_actions.is_empty());
    assert_eq!(detail.assignment.map(|a| a.id), Some(assignment.id));

    Ok(())
}

#[tokio::test]
async fn test_failed_approval_leaves_nothing_behind() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Tendai Moyo", Gender::Male).await?;
    let block = common::block(&ctx, "Acacia", GenderDesignation::Male).await?;
    let room = common::room(&ctx, &block, "A1").await?;

    let application = ctx.application_service
        .submit(&student, common::application_request(None))
        .await?;

    // The room stops being available between the admin's choice and the write
    ctx.room_service.set_room_status(room.id, RoomStatus::Maintenance).await?;

    let result = ctx.application_repo
        .approve(ApprovalRecord {
            application_id: application.id,
            student_id: student.id,
            room_id: room.id,
            room_genders: GenderDesignation::admitting(student.gender),
            reviewer_id: admin.id,
            notes: DEFAULT_APPROVAL_NOTE.to_string(),
            check_in_date: Utc::now().date_naive(),
            notification: NewNotification::new(
                student.id,
                NotificationType::ApplicationStatus,
                "Application Approved",
                "approved",
            ),
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let application = ctx.application_service.get(application.id).await?;
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert!(application.reviewed_by.is_none());
    assert!(ctx.room_service.list_assignments(None).await?.is_empty());
    assert_eq!(ctx.notification_service.unread_count(student.id).await?, 0);
    assert_eq!(ctx.room_service.get_room(room.id).await?.status, RoomStatus::Maintenance);

    Ok(())
}

#[tokio::test]
async fn test_room_cannot_be_double_booked() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let first = common::student(&ctx, "Nia Achieng", Gender::Female).await?;
    let second = common::student(&ctx, "Zawadi Njeri", Gender::Female).await?;
    let block = common::block(&ctx, "Jacaranda", GenderDesignation::Female).await?;
    let room = common::room(&ctx, &block, "J7").await?;

    let a1 = ctx.application_service.submit(&first, common::application_request(None)).await?;
    let a2 = ctx.application_service.submit(&second, common::application_request(None)).await?;

    ctx.application_service
        .approve(&admin, a1.id, ApproveApplicationRequest { room_id: room.id, notes: None })
        .await?;

    let result = ctx.application_service
        .approve(&admin, a2.id, ApproveApplicationRequest { room_id: room.id, notes: None })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // Same race, reaching the database directly
    let raced = ctx.application_repo
        .approve(ApprovalRecord {
            application_id: a2.id,
            student_id: second.id,
            room_id: room.id,
            room_genders: GenderDesignation::admitting(second.gender),
            reviewer_id: admin.id,
            notes: DEFAULT_APPROVAL_NOTE.to_string(),
            check_in_date: Utc::now().date_naive(),
            notification: NewNotification::new(second.id, NotificationType::ApplicationStatus, "t", "c"),
        })
        .await;
    assert!(matches!(raced, Err(AppError::Conflict(_))));

    assert_eq!(ctx.application_service.get(a2.id).await?.status, ApplicationStatus::Pending);
    assert_eq!(ctx.room_service.list_assignments(None).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_deny_without_reason_uses_default() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Kofi Mensah", Gender::Male).await?;

    let application = ctx.application_service
        .submit(&student, common::application_request(None))
        .await?;

    let denied = ctx.application_service
        .deny(&admin, application.id, DenyApplicationRequest { reason: Some("   ".to_string()) })
        .await?;

    assert_eq!(denied.status, ApplicationStatus::Denied);
    assert_eq!(denied.admin_notes.as_deref(), Some(DEFAULT_DENIAL_REASON));

    let notifications = ctx.notification_service.list(student.id, true, None).await?;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Application Denied");
    assert!(notifications[0].content.ends_with(DEFAULT_DENIAL_REASON));

    // Reviewed applications cannot be reviewed again
    let again = ctx.application_service
        .deny(&admin, application.id, DenyApplicationRequest::default())
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn test_submission_rules() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let student = common::student(&ctx, "Lindiwe Dube", Gender::Female).await?;
    let male_block = common::block(&ctx, "Mopane", GenderDesignation::Male).await?;

    let wrong_block = ctx.application_service
        .submit(&student, common::application_request(Some(male_block.id)))
        .await;
    assert!(wrong_block.is_err());

    let application = ctx.application_service
        .submit(&student, common::application_request(None))
        .await?;

    let duplicate = ctx.application_service
        .submit(&student, common::application_request(None))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    ctx.application_service.withdraw(&student, application.id).await?;
    assert!(ctx.application_service.list_for_student(student.id).await?.is_empty());

    let counts = ctx.application_service.counts().await?;
    assert_eq!(counts.total(), 0);

    Ok(())
}

#[tokio::test]
async fn test_check_out_frees_the_room() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Sipho Ndlovu", Gender::Male).await?;
    let block = common::block(&ctx, "Marula", GenderDesignation::Mixed).await?;
    let room = common::room(&ctx, &block, "M3").await?;

    let application = ctx.application_service
        .submit(&student, common::application_request(Some(block.id)))
        .await?;
    let (_, assignment) = ctx.application_service
        .approve(&admin, application.id, ApproveApplicationRequest { room_id: room.id, notes: Some("Welcome".to_string()) })
        .await?;

    let blocked = ctx.room_service.set_room_status(room.id, RoomStatus::Available).await;
    assert!(matches!(blocked, Err(AppError::Conflict(_))));

    let checked_out = ctx.room_service.check_out(assignment.id).await?;
    assert_eq!(checked_out.status, AssignmentStatus::Completed);
    assert!(checked_out.check_out_date.is_some());

    assert_eq!(ctx.room_service.get_room(room.id).await?.status, RoomStatus::Available);
    assert!(ctx.room_service.current_assignment(student.id).await?.is_none());
    assert_eq!(ctx.room_service.assignment_history(student.id).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_approval_write_rechecks_room_gender() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Amani Wairimu", Gender::Female).await?;
    let block = common::block(&ctx, "Mvule", GenderDesignation::Male).await?;
    let room = common::room(&ctx, &block, "MV2").await?;

    let application = ctx.application_service
        .submit(&student, common::application_request(None))
        .await?;

    let result = ctx.application_repo
        .approve(ApprovalRecord {
            application_id: application.id,
            student_id: student.id,
            room_id: room.id,
            room_genders: GenderDesignation::admitting(student.gender),
            reviewer_id: admin.id,
            notes: DEFAULT_APPROVAL_NOTE.to_string(),
            check_in_date: Utc::now().date_naive(),
            notification: NewNotification::new(student.id, NotificationType::ApplicationStatus, "t", "c"),
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    assert_eq!(ctx.application_service.get(application.id).await?.status, ApplicationStatus::Pending);
    assert_eq!(ctx.room_service.get_room(room.id).await?.status, RoomStatus::Available);
    assert!(ctx.room_service.list_assignments(None).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_occupied_room_keeps_its_designation_and_cannot_be_deleted() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Baraka Otieno", Gender::Male).await?;
    let block = common::block(&ctx, "Mkuyu", GenderDesignation::Mixed).await?;
    let room = common::room(&ctx, &block, "MK1").await?;

    let application = ctx.application_service
        .submit(&student, common::application_request(None))
        .await?;
    let (_, assignment) = ctx.application_service
        .approve(&admin, application.id, ApproveApplicationRequest { room_id: room.id, notes: None })
        .await?;

    let regendered = ctx.room_service
        .update_room(room.id, UpdateRoomRequest {
            gender: Some(GenderDesignation::Female),
            ..Default::default()
        })
        .await;
    assert!(matches!(regendered, Err(AppError::Conflict(_))));

    let deleted = ctx.room_service.delete_room(room.id).await;
    assert!(matches!(deleted, Err(AppError::Conflict(_))));
    assert_eq!(ctx.room_service.get_room(room.id).await?.gender, GenderDesignation::Mixed);

    // Once the student leaves both are allowed again
    ctx.room_service.check_out(assignment.id).await?;
    let updated = ctx.room_service
        .update_room(room.id, UpdateRoomRequest {
            gender: Some(GenderDesignation::Female),
            ..Default::default()
        })
        .await?;
    assert_eq!(updated.gender, GenderDesignation::Female);

    Ok(())
}

#[tokio::test]
async fn test_only_pending_applications_can_be_edited() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let owner = common::student(&ctx, "Halima Juma", Gender::Female).await?;
    let other = common::student(&ctx, "Rehema Said", Gender::Female).await?;

    let application = ctx.application_service
        .submit(&owner, common::application_request(None))
        .await?;

    let edited = ctx.application_service
        .update_details(&owner, application.id, UpdateApplicationRequest {
            room_type: Some(RoomType::Double),
            special_requirements: Some("Ground floor please".to_string()),
            ..Default::default()
        })
        .await?;
    assert_eq!(edited.room_type, RoomType::Double);
    assert_eq!(edited.special_requirements.as_deref(), Some("Ground floor please"));

    let foreign = ctx.application_service
        .update_details(&other, application.id, UpdateApplicationRequest::default())
        .await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    ctx.application_service
        .deny(&admin, application.id, DenyApplicationRequest::default())
        .await?;

    let after_review = ctx.application_service
        .update_details(&owner, application.id, UpdateApplicationRequest {
            room_type: Some(RoomType::Single),
            ..Default::default()
        })
        .await;
    assert!(matches!(after_review, Err(AppError::Conflict(_))));
    assert_eq!(ctx.application_service.get(application.id).await?.room_type, RoomType::Double);

    Ok(())
}
