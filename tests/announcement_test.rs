mod common;

use chrono::{Duration, Utc};
use residence::domain::*;

fn announcement(title: &str, audience: TargetAudience, priority: AnnouncementPriority, publish_now: bool) -> CreateAnnouncementRequest {
    CreateAnnouncementRequest {
        title: title.to_string(),
        content: format!("{} details", title),
        announcement_type: AnnouncementType::General,
        priority,
        target_audience: audience,
        expires_at: None,
        publish_now,
    }
}

#[tokio::test]
async fn test_publish_notifies_the_audience() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let s1 = common::student(&ctx, "Halima Yusuf", Gender::Female).await?;
    let s2 = common::student(&ctx, "Juma Said", Gender::Male).await?;
    let inactive = common::student(&ctx, "Baraka Otieno", Gender::Male).await?;
    ctx.user_service.deactivate(&admin, inactive.id).await?;

    let draft = ctx.announcement_service
        .create(&admin, announcement("Water shutdown", TargetAudience::Students, AnnouncementPriority::High, false))
        .await?;
    assert_eq!(draft.status, AnnouncementStatus::Draft);
    assert!(ctx.announcement_service.visible_for(UserRole::Student).await?.is_empty());

    let published = ctx.announcement_service.publish(draft.id).await?;
    assert_eq!(published.status, AnnouncementStatus::Published);
    assert!(published.published_at.is_some());

    for student in [&s1, &s2] {
        let notifications = ctx.notification_service.list(student.id, true, None).await?;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "New Announcement");
        assert_eq!(notifications[0].content, "Water shutdown");
    }
    assert_eq!(ctx.notification_service.unread_count(admin.id).await?, 0);
    assert_eq!(ctx.notification_service.unread_count(inactive.id).await?, 0);

    assert!(ctx.announcement_service.publish(draft.id).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_visibility_by_role_priority_and_expiry() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;

    ctx.announcement_service
        .create(&admin, announcement("Fire drill", TargetAudience::All, AnnouncementPriority::Low, true))
        .await?;
    ctx.announcement_service
        .create(&admin, announcement("Rent due", TargetAudience::Students, AnnouncementPriority::High, true))
        .await?;
    ctx.announcement_service
        .create(&admin, announcement("Staff meeting", TargetAudience::Admins, AnnouncementPriority::Medium, true))
        .await?;

    let mut expired = announcement("Old news", TargetAudience::All, AnnouncementPriority::High, true);
    expired.expires_at = Some(Utc::now() - Duration::hours(1));
    ctx.announcement_service.create(&admin, expired).await?;

    let for_students: Vec<String> = ctx.announcement_service
        .visible_for(UserRole::Student)
        .await?
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(for_students, vec!["Rent due".to_string(), "Fire drill".to_string()]);

    let for_admins: Vec<String> = ctx.announcement_service
        .visible_for(UserRole::Admin)
        .await?
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(for_admins, vec!["Staff meeting".to_string(), "Fire drill".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_archive_hides_announcement() -> anyhow::Result<()> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;

    let published = ctx.announcement_service
        .create(&admin, announcement("Laundry hours", TargetAudience::All, AnnouncementPriority::Medium, true))
        .await?;
    assert_eq!(ctx.announcement_service.visible_for(UserRole::Student).await?.len(), 1);

    let archived = ctx.announcement_service.archive(published.id).await?;
    assert_eq!(archived.status, AnnouncementStatus::Archived);
    assert!(ctx.announcement_service.visible_for(UserRole::Student).await?.is_empty());

    Ok(())
}
