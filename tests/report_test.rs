mod common;

use chrono::{Duration, Utc};
use residence::{
    domain::*,
    service::{report_export, ReportKind, ReportQuery, ReportValue},
};

async fn populated() -> anyhow::Result<std::sync::Arc<residence::service::ServiceContext>> {
    let ctx = common::test_context().await?;
    let admin = common::admin(&ctx).await?;
    let placed = common::student(&ctx, "Chidi Okafor", Gender::Male).await?;
    let waiting = common::student(&ctx, "Adaeze Eze", Gender::Female).await?;

    let block = ctx.room_service.create_block(CreateBlockRequest {
        name: "Niger, \"East\" Wing".to_string(),
        gender: GenderDesignation::Mixed,
        description: None,
    }).await?;
    let room = common::room(&ctx, &block, "N1").await?;
    common::room(&ctx, &block, "N2").await?;

    let application = ctx.application_service.submit(&placed, common::application_request(Some(block.id))).await?;
    ctx.application_service
        .approve(&admin, application.id, ApproveApplicationRequest { room_id: room.id, notes: None })
        .await?;

    let denied = ctx.application_service.submit(&waiting, common::application_request(None)).await?;
    ctx.application_service.deny(&admin, denied.id, DenyApplicationRequest::default()).await?;

    ctx.maintenance_service.submit(&placed, SubmitMaintenanceRequest {
        room_id: None,
        title: "Light out".to_string(),
        category: MaintenanceCategory::Electrical,
        description: "Ceiling light, flickers then dies".to_string(),
        priority: MaintenancePriority::Medium,
    }).await?;

    Ok(ctx)
}

#[tokio::test]
async fn test_occupancy_report_from_live_data() -> anyhow::Result<()> {
    let ctx = populated().await?;

    let report = ctx.report_service.generate(ReportKind::Occupancy, &ReportQuery::default()).await?;
    assert_eq!(report.columns.len(), ReportKind::Occupancy.columns().len());
    assert_eq!(report.rows.len(), 2);

    let records = report.records();
    let n1 = records.iter().find(|r| r["roomNumber"] == "N1").expect("N1 listed");
    assert_eq!(n1["occupied"], 1);
    assert_eq!(n1["occupants"], "1/1");
    assert_eq!(n1["status"], "occupied");
    assert_eq!(n1["amenities"], "Desk, WiFi");

    Ok(())
}

#[tokio::test]
async fn test_columns_are_selected_in_requested_order() -> anyhow::Result<()> {
    let ctx = populated().await?;

    let query = ReportQuery {
        columns: vec!["status".to_string(), "studentName".to_string(), "unknown".to_string(), "reason".to_string()],
        ..Default::default()
    };
    let report = ctx.report_service.generate(ReportKind::Applications, &query).await?;

    assert_eq!(report.columns, vec!["status", "studentName", "reason"]);

    let denied = report.rows.iter()
        .find(|row| row[0] == ReportValue::Text("denied".to_string()))
        .expect("denied application listed");
    assert_eq!(denied[1], ReportValue::Text("Adaeze Eze".to_string()));
    assert_eq!(denied[2], ReportValue::Text(DEFAULT_DENIAL_REASON.to_string()));

    let approved = report.rows.iter()
        .find(|row| row[0] == ReportValue::Text("approved".to_string()))
        .expect("approved application listed");
    assert_eq!(approved[2], ReportValue::Text("N/A".to_string()));

    Ok(())
}

#[tokio::test]
async fn test_date_range_filters_dated_reports() -> anyhow::Result<()> {
    let ctx = populated().await?;
    let today = Utc::now().date_naive();

    let future = ReportQuery {
        start: Some(today + Duration::days(1)),
        ..Default::default()
    };
    assert!(ctx.report_service.generate(ReportKind::Maintenance, &future).await?.is_empty());
    assert!(ctx.report_service.generate(ReportKind::Applications, &future).await?.is_empty());

    let covering = ReportQuery {
        start: Some(today),
        end: Some(today),
        ..Default::default()
    };
    assert_eq!(ctx.report_service.generate(ReportKind::Maintenance, &covering).await?.rows.len(), 1);

    // Undated reports ignore the range
    assert_eq!(ctx.report_service.generate(ReportKind::Blocks, &future).await?.rows.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_blocks_and_students_reports() -> anyhow::Result<()> {
    let ctx = populated().await?;

    let blocks = ctx.report_service.generate(ReportKind::Blocks, &ReportQuery::default()).await?;
    let record = &blocks.records()[0];
    assert_eq!(record["totalRooms"], 2);
    assert_eq!(record["availableRooms"], 1);
    assert_eq!(record["occupancyRate"], 50);
    assert_eq!(record["maintenanceIssues"], 1);
    assert_eq!(record["description"], "No description");

    let students = ctx.report_service.generate(ReportKind::Students, &ReportQuery::default()).await?;
    let records = students.records();
    let chidi = records.iter().find(|r| r["name"] == "Chidi Okafor").expect("listed");
    assert_eq!(chidi["room"], "N1");
    assert_eq!(chidi["hasMaintenance"], "Yes");
    assert_eq!(chidi["applicationStatus"], "approved");

    let adaeze = records.iter().find(|r| r["name"] == "Adaeze Eze").expect("listed");
    assert_eq!(adaeze["block"], "Not assigned");
    assert_eq!(adaeze["hasMaintenance"], "No");

    Ok(())
}

#[tokio::test]
async fn test_csv_round_trip_preserves_values() -> anyhow::Result<()> {
    let ctx = populated().await?;

    for kind in ReportKind::ALL {
        let report = ctx.report_service.generate(kind, &ReportQuery::default()).await?;
        let parsed = report_export::parse_csv(&report_export::to_csv(&report));

        assert_eq!(parsed.len(), report.rows.len() + 1, "{} row count", kind.as_str());
        assert_eq!(parsed[0], report.columns);

        for (row, values) in report.rows.iter().zip(parsed.iter().skip(1)) {
            let expected: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            assert_eq!(&expected, values);
        }
    }

    Ok(())
}
