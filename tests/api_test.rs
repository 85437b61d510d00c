mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use residence::{api, config::Settings, domain::*};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> anyhow::Result<(Router, Arc<residence::service::ServiceContext>)> {
    let ctx = common::test_context().await?;
    let router = api::create_app(ctx.clone(), Arc::new(Settings::default()));
    Ok((router, ctx))
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Logs in and returns the `session=...` pair to send back as a cookie.
async fn login(app: &Router, email: &str) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/login", None, json!({
            "email": email,
            "password": common::PASSWORD,
        })))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| anyhow::anyhow!("no session cookie"))?;

    Ok(set_cookie.split(';').next().unwrap_or_default().to_string())
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let (app, _) = app().await?;

    let response = app.oneshot(get("/health", None)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["status"], "healthy");

    Ok(())
}

#[tokio::test]
async fn test_protected_routes_require_session() -> anyhow::Result<()> {
    let (app, _) = app().await?;

    let response = app.clone().oneshot(get("/api/profile", None)).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.oneshot(get("/admin/stats", Some("session=forged"))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_register_login_and_me() -> anyhow::Result<()> {
    let (app, _) = app().await?;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/register", None, json!({
            "email": "esi@students.test",
            "password": common::PASSWORD,
            "full_name": "Esi Mensah",
            "gender": "female",
            "student_number": "S900",
        })))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let short = app
        .clone()
        .oneshot(json_request("POST", "/auth/register", None, json!({
            "email": "kojo@students.test",
            "password": "short",
            "full_name": "Kojo",
        })))
        .await?;
    assert_eq!(short.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let cookie = login(&app, "esi@students.test").await?;

    let response = app.clone().oneshot(get("/auth/me", Some(&cookie))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await?;
    assert_eq!(me["role"], "student");
    assert_eq!(me["full_name"], "Esi Mensah");

    let response = app.clone().oneshot(get("/admin/stats", Some(&cookie))).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/logout", Some(&cookie), json!({})))
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/auth/me", Some(&cookie))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    common::student(&ctx, "Abena Poku", Gender::Female).await?;

    let response = app
        .oneshot(json_request("POST", "/auth/login", None, json!({
            "email": "abena.poku@students.test",
            "password": "not-the-password",
        })))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_deactivated_student_is_locked_out() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Yaw Boateng", Gender::Male).await?;

    let cookie = login(&app, &student.email).await?;
    let response = app.clone().oneshot(get("/api/profile", Some(&cookie))).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let deactivated = ctx.user_service.deactivate(&admin, student.id).await?;
    assert!(!deactivated.is_active);

    // The session issued before deactivation no longer works
    let response = app.clone().oneshot(get("/api/profile", Some(&cookie))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/login", None, json!({
            "email": student.email,
            "password": common::PASSWORD,
        })))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.user_service.reactivate(&admin, student.id).await?;
    login(&app, &student.email).await?;

    Ok(())
}

#[tokio::test]
async fn test_admin_review_over_http() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Kojo Antwi", Gender::Male).await?;
    let application = ctx.application_service
        .submit(&student, common::application_request(None))
        .await?;

    let cookie = login(&app, &admin.email).await?;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/admin/blocks", Some(&cookie), json!({
            "name": "Osu",
            "gender": "mixed",
        })))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let block = body_json(response).await?;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/admin/rooms", Some(&cookie), json!({
            "block_id": block["id"],
            "room_number": "O1",
            "floor": 0,
            "capacity": 1,
            "room_type": "single",
            "gender": "mixed",
        })))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let room = body_json(response).await?;

    let response = app
        .clone()
        .oneshot(get(&format!("/admin/applications/{}", application.id), Some(&cookie)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await?;
    assert_eq!(detail["status"], "pending");
    assert_eq!(detail["available_actions"], json!(["approve", "deny"]));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/admin/applications/{}/approve", application.id),
            Some(&cookie),
            json!({ "room_id": room["id"] }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let approval = body_json(response).await?;
    assert_eq!(approval["application"]["status"], "approved");
    assert_eq!(approval["assignment"]["room_id"], room["id"]);

    let response = app
        .clone()
        .oneshot(get("/admin/applications/counts", Some(&cookie)))
        .await?;
    assert_eq!(body_json(response).await?["approved"], 1);

    let response = app.oneshot(get("/admin/stats", Some(&cookie))).await?;
    let stats = body_json(response).await?;
    assert_eq!(stats["rooms"]["occupied"], 1);
    assert_eq!(stats["active_assignments"], 1);

    Ok(())
}

#[tokio::test]
async fn test_deny_accepts_empty_body() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let admin = common::admin(&ctx).await?;
    let student = common::student(&ctx, "Efua Sarpong", Gender::Female).await?;
    let application = ctx.application_service
        .submit(&student, common::application_request(None))
        .await?;

    let cookie = login(&app, &admin.email).await?;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/admin/applications/{}/deny", application.id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let denied = body_json(response).await?;
    assert_eq!(denied["status"], "denied");
    assert_eq!(denied["admin_notes"], DEFAULT_DENIAL_REASON);

    Ok(())
}

#[tokio::test]
async fn test_report_downloads() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let admin = common::admin(&ctx).await?;
    let block = common::block(&ctx, "Labadi", GenderDesignation::Mixed).await?;
    common::room(&ctx, &block, "L1").await?;

    let cookie = login(&app, &admin.email).await?;

    let response = app
        .clone()
        .oneshot(get("/admin/reports/occupancy?format=csv&columns=roomNumber,capacity", Some(&cookie)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str()?.to_string();
    assert!(disposition.starts_with("attachment; filename=\"occupancy-report-"));
    assert!(response.headers()[header::CONTENT_TYPE].to_str()?.starts_with("text/csv"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(std::str::from_utf8(&bytes)?, "roomNumber,capacity\n\"L1\",1");

    let response = app
        .clone()
        .oneshot(get("/admin/reports/blocks", Some(&cookie)))
        .await?;
    let report = body_json(response).await?;
    assert_eq!(report["rows"][0]["name"], "Labadi");

    let response = app
        .clone()
        .oneshot(get("/admin/reports/payroll", Some(&cookie)))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get("/admin/reports/blocks?format=pdf", Some(&cookie)))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
