use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::*,
    error::Result,
    service::{
        application_service::ApplicationDetail,
        user_service::StudentDetail,
    },
};

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub application: Application,
    pub assignment: Assignment,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentParams {
    status: Option<AssignmentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RoomStatusRequest {
    pub status: RoomStatus,
}

#[derive(Debug, Deserialize)]
pub struct BlockParams {
    gender: Option<GenderDesignation>,
}

#[derive(Debug, Deserialize)]
pub struct StudentParams {
    search: Option<String>,
    #[serde(default)]
    include_inactive: bool,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct RoomStats {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub maintenance: usize,
    pub reserved: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub students: i64,
    pub applications: ApplicationCounts,
    pub rooms: RoomStats,
    pub active_assignments: usize,
    pub open_maintenance_requests: usize,
    pub published_announcements: usize,
}

// Applications

pub async fn list_applications(
    State(state): State<AppState>,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<Application>>> {
    let applications = state.service_context.application_service.list(filter).await?;
    Ok(Json(applications))
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationDetail>> {
    let detail = state.service_context.application_service.detail(id).await?;
    Ok(Json(detail))
}

pub async fn application_counts(
    State(state): State<AppState>,
) -> Result<Json<ApplicationCounts>> {
    let counts = state.service_context.application_service.counts().await?;
    Ok(Json(counts))
}

pub async fn approve_application(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApproveApplicationRequest>,
) -> Result<Json<ApprovalResponse>> {
    let (application, assignment) = state.service_context.application_service
        .approve(&current.user, id, req)
        .await?;

    Ok(Json(ApprovalResponse { application, assignment }))
}

/// The body is optional; an empty reason falls back to the default denial text.
pub async fn deny_application(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    req: Option<Json<DenyApplicationRequest>>,
) -> Result<Json<Application>> {
    let req = req.map(|Json(req)| req).unwrap_or_default();

    let application = state.service_context.application_service
        .deny(&current.user, id, req)
        .await?;

    Ok(Json(application))
}

// Blocks

pub async fn list_blocks(
    State(state): State<AppState>,
    Query(params): Query<BlockParams>,
) -> Result<Json<Vec<Block>>> {
    let blocks = state.service_context.room_service.list_blocks(params.gender).await?;
    Ok(Json(blocks))
}

pub async fn create_block(
    State(state): State<AppState>,
    Json(req): Json<CreateBlockRequest>,
) -> Result<(StatusCode, Json<Block>)> {
    let block = state.service_context.room_service.create_block(req).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn get_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Block>> {
    let block = state.service_context.room_service.get_block(id).await?;
    Ok(Json(block))
}

pub async fn update_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBlockRequest>,
) -> Result<Json<Block>> {
    let block = state.service_context.room_service.update_block(id, req).await?;
    Ok(Json(block))
}

pub async fn delete_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.room_service.delete_block(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Rooms

pub async fn list_rooms(
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<Room>>> {
    let rooms = state.service_context.room_service.list_rooms(filter).await?;
    Ok(Json(rooms))
}

pub async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>)> {
    let room = state.service_context.room_service.create_room(req).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Room>> {
    let room = state.service_context.room_service.get_room(id).await?;
    Ok(Json(room))
}

pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoomRequest>,
) -> Result<Json<Room>> {
    let room = state.service_context.room_service.update_room(id, req).await?;
    Ok(Json(room))
}

pub async fn set_room_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RoomStatusRequest>,
) -> Result<Json<Room>> {
    let room = state.service_context.room_service.set_room_status(id, req.status).await?;
    Ok(Json(room))
}

pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.room_service.delete_room(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Assignments

pub async fn list_assignments(
    State(state): State<AppState>,
    Query(params): Query<AssignmentParams>,
) -> Result<Json<Vec<Assignment>>> {
    let assignments = state.service_context.room_service
        .list_assignments(params.status)
        .await?;

    Ok(Json(assignments))
}

pub async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Assignment>> {
    let assignment = state.service_context.room_service.get_assignment(id).await?;
    Ok(Json(assignment))
}

pub async fn check_out(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Assignment>> {
    let assignment = state.service_context.room_service.check_out(id).await?;
    Ok(Json(assignment))
}

// Maintenance

pub async fn list_maintenance(
    State(state): State<AppState>,
    Query(filter): Query<MaintenanceFilter>,
) -> Result<Json<Vec<MaintenanceRequest>>> {
    let requests = state.service_context.maintenance_service.list(filter).await?;
    Ok(Json(requests))
}

pub async fn get_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceRequest>> {
    let request = state.service_context.maintenance_service.get(id).await?;
    Ok(Json(request))
}

pub async fn update_maintenance_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMaintenanceStatusRequest>,
) -> Result<Json<MaintenanceRequest>> {
    let request = state.service_context.maintenance_service
        .update_status(&current.user, id, req)
        .await?;

    Ok(Json(request))
}

pub async fn delete_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.maintenance_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Announcements

pub async fn list_announcements(
    State(state): State<AppState>,
    Query(filter): Query<AnnouncementFilter>,
) -> Result<Json<Vec<Announcement>>> {
    let announcements = state.service_context.announcement_service.list(filter).await?;
    Ok(Json(announcements))
}

pub async fn create_announcement(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>)> {
    let announcement = state.service_context.announcement_service
        .create(&current.user, req)
        .await?;

    Ok((StatusCode::CREATED, Json(announcement)))
}

pub async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Announcement>> {
    let announcement = state.service_context.announcement_service.get(id).await?;
    Ok(Json(announcement))
}

pub async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAnnouncementRequest>,
) -> Result<Json<Announcement>> {
    let announcement = state.service_context.announcement_service.update(id, req).await?;
    Ok(Json(announcement))
}

pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.announcement_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Announcement>> {
    let announcement = state.service_context.announcement_service.publish(id).await?;
    Ok(Json(announcement))
}

pub async fn archive_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Announcement>> {
    let announcement = state.service_context.announcement_service.archive(id).await?;
    Ok(Json(announcement))
}

// Students

pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<StudentParams>,
) -> Result<Json<Vec<User>>> {
    let students = state.service_context.user_service
        .list_students(params.search, params.include_inactive, params.limit, params.offset)
        .await?;

    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentDetail>> {
    let detail = state.service_context.user_service.student_detail(id).await?;
    Ok(Json(detail))
}

pub async fn deactivate_student(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>> {
    let user = state.service_context.user_service.deactivate(&current.user, id).await?;
    Ok(Json(user))
}

pub async fn reactivate_student(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>> {
    let user = state.service_context.user_service.reactivate(&current.user, id).await?;
    Ok(Json(user))
}

pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    let ctx = &state.service_context;

    let students = ctx.user_service.count_students().await?;
    let applications = ctx.application_service.counts().await?;
    let rooms = ctx.room_service.list_rooms(RoomFilter::default()).await?;
    let active_assignments = ctx.room_service
        .list_assignments(Some(AssignmentStatus::Active))
        .await?
        .len();
    let open_maintenance_requests = ctx.maintenance_service
        .list(MaintenanceFilter::default())
        .await?
        .iter()
        .filter(|request| request.status.is_open())
        .count();
    let published_announcements = ctx.announcement_service
        .list(AnnouncementFilter {
            status: Some(AnnouncementStatus::Published),
            ..Default::default()
        })
        .await?
        .len();

    let count = |status: RoomStatus| rooms.iter().filter(|room| room.status == status).count();

    Ok(Json(DashboardStats {
        students,
        applications,
        rooms: RoomStats {
            total: rooms.len(),
            available: count(RoomStatus::Available),
            occupied: count(RoomStatus::Occupied),
            maintenance: count(RoomStatus::Maintenance),
            reserved: count(RoomStatus::Reserved),
        },
        active_assignments,
        open_maintenance_requests,
        published_announcements,
    }))
}
