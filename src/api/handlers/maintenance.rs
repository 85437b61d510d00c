use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{MaintenanceRequest, SubmitMaintenanceRequest},
    error::Result,
};

pub async fn submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<SubmitMaintenanceRequest>,
) -> Result<(StatusCode, Json<MaintenanceRequest>)> {
    let request = state.service_context.maintenance_service
        .submit(&current.user, req)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<MaintenanceRequest>>> {
    let requests = state.service_context.maintenance_service
        .list_for_student(current.user.id)
        .await?;

    Ok(Json(requests))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceRequest>> {
    let request = state.service_context.maintenance_service
        .get_for_student(current.user.id, id)
        .await?;

    Ok(Json(request))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceRequest>> {
    let request = state.service_context.maintenance_service
        .cancel(&current.user, id)
        .await?;

    Ok(Json(request))
}
