use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Application, Block, SubmitApplicationRequest, UpdateApplicationRequest},
    error::{AppError, Result},
};

pub async fn submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<SubmitApplicationRequest>,
) -> Result<(StatusCode, Json<Application>)> {
    let application = state.service_context.application_service
        .submit(&current.user, req)
        .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Application>>> {
    let applications = state.service_context.application_service
        .list_for_student(current.user.id)
        .await?;

    Ok(Json(applications))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>> {
    let application = state.service_context.application_service
        .get_for_student(current.user.id, id)
        .await?;

    Ok(Json(application))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateApplicationRequest>,
) -> Result<Json<Application>> {
    let application = state.service_context.application_service
        .update_details(&current.user, id, req)
        .await?;

    Ok(Json(application))
}

pub async fn withdraw(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.application_service
        .withdraw(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Blocks whose gender designation admits the caller.
pub async fn eligible_blocks(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Block>>> {
    let gender = current.user.gender.ok_or_else(|| {
        AppError::BadRequest("Set your gender on your profile to see eligible blocks".to_string())
    })?;

    let blocks = state.service_context.room_service
        .eligible_blocks(gender)
        .await?;

    Ok(Json(blocks))
}
