use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Serialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Assignment, UpdateProfileRequest, User},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub current_assignment: Option<Assignment>,
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ProfileResponse>> {
    let current_assignment = state.service_context.room_service
        .current_assignment(current.user.id)
        .await?;

    Ok(Json(ProfileResponse {
        user: current.user,
        current_assignment,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let user = state.service_context.user_service
        .update_profile(current.user.id, req)
        .await?;

    Ok(Json(user))
}
