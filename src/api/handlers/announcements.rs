use axum::{
    extract::{Extension, State},
    Json,
};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Announcement,
    error::Result,
};

/// Published, unexpired announcements addressed to the caller's role.
pub async fn visible(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Announcement>>> {
    let announcements = state.service_context.announcement_service
        .visible_for(current.user.role)
        .await?;

    Ok(Json(announcements))
}
