use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Notification,
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    unread_only: bool,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedCount {
    pub marked: u64,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state.service_context.notification_service
        .list(current.user.id, params.unread_only, params.limit)
        .await?;

    Ok(Json(notifications))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UnreadCount>> {
    let unread = state.service_context.notification_service
        .unread_count(current.user.id)
        .await?;

    Ok(Json(UnreadCount { unread }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.notification_service
        .mark_read(current.user.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MarkedCount>> {
    let marked = state.service_context.notification_service
        .mark_all_read(current.user.id)
        .await?;

    Ok(Json(MarkedCount { marked }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.notification_service
        .delete(current.user.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
