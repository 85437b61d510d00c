use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{ConversationSummary, Message, SendMessageRequest},
    error::Result,
};

use super::notifications::UnreadCount;

pub async fn conversations(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ConversationSummary>>> {
    let summaries = state.service_context.message_service
        .conversations(current.user.id)
        .await?;

    Ok(Json(summaries))
}

/// Opening a conversation marks the caller's incoming messages in it as read.
pub async fn conversation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(other_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>> {
    let messages = state.service_context.message_service
        .conversation(current.user.id, other_id)
        .await?;

    Ok(Json(messages))
}

pub async fn send(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let message = state.service_context.message_service
        .send(&current.user, req)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UnreadCount>> {
    let unread = state.service_context.message_service
        .unread_count(current.user.id)
        .await?;

    Ok(Json(UnreadCount { unread }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.message_service
        .mark_read(current.user.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
