use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Block, Room, RoomFilter},
    error::Result,
};

pub async fn available(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<Room>>> {
    let rooms = state.service_context.room_service
        .available_rooms_for(&current.user, filter)
        .await?;

    Ok(Json(rooms))
}

pub async fn list_blocks(
    State(state): State<AppState>,
) -> Result<Json<Vec<Block>>> {
    let blocks = state.service_context.room_service.list_blocks(None).await?;
    Ok(Json(blocks))
}

pub async fn get_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Block>> {
    let block = state.service_context.room_service.get_block(id).await?;
    Ok(Json(block))
}
