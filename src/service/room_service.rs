use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    integrations::{HousingEvent, IntegrationManager},
    repository::{AssignmentRepository, BlockRepository, RoomRepository},
};

/// Blocks, rooms and the assignments that occupy them.
pub struct RoomService {
    block_repo: Arc<dyn BlockRepository>,
    room_repo: Arc<dyn RoomRepository>,
    assignment_repo: Arc<dyn AssignmentRepository>,
    integration_manager: Arc<IntegrationManager>,
}

impl RoomService {
    pub fn new(
        block_repo: Arc<dyn BlockRepository>,
        room_repo: Arc<dyn RoomRepository>,
        assignment_repo: Arc<dyn AssignmentRepository>,
        integration_manager: Arc<IntegrationManager>,
    ) -> Self {
        Self {
            block_repo,
            room_repo,
            assignment_repo,
            integration_manager,
        }
    }

    pub async fn create_block(&self, request: CreateBlockRequest) -> Result<Block> {
        request.validate()?;

        if self.block_repo.find_by_name(&request.name).await?.is_some() {
            return Err(AppError::Conflict(format!("Block {} already exists", request.name.trim())));
        }

        let block = self.block_repo.create(request).await?;
        tracing::info!("Created block {} ({})", block.name, block.gender.as_str());
        Ok(block)
    }

    pub async fn list_blocks(&self, gender: Option<GenderDesignation>) -> Result<Vec<Block>> {
        let blocks = self.block_repo.list().await?;

        Ok(match gender {
            Some(gender) => blocks.into_iter().filter(|b| b.gender == gender).collect(),
            None => blocks,
        })
    }

    pub async fn get_block(&self, id: Uuid) -> Result<Block> {
        self.block_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Block not found".to_string()))
    }

    pub async fn update_block(&self, id: Uuid, request: UpdateBlockRequest) -> Result<Block> {
        request.validate()?;

        if let Some(name) = &request.name {
            if let Some(existing) = self.block_repo.find_by_name(name).await? {
                if existing.id != id {
                    return Err(AppError::Conflict(format!("Block {} already exists", name.trim())));
                }
            }
        }

        self.block_repo.update(id, request).await
    }

    pub async fn delete_block(&self, id: Uuid) -> Result<()> {
        let block = self.get_block(id).await?;

        if block.total_rooms > 0 {
            return Err(AppError::Conflict(format!(
                "Block {} still has {} rooms",
                block.name, block.total_rooms
            )));
        }

        self.block_repo.delete(id).await?;
        tracing::info!("Deleted block {}", block.name);
        Ok(())
    }

    /// Blocks an applicant of this gender may choose as a preference.
    pub async fn eligible_blocks(&self, gender: Gender) -> Result<Vec<Block>> {
        let blocks = self.block_repo.list().await?;
        Ok(filter_blocks_for_gender(blocks, gender))
    }

    pub async fn create_room(&self, request: CreateRoomRequest) -> Result<Room> {
        request.validate()?;

        let block = self.get_block(request.block_id).await?;

        if self
            .room_repo
            .find_by_number(block.id, &request.room_number)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Room {} already exists in {}",
                request.room_number.trim(),
                block.name
            )));
        }

        let room = self.room_repo.create(request).await?;
        tracing::info!("Created room {} in block {}", room.room_number, block.name);
        Ok(room)
    }

    pub async fn list_rooms(&self, filter: RoomFilter) -> Result<Vec<Room>> {
        self.room_repo.list(filter).await
    }

    pub async fn get_room(&self, id: Uuid) -> Result<Room> {
        self.room_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))
    }

    pub async fn update_room(&self, id: Uuid, request: UpdateRoomRequest) -> Result<Room> {
        request.validate()?;

        let room = self.get_room(id).await?;

        if let Some(number) = &request.room_number {
            if let Some(existing) = self.room_repo.find_by_number(room.block_id, number).await? {
                if existing.id != id {
                    return Err(AppError::Conflict(format!("Room {} already exists", number.trim())));
                }
            }
        }

        if let Some(status) = request.status {
            self.ensure_status_change_allowed(&room, status).await?;
        }

        if request.gender.is_some_and(|gender| gender != room.gender)
            && !self.assignment_repo.list_active_by_room(id).await?.is_empty()
        {
            return Err(AppError::Conflict(format!(
                "Room {} is occupied; its designation cannot change",
                room.room_number
            )));
        }

        self.room_repo.update(id, request).await
    }

    pub async fn set_room_status(&self, id: Uuid, status: RoomStatus) -> Result<Room> {
        let room = self.get_room(id).await?;
        self.ensure_status_change_allowed(&room, status).await?;
        self.room_repo.set_status(id, status).await
    }

    pub async fn delete_room(&self, id: Uuid) -> Result<()> {
        let room = self.get_room(id).await?;

        if !self.assignment_repo.list_active_by_room(id).await?.is_empty() {
            return Err(AppError::Conflict(format!(
                "Room {} has an active assignment",
                room.room_number
            )));
        }

        self.room_repo.delete(id).await
    }

    /// Available rooms the student may be placed in, matching the optional filters.
    pub async fn available_rooms_for(&self, student: &User, filter: RoomFilter) -> Result<Vec<Room>> {
        let gender = student.gender.ok_or_else(|| {
            AppError::BadRequest("Set your gender on your profile to see rooms".to_string())
        })?;

        let rooms = self
            .room_repo
            .list(RoomFilter {
                status: Some(RoomStatus::Available),
                ..filter
            })
            .await?;

        Ok(filter_rooms_for_gender(rooms, gender))
    }

    pub async fn list_assignments(&self, status: Option<AssignmentStatus>) -> Result<Vec<Assignment>> {
        self.assignment_repo.list(status).await
    }

    pub async fn get_assignment(&self, id: Uuid) -> Result<Assignment> {
        self.assignment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
    }

    pub async fn current_assignment(&self, student_id: Uuid) -> Result<Option<Assignment>> {
        self.assignment_repo.find_active_by_student(student_id).await
    }

    pub async fn assignment_history(&self, student_id: Uuid) -> Result<Vec<Assignment>> {
        self.assignment_repo.list_by_student(student_id).await
    }

    pub async fn check_out(&self, id: Uuid) -> Result<Assignment> {
        let assignment = self
            .assignment_repo
            .check_out(id, Utc::now().date_naive())
            .await?;

        tracing::info!(
            "Student {} checked out of room {}",
            assignment.student_id,
            assignment.room_id
        );

        self.integration_manager
            .handle_event(HousingEvent::StudentCheckedOut(assignment.clone()))
            .await;

        Ok(assignment)
    }

    // Occupancy is owned by approvals and check-outs.
    async fn ensure_status_change_allowed(&self, room: &Room, status: RoomStatus) -> Result<()> {
        if status == room.status {
            return Ok(());
        }

        let occupied = !self.assignment_repo.list_active_by_room(room.id).await?.is_empty();

        if occupied && status == RoomStatus::Available {
            return Err(AppError::Conflict(format!(
                "Room {} has an active assignment; check the student out first",
                room.room_number
            )));
        }

        if !occupied && status == RoomStatus::Occupied {
            return Err(AppError::BadRequest(
                "Rooms become occupied by approving an application".to_string(),
            ));
        }

        Ok(())
    }
}
