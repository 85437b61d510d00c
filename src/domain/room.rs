use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Gender, GenderDesignation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub block_id: Uuid,
    pub room_number: String,
    pub floor: i32,
    pub capacity: i32,
    pub room_type: RoomType,
    pub gender: GenderDesignation,
    pub status: RoomStatus,
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Single,
    Double,
    Accessible,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
            RoomType::Accessible => "accessible",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" => Some(RoomType::Single),
            "double" => Some(RoomType::Double),
            "accessible" => Some(RoomType::Accessible),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Maintenance => "maintenance",
            RoomStatus::Reserved => "reserved",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(RoomStatus::Available),
            "occupied" => Some(RoomStatus::Occupied),
            "maintenance" => Some(RoomStatus::Maintenance),
            "reserved" => Some(RoomStatus::Reserved),
            _ => None,
        }
    }
}

/// Rooms whose designation admits the applicant's gender.
pub fn filter_rooms_for_gender(rooms: Vec<Room>, gender: Gender) -> Vec<Room> {
    rooms
        .into_iter()
        .filter(|room| room.gender.admits(gender))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoomRequest {
    pub block_id: Uuid,
    #[validate(length(min = 1, max = 16))]
    pub room_number: String,
    #[validate(range(min = 0, max = 50))]
    pub floor: i32,
    #[validate(range(min = 1, max = 8))]
    pub capacity: i32,
    pub room_type: RoomType,
    pub gender: GenderDesignation,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 16))]
    pub room_number: Option<String>,
    #[validate(range(min = 0, max = 50))]
    pub floor: Option<i32>,
    #[validate(range(min = 1, max = 8))]
    pub capacity: Option<i32>,
    pub room_type: Option<RoomType>,
    pub gender: Option<GenderDesignation>,
    pub status: Option<RoomStatus>,
    pub amenities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomFilter {
    pub block_id: Option<Uuid>,
    pub status: Option<RoomStatus>,
    pub gender: Option<GenderDesignation>,
    pub room_type: Option<RoomType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(number: &str, gender: GenderDesignation) -> Room {
        Room {
            id: Uuid::new_v4(),
            block_id: Uuid::new_v4(),
            room_number: number.to_string(),
            floor: 1,
            capacity: 1,
            room_type: RoomType::Single,
            gender,
            status: RoomStatus::Available,
            amenities: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_room_filter_excludes_other_gender() {
        let rooms = vec![
            room("A101", GenderDesignation::Male),
            room("B201", GenderDesignation::Female),
            room("C301", GenderDesignation::Mixed),
            room("B202", GenderDesignation::Female),
        ];

        let visible = filter_rooms_for_gender(rooms, Gender::Male);
        let numbers: Vec<_> = visible.iter().map(|r| r.room_number.as_str()).collect();
        assert_eq!(numbers, vec!["A101", "C301"]);
    }

    #[test]
    fn test_room_status_text() {
        assert_eq!(RoomStatus::from_str("occupied"), Some(RoomStatus::Occupied));
        assert_eq!(RoomStatus::Maintenance.as_str(), "maintenance");
        assert_eq!(RoomStatus::from_str("full"), None);
    }
}
