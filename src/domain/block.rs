use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Gender;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: Uuid,
    pub name: String,
    pub gender: GenderDesignation,
    pub description: Option<String>,
    /// Derived from the rooms that belong to this block.
    pub total_rooms: i64,
    pub available_rooms: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which residents a block or room is designated for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenderDesignation {
    Male,
    Female,
    Mixed,
}

impl GenderDesignation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenderDesignation::Male => "male",
            GenderDesignation::Female => "female",
            GenderDesignation::Mixed => "mixed",
        }
    }

    /// Accepts "any" as a synonym for mixed.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(GenderDesignation::Male),
            "female" => Some(GenderDesignation::Female),
            "mixed" | "any" => Some(GenderDesignation::Mixed),
            _ => None,
        }
    }

    pub fn admits(&self, gender: Gender) -> bool {
        match self {
            GenderDesignation::Mixed => true,
            GenderDesignation::Male => gender == Gender::Male,
            GenderDesignation::Female => gender == Gender::Female,
        }
    }

    /// Designations that admit the given gender, or every designation when it is unknown.
    pub fn admitting(gender: Option<Gender>) -> Vec<GenderDesignation> {
        [GenderDesignation::Male, GenderDesignation::Female, GenderDesignation::Mixed]
            .into_iter()
            .filter(|designation| gender.map_or(true, |g| designation.admits(g)))
            .collect()
    }
}

/// Blocks an applicant of the given gender may list as a preference.
pub fn filter_blocks_for_gender(blocks: Vec<Block>, gender: Gender) -> Vec<Block> {
    blocks
        .into_iter()
        .filter(|block| block.gender.admits(gender))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBlockRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub gender: GenderDesignation,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateBlockRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    pub gender: Option<GenderDesignation>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(name: &str, gender: GenderDesignation) -> Block {
        Block {
            id: Uuid::new_v4(),
            name: name.to_string(),
            gender,
            description: None,
            total_rooms: 0,
            available_rooms: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_mixed_admits_everyone() {
        for gender in [Gender::Male, Gender::Female, Gender::Other] {
            assert!(GenderDesignation::Mixed.admits(gender));
        }
        assert!(GenderDesignation::Male.admits(Gender::Male));
        assert!(!GenderDesignation::Male.admits(Gender::Female));
        assert!(!GenderDesignation::Female.admits(Gender::Other));
    }

    #[test]
    fn test_female_applicant_sees_female_and_mixed_blocks() {
        let blocks = vec![
            block("Alpha", GenderDesignation::Male),
            block("Beta", GenderDesignation::Female),
            block("Gamma", GenderDesignation::Mixed),
        ];

        let visible = filter_blocks_for_gender(blocks, Gender::Female);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|b| b.gender != GenderDesignation::Male));
    }

    #[test]
    fn test_admitting_lists_matching_designations() {
        assert_eq!(
            GenderDesignation::admitting(Some(Gender::Female)),
            vec![GenderDesignation::Female, GenderDesignation::Mixed]
        );
        assert_eq!(GenderDesignation::admitting(Some(Gender::Other)), vec![GenderDesignation::Mixed]);
        assert_eq!(GenderDesignation::admitting(None).len(), 3);
    }

    #[test]
    fn test_designation_accepts_any_synonym() {
        assert_eq!(GenderDesignation::from_str("any"), Some(GenderDesignation::Mixed));
        assert_eq!(GenderDesignation::from_str("Female"), Some(GenderDesignation::Female));
        assert_eq!(GenderDesignation::from_str("unisex"), None);
    }
}
