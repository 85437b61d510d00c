use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::*,
    error::Result,
    repository::{
        ApplicationRepository, AssignmentRepository, BlockRepository, MaintenanceRepository,
        RoomRepository, UserRepository,
    },
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Occupancy,
    Applications,
    Maintenance,
    Blocks,
    Students,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Occupancy,
        ReportKind::Applications,
        ReportKind::Maintenance,
        ReportKind::Blocks,
        ReportKind::Students,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Occupancy => "occupancy",
            ReportKind::Applications => "applications",
            ReportKind::Maintenance => "maintenance",
            ReportKind::Blocks => "blocks",
            ReportKind::Students => "students",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "occupancy" => Some(ReportKind::Occupancy),
            "applications" => Some(ReportKind::Applications),
            "maintenance" => Some(ReportKind::Maintenance),
            "blocks" => Some(ReportKind::Blocks),
            "students" => Some(ReportKind::Students),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Occupancy => "Room Occupancy Report",
            ReportKind::Applications => "Applications Report",
            ReportKind::Maintenance => "Maintenance Requests Report",
            ReportKind::Blocks => "Blocks Report",
            ReportKind::Students => "Students Report",
        }
    }

    /// Every column this report can produce, in default order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReportKind::Occupancy => &[
                "block", "roomNumber", "type", "capacity", "occupied", "status", "floor",
                "occupants", "amenities",
            ],
            ReportKind::Applications => &[
                "studentName", "studentId", "blockPreference", "roomType", "applicationDate",
                "status", "assignedRoom", "semester", "academicYear", "email", "reason",
            ],
            ReportKind::Maintenance => &[
                "issueType", "description", "block", "roomNumber", "reportedBy", "dateReported",
                "status", "priority", "completedDate", "title",
            ],
            ReportKind::Blocks => &[
                "name", "totalRooms", "availableRooms", "occupancyRate", "gender",
                "maintenanceIssues", "description",
            ],
            ReportKind::Students => &[
                "name", "id", "email", "block", "room", "hasApplication", "hasMaintenance",
                "applicationStatus", "createdAt",
            ],
        }
    }

    /// Whether the start/end range applies to this report.
    pub fn is_dated(&self) -> bool {
        matches!(self, ReportKind::Applications | ReportKind::Maintenance)
    }

    /// Known columns in the order requested; an empty request selects all.
    pub fn select_columns(&self, requested: &[String]) -> Vec<&'static str> {
        let available = self.columns();
        let mut selected: Vec<&'static str> = Vec::new();

        for name in requested {
            if let Some(column) = available.iter().find(|c| **c == name.trim()) {
                if !selected.contains(column) {
                    selected.push(column);
                }
            }
        }

        if selected.is_empty() {
            available.to_vec()
        } else {
            selected
        }
    }
}

/// A single report cell. Numbers stay unquoted when exported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Text(String),
    Number(i64),
}

impl From<&str> for ReportValue {
    fn from(value: &str) -> Self {
        ReportValue::Text(value.to_string())
    }
}

impl From<String> for ReportValue {
    fn from(value: String) -> Self {
        ReportValue::Text(value)
    }
}

impl From<i64> for ReportValue {
    fn from(value: i64) -> Self {
        ReportValue::Number(value)
    }
}

impl From<i32> for ReportValue {
    fn from(value: i32) -> Self {
        ReportValue::Number(value as i64)
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Text(text) => f.write_str(text),
            ReportValue::Number(number) => write!(f, "{}", number),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub columns: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ReportValue>>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as JSON objects keyed by column name, preserving column order.
    pub fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|value| match value {
                        ReportValue::Text(text) => serde_json::Value::from(text.clone()),
                        ReportValue::Number(number) => serde_json::Value::from(*number),
                    }))
                    .collect()
            })
            .collect()
    }
}

type RowData = Vec<(&'static str, ReportValue)>;

fn project(row: &RowData, columns: &[&'static str]) -> Vec<ReportValue> {
    columns
        .iter()
        .map(|column| {
            row.iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| ReportValue::Text(String::new()))
        })
        .collect()
}

fn date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

fn yes_no(flag: bool) -> ReportValue {
    if flag { "Yes".into() } else { "No".into() }
}

/// Builds administrative reports from the live database.
pub struct ReportService {
    user_repo: Arc<dyn UserRepository>,
    block_repo: Arc<dyn BlockRepository>,
    room_repo: Arc<dyn RoomRepository>,
    application_repo: Arc<dyn ApplicationRepository>,
    assignment_repo: Arc<dyn AssignmentRepository>,
    maintenance_repo: Arc<dyn MaintenanceRepository>,
}

impl ReportService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        block_repo: Arc<dyn BlockRepository>,
        room_repo: Arc<dyn RoomRepository>,
        application_repo: Arc<dyn ApplicationRepository>,
        assignment_repo: Arc<dyn AssignmentRepository>,
        maintenance_repo: Arc<dyn MaintenanceRepository>,
    ) -> Self {
        Self {
            user_repo,
            block_repo,
            room_repo,
            application_repo,
            assignment_repo,
            maintenance_repo,
        }
    }

    pub async fn generate(&self, kind: ReportKind, query: &ReportQuery) -> Result<Report> {
        let columns = kind.select_columns(&query.columns);

        let rows = match kind {
            ReportKind::Occupancy => self.occupancy_rows().await?,
            ReportKind::Applications => self.application_rows(query.start, query.end).await?,
            ReportKind::Maintenance => self.maintenance_rows(query.start, query.end).await?,
            ReportKind::Blocks => self.block_rows().await?,
            ReportKind::Students => self.student_rows().await?,
        };

        tracing::debug!("Generated {} report with {} rows", kind.as_str(), rows.len());

        Ok(Report {
            kind,
            title: kind.title().to_string(),
            generated_at: Utc::now(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows.iter().map(|row| project(row, &columns)).collect(),
        })
    }

    async fn block_names(&self) -> Result<HashMap<Uuid, Block>> {
        Ok(self
            .block_repo
            .list()
            .await?
            .into_iter()
            .map(|block| (block.id, block))
            .collect())
    }

    async fn rooms_by_id(&self) -> Result<HashMap<Uuid, Room>> {
        Ok(self
            .room_repo
            .list(RoomFilter::default())
            .await?
            .into_iter()
            .map(|room| (room.id, room))
            .collect())
    }

    async fn users_by_id(&self) -> Result<HashMap<Uuid, User>> {
        let filter = UserFilter {
            include_inactive: true,
            ..Default::default()
        };
        Ok(self
            .user_repo
            .list(filter, i64::MAX, 0)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect())
    }

    async fn occupancy_rows(&self) -> Result<Vec<RowData>> {
        let blocks = self.block_names().await?;
        let rooms = self.room_repo.list(RoomFilter::default()).await?;
        let active = self.assignment_repo.list(Some(AssignmentStatus::Active)).await?;

        Ok(rooms
            .into_iter()
            .map(|room| -> RowData {
                let occupied = active.iter().filter(|a| a.room_id == room.id).count() as i64;
                let block = blocks
                    .get(&room.block_id)
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string());

                vec![
                    ("block", block.into()),
                    ("roomNumber", room.room_number.clone().into()),
                    ("type", room.room_type.as_str().into()),
                    ("capacity", room.capacity.into()),
                    ("occupied", occupied.into()),
                    ("status", room.status.as_str().into()),
                    ("floor", room.floor.into()),
                    ("occupants", format!("{}/{}", occupied, room.capacity).into()),
                    ("amenities", room.amenities.join(", ").into()),
                ]
            })
            .collect())
    }

    async fn application_rows(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Vec<RowData>> {
        let applications = self
            .application_repo
            .list(ApplicationFilter {
                created_from: start,
                created_to: end,
                ..Default::default()
            })
            .await?;
        let users = self.users_by_id().await?;
        let blocks = self.block_names().await?;
        let rooms = self.rooms_by_id().await?;
        let assignments = self.assignment_repo.list(None).await?;

        Ok(applications
            .into_iter()
            .map(|app| -> RowData {
                let student = users.get(&app.student_id);
                let block_preference = app
                    .preferred_block_id
                    .and_then(|id| blocks.get(&id))
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| "Any".to_string());
                let assigned_room = assignments
                    .iter()
                    .find(|a| a.application_id == app.id)
                    .and_then(|a| rooms.get(&a.room_id))
                    .map(|r| r.room_number.clone())
                    .unwrap_or_else(|| "Not assigned".to_string());
                let reason = if app.status == ApplicationStatus::Denied {
                    app.admin_notes
                        .clone()
                        .unwrap_or_else(|| "No reason provided".to_string())
                } else {
                    "N/A".to_string()
                };

                vec![
                    ("studentName", student.map(|s| s.full_name.clone()).unwrap_or_default().into()),
                    ("studentId", student.and_then(|s| s.student_number.clone()).unwrap_or_default().into()),
                    ("blockPreference", block_preference.into()),
                    ("roomType", app.room_type.as_str().into()),
                    ("applicationDate", date(app.created_at).into()),
                    ("status", app.status.as_str().into()),
                    ("assignedRoom", assigned_room.into()),
                    ("semester", app.semester.clone().unwrap_or_default().into()),
                    ("academicYear", app.academic_year.clone().unwrap_or_default().into()),
                    ("email", student.map(|s| s.email.clone()).unwrap_or_default().into()),
                    ("reason", reason.into()),
                ]
            })
            .collect())
    }

    async fn maintenance_rows(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Vec<RowData>> {
        let requests = self
            .maintenance_repo
            .list(MaintenanceFilter {
                created_from: start,
                created_to: end,
                ..Default::default()
            })
            .await?;
        let users = self.users_by_id().await?;
        let blocks = self.block_names().await?;
        let rooms = self.rooms_by_id().await?;

        Ok(requests
            .into_iter()
            .map(|request| -> RowData {
                let room = rooms.get(&request.room_id);
                let block = room
                    .and_then(|r| blocks.get(&r.block_id))
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                let reported_by = users
                    .get(&request.student_id)
                    .map(|u| u.full_name.clone())
                    .unwrap_or_else(|| request.student_id.to_string());
                let completed = request
                    .resolved_at
                    .map(date)
                    .unwrap_or_else(|| "Not completed".to_string());

                vec![
                    ("issueType", request.category.as_str().into()),
                    ("description", request.description.clone().into()),
                    ("block", block.into()),
                    ("roomNumber", room.map(|r| r.room_number.clone()).unwrap_or_else(|| "Unknown".to_string()).into()),
                    ("reportedBy", reported_by.into()),
                    ("dateReported", date(request.created_at).into()),
                    ("status", request.status.as_str().into()),
                    ("priority", request.priority.as_str().into()),
                    ("completedDate", completed.into()),
                    ("title", request.title.clone().into()),
                ]
            })
            .collect())
    }

    async fn block_rows(&self) -> Result<Vec<RowData>> {
        let blocks = self.block_repo.list().await?;
        let rooms = self.rooms_by_id().await?;
        let open_requests: Vec<MaintenanceRequest> = self
            .maintenance_repo
            .list(MaintenanceFilter::default())
            .await?
            .into_iter()
            .filter(|request| request.status.is_open())
            .collect();

        Ok(blocks
            .into_iter()
            .map(|block| -> RowData {
                let issues = open_requests
                    .iter()
                    .filter(|request| {
                        rooms
                            .get(&request.room_id)
                            .map(|room| room.block_id == block.id)
                            .unwrap_or(false)
                    })
                    .count() as i64;

                vec![
                    ("name", block.name.clone().into()),
                    ("totalRooms", block.total_rooms.into()),
                    ("availableRooms", block.available_rooms.into()),
                    ("occupancyRate", occupancy_rate(block.total_rooms, block.available_rooms).into()),
                    ("gender", block.gender.as_str().into()),
                    ("maintenanceIssues", issues.into()),
                    (
                        "description",
                        block
                            .description
                            .clone()
                            .filter(|d| !d.trim().is_empty())
                            .unwrap_or_else(|| "No description".to_string())
                            .into(),
                    ),
                ]
            })
            .collect())
    }

    async fn student_rows(&self) -> Result<Vec<RowData>> {
        let students = self
            .user_repo
            .list(
                UserFilter {
                    role: Some(UserRole::Student),
                    ..Default::default()
                },
                i64::MAX,
                0,
            )
            .await?;
        let applications = self.application_repo.list(ApplicationFilter::default()).await?;
        let active = self.assignment_repo.list(Some(AssignmentStatus::Active)).await?;
        let maintenance = self.maintenance_repo.list(MaintenanceFilter::default()).await?;
        let rooms = self.rooms_by_id().await?;
        let blocks = self.block_names().await?;

        Ok(students
            .into_iter()
            .map(|student| -> RowData {
                // Applications are listed newest first.
                let latest = applications.iter().find(|a| a.student_id == student.id);
                let room = active
                    .iter()
                    .find(|a| a.student_id == student.id)
                    .and_then(|a| rooms.get(&a.room_id));
                let block = room
                    .and_then(|r| blocks.get(&r.block_id))
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| "Not assigned".to_string());

                vec![
                    ("name", student.full_name.clone().into()),
                    ("id", student.student_number.clone().unwrap_or_default().into()),
                    ("email", student.email.clone().into()),
                    ("block", block.into()),
                    ("room", room.map(|r| r.room_number.clone()).unwrap_or_else(|| "Not assigned".to_string()).into()),
                    ("hasApplication", yes_no(latest.is_some())),
                    ("hasMaintenance", yes_no(maintenance.iter().any(|m| m.student_id == student.id))),
                    (
                        "applicationStatus",
                        latest
                            .map(|a| a.status.as_str().to_string())
                            .unwrap_or_else(|| "No application".to_string())
                            .into(),
                    ),
                    ("createdAt", date(student.created_at).into()),
                ]
            })
            .collect())
    }
}

/// Percentage of rooms not available, rounded. Zero for a block with no rooms.
pub fn occupancy_rate(total_rooms: i64, available_rooms: i64) -> i64 {
    if total_rooms <= 0 {
        return 0;
    }
    ((1.0 - available_rooms as f64 / total_rooms as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_columns_keeps_requested_order() {
        let requested = vec!["status".to_string(), "block".to_string(), "bogus".to_string()];
        assert_eq!(ReportKind::Occupancy.select_columns(&requested), vec!["status", "block"]);
    }

    #[test]
    fn test_select_columns_defaults_to_all() {
        let all = ReportKind::Blocks.select_columns(&[]);
        assert_eq!(all, ReportKind::Blocks.columns().to_vec());

        let only_unknown = ReportKind::Blocks.select_columns(&["nope".to_string()]);
        assert_eq!(only_unknown.len(), 7);
    }

    #[test]
    fn test_occupancy_rate() {
        assert_eq!(occupancy_rate(4, 1), 75);
        assert_eq!(occupancy_rate(3, 1), 67);
        assert_eq!(occupancy_rate(0, 0), 0);
        assert_eq!(occupancy_rate(5, 5), 0);
    }

    #[test]
    fn test_records_are_keyed_by_column() {
        let report = Report {
            kind: ReportKind::Blocks,
            title: "Blocks Report".to_string(),
            generated_at: Utc::now(),
            columns: vec!["name".to_string(), "totalRooms".to_string()],
            rows: vec![vec!["North".into(), ReportValue::Number(12)]],
        };

        let records = report.records();
        assert_eq!(records[0]["name"], "North");
        assert_eq!(records[0]["totalRooms"], 12);
    }

    #[test]
    fn test_records_follow_requested_column_order() {
        let report = Report {
            kind: ReportKind::Occupancy,
            title: "Room Occupancy Report".to_string(),
            generated_at: Utc::now(),
            columns: vec!["status".to_string(), "block".to_string()],
            rows: vec![vec!["available".into(), "North".into()]],
        };

        let records = report.records();
        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["status", "block"]);

        let json = serde_json::to_string(&records[0]).unwrap();
        assert_eq!(json, r#"{"status":"available","block":"North"}"#);
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in ReportKind::ALL {
            assert_eq!(ReportKind::from_str(kind.as_str()), Some(kind));
        }
    }
}
