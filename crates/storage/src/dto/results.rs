use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub place: Option<i32>,
    pub participant_id: Uuid,
    pub bib: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub category: Option<String>,
    pub gun_time_ms: Option<i64>,
    pub chip_time_ms: Option<i64>,
    pub net_time_ms: Option<i64>,
    /// HH:MM:SS.mmm renderings of the millisecond fields.
    pub gun_time: Option<String>,
    pub chip_time: Option<String>,
    pub net_time: Option<String>,
}
