use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Checkpoint, Race};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRaceRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub start_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RaceDetailResponse {
    pub race_id: Uuid,
    pub name: String,
    pub start_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub checkpoints: Vec<Checkpoint>,
    pub participant_count: i64,
}

impl RaceDetailResponse {
    pub fn new(race: Race, checkpoints: Vec<Checkpoint>, participant_count: i64) -> Self {
        Self {
            race_id: race.race_id,
            name: race.name,
            start_at: race.start_at,
            created_at: race.created_at,
            checkpoints,
            participant_count,
        }
    }
}
