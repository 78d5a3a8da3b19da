use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Registration {
    pub registration_id: Uuid,
    pub participant_id: Uuid,
    pub bib: String,
    pub wave: Option<String>,
    pub created_at: DateTime<Utc>,
}
