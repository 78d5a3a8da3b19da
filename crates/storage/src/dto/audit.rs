use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{AuditAction, AuditLogEntry};

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditEntryResponse {
    pub audit_id: Uuid,
    pub race_id: Uuid,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub action: AuditAction,
    pub user_id: Option<String>,
    #[schema(value_type = Object)]
    pub before: Option<serde_json::Value>,
    #[schema(value_type = Object)]
    pub after: Option<serde_json::Value>,
    pub reason: Option<String>,
    pub ts: DateTime<Utc>,
}

impl From<AuditLogEntry> for AuditEntryResponse {
    fn from(entry: AuditLogEntry) -> Self {
        let parse = |raw: Option<String>| {
            raw.and_then(|s| serde_json::from_str(&s).ok())
        };
        Self {
            audit_id: entry.audit_id,
            race_id: entry.race_id,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            action: entry.action,
            user_id: entry.user_id,
            before: parse(entry.before_state),
            after: parse(entry.after_state),
            reason: entry.reason,
            ts: entry.ts,
        }
    }
}
