use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::AuditLogEntry;

const COLUMNS: &str = "audit_id, race_id, entity_type, entity_id, action, user_id, \
     before_state, after_state, reason, ts";

pub struct AuditLogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuditLogRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// History for one entity, newest first.
    pub async fn entity_history(
        &self,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(&format!(
            r#"
            SELECT {COLUMNS} FROM audit_log
            WHERE entity_type = ? AND entity_id = ?
            ORDER BY ts DESC, audit_id
            "#
        ))
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// Recent history across a whole race, newest first.
    pub async fn race_history(&self, race_id: Uuid, limit: i64) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(&format!(
            r#"
            SELECT {COLUMNS} FROM audit_log
            WHERE race_id = ?
            ORDER BY ts DESC, audit_id
            LIMIT ?
            "#
        ))
        .bind(race_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}
