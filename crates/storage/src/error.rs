use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StorageError::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        StorageError::InvalidState(msg.into())
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("2067")
        )
    }
}
