use thiserror::Error;

/// Failures reported by an article backend. The string carries the reason
/// the way it should be shown to the user.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Creation error: failed to create. {0}")]
    Create(String),
    #[error("Reading error: failed to read. {0}")]
    Read(String),
    #[error("Updating error: failed to update. {0}")]
    Update(String),
    #[error("Deleting error: failed to delete. {0}")]
    Delete(String),
    #[error("Status error: failed to change status. {0}")]
    Status(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("title and content must not be empty")]
    Validation,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
