//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration failure
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Unique constraint violated
    #[error("record already exists")]
    Conflict,
}

impl DbError {
    /// Map an insert failure, turning unique violations into [`DbError::Conflict`]
    pub fn from_insert(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict,
            other => Self::Sqlx(other),
        }
    }
}

/// Result alias for repository calls
pub type DbResult<T> = Result<T, DbError>;
