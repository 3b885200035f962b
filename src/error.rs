use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not Found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error")]
    Db(#[from] sqlx::Error),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

const UNIQUE_VIOLATION: &str = "23505";

/// Map a Postgres unique-constraint violation to `Conflict`; everything else
/// stays a database error.
pub(crate) fn map_unique(err: sqlx::Error, message: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::Conflict(message.to_string());
        }
    }
    StoreError::Db(err)
}
