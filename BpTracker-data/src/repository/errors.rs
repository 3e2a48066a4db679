use std::sync::PoisonError;
use thiserror::Error;
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}
