use std::time::Duration;

use thiserror::Error;

use crate::store::MAX_LIST_LIMIT;

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record passed to a write was the all-default value.
    #[error("{collection} record cannot be empty")]
    NilEntity { collection: &'static str },

    /// A blank id was supplied.
    #[error("{collection} id cannot be empty")]
    EmptyId { collection: &'static str },

    /// No record exists with the given id.
    #[error("{collection} record not found: {id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// A create collided with an existing record.
    #[error("{collection} record already exists: {id}")]
    AlreadyExists {
        collection: &'static str,
        id: String,
    },

    /// A list was requested with a limit outside the accepted range.
    #[error("Invalid limit {limit}: must be between 1 and {MAX_LIST_LIMIT}")]
    InvalidLimit { limit: usize },

    /// The store did not answer within the configured bound.
    #[error("Store operation {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// A stored value could not be mapped back onto a record.
    #[error("Corrupt record in {collection}: {message}")]
    Corrupt {
        collection: &'static str,
        message: String,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true when the error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
