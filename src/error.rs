//! Error types for the tag registry and usage statistics.

use thiserror::Error;

/// Errors raised by counter store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or is locked; callers may retry later
    #[error("Counter store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the operation failed
    #[error("Counter store error: {0}")]
    Backend(#[source] rusqlite::Error),

    /// An increment hit a value that is not an integer
    #[error("Counter {key} does not hold an integer")]
    NotAnInteger { key: String },

    /// An increment would leave the 64-bit signed range
    #[error("Counter {key} would overflow")]
    Overflow { key: String },

    /// A stored estimator could not be decoded
    #[error("Corrupt cardinality sketch at {key}")]
    CorruptSketch { key: String },
}

impl StoreError {
    /// Returns true for failures that may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure,
            ) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Backend(err),
        }
    }
}

/// Errors that can occur when working with tags and their usage.
#[derive(Debug, Error)]
pub enum TagError {
    /// The tag name is empty or does not match the hashtag grammar
    #[error("Invalid tag name {name:?}: {reason}")]
    Validation { name: String, reason: &'static str },

    /// Another tag already uses this name (case-insensitive)
    #[error("Tag name {name:?} has already been taken")]
    Conflict { name: String },

    /// No tag exists with the given name or id
    #[error("Tag not found: {0}")]
    NotFound(String),

    /// A stored counter value is not a number
    #[error("Counter {key} holds a non-numeric value {value:?}")]
    DataIntegrity { key: String, value: String },

    /// A stored timestamp is out of range
    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] time::error::ComponentRange),

    /// Relational store failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Counter store failure, surfaced without substituting zero
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TagError {
    /// Returns true for errors caused by user input rather than the system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TagError::Validation { .. } | TagError::Conflict { .. } | TagError::NotFound(_)
        )
    }
}

pub type Result<T, E = TagError> = std::result::Result<T, E>;
