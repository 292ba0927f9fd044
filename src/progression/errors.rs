use thiserror::Error;

use crate::progression::types::Event;

/// Errors that can arise while recording progress or persisting it.
#[derive(Debug, Error)]
pub enum ProgressionError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around JSON serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapper around IO errors (directory creation, export files, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A raw event key that is not part of the closed event set.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// A challenge whose fields break the active-challenge invariants.
    #[error("corrupt challenge for {event}: {reason}")]
    CorruptChallenge { event: Event, reason: String },

    /// Returned when a stored document was written by a newer schema.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Internal error (poisoned locks, unexpected conditions)
    #[error("internal error: {0}")]
    Internal(String),
}
