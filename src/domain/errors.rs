//! Structured error types for stackdrain
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Decode-level errors are recoverable (counted and skipped by the session
//! loop); collaborator-level errors are fatal to the session.

use std::time::Duration;
use thiserror::Error;

/// A record that does not match the canonical wire format.
///
/// Always local to one record: the session counts it and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("expected 4 comma-separated fields, got {0}")]
    FieldArity(usize),

    #[error("field {field} is not a valid integer: {value:?}")]
    BadInteger { field: &'static str, value: String },

    #[error("record decodes to zero stack frames")]
    EmptyTrace,

    #[error("frame token {0:?} has no qualified name after its marker")]
    EmptyFrame(String),
}

/// Failure of the collaborator's drain operation itself.
///
/// Fatal to the session that observes it; surfaced from `stop()`/`join()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("drain failed: {0}")]
pub struct DrainError(pub String);

impl DrainError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Rejected by `SamplingSession::new` before any worker is spawned.
    #[error("invalid session configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Collaborator(#[from] DrainError),

    /// The polling worker did not exit within the bounded wait, most
    /// likely because the collaborator's drain call is stuck.
    #[error("polling worker did not stop within {0:?}")]
    JoinTimeout(Duration),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
