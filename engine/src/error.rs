//! Error types for the TaskFlow engine.

use thiserror::Error;

/// All possible errors from the TaskFlow engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("unknown priority: {0}")]
    UnknownPriority(String),

    #[error("unknown operation type: {0}")]
    UnknownOperationType(String),

    #[error("payload is not a JSON object: {0}")]
    PayloadNotObject(String),

    #[error("invalid task payload: {0}")]
    InvalidTaskPayload(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
