//! Unified error handling for the sync client.

use taskflow_engine::ConflictId;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("engine error: {0}")]
    Engine(#[from] taskflow_engine::Error),

    #[error("service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("service unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected service response: {0}")]
    BadEnvelope(String),

    #[error("a sync cycle is already in progress")]
    CycleInProgress,

    #[error("conflict not found: {0}")]
    ConflictNotFound(ConflictId),
}

impl Error {
    /// Whether the operation that hit this error should stay queued and
    /// be retried on a later cycle.
    ///
    /// Network-level failures and server 5xx responses are transient;
    /// a 4xx rejection is final and must be surfaced instead of retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Unreachable(_) => true,
            Error::Rejected { status, .. } => *status >= 500,
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
