//! Shared error type across visitcount crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, CounterError>;

/// Unified error type used by the core and the server.
#[derive(Debug, Error)]
pub enum CounterError {
    /// Store could not be reached (network, io, shutdown).
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Caller is not allowed to touch the document.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Partial update targeted a document that does not exist.
    #[error("document not found: {0}")]
    NotFound(String),
    /// Stored data could not be decoded.
    #[error("corrupt document: {0}")]
    Corrupt(String),
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl CounterError {
    /// Short stable label, used for metric labels and structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CounterError::Unavailable(_) => "unavailable",
            CounterError::PermissionDenied(_) => "permission_denied",
            CounterError::NotFound(_) => "not_found",
            CounterError::Corrupt(_) => "corrupt",
            CounterError::BadConfig(_) => "bad_config",
            CounterError::Internal(_) => "internal",
        }
    }
}
