//! Error types for lock operations.

use thiserror::Error;

/// Errors that can occur during lock operations.
///
/// `NotFound` and `Denied` are recoverable outcomes of normal operation and
/// must never be conflated with the infrastructure variants: a lost race looks
/// nothing like a backend outage to a caller deciding whether to retry.
#[derive(Error, Debug)]
pub enum LockError {
    /// No lock entry exists for this name. Callers treat this as "unheld".
    #[error("no lock named '{0}' was found")]
    NotFound(String),

    /// Acquisition lost to a conflicting holder. Expected under contention.
    #[error("lock '{0}' is held by a conflicting value")]
    Denied(String),

    /// Failed to reach the coordination service.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Any other coordination-service failure.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
