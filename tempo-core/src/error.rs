//! Error types for the tempo engine.

use thiserror::Error;

/// Errors that can occur in engine operations.
///
/// Every error is a value, never a panic: the HTTP layer maps these to
/// status codes and the `{status:"error", message}` envelope.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid recurrence pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid window: end '{end}' is before start '{start}'")]
    WindowOutOfRange { start: String, end: String },

    #[error("Invalid timestamp '{0}': expected 'YYYY-MM-DD HH:MM' or RFC 3339")]
    InvalidTimestamp(String),

    #[error("Invalid date '{0}': expected 'YYYY-MM-DD'")]
    InvalidDate(String),

    #[error("Store unavailable: {0}")]
    Store(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
