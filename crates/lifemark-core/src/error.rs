//! Shared error type across lifemark crates.

use thiserror::Error;

/// Stable error codes (used in structured logs and by tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Timer called out of order (e.g. finalize before the response was sent).
    Usage,
    /// Invalid configuration.
    BadConfig,
    /// Unknown lifecycle event name.
    UnknownEvent,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error (I/O, poisoned state).
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and JSON bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Usage => "USAGE",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnknownEvent => "UNKNOWN_EVENT",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LifemarkError>;

/// Unified error type used by core and integrations.
#[derive(Debug, Error)]
pub enum LifemarkError {
    #[error("timing should only be calculated once the response is sent (total is zero)")]
    ResponseNotSent,
    #[error("invalid total duration: {0}ms")]
    InvalidTotal(f64),
    #[error("unknown lifecycle event: {0}")]
    UnknownEvent(String),
    #[error("bad config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl LifemarkError {
    /// Map to a stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            LifemarkError::ResponseNotSent | LifemarkError::InvalidTotal(_) => ErrorCode::Usage,
            LifemarkError::UnknownEvent(_) => ErrorCode::UnknownEvent,
            LifemarkError::Config(_) => ErrorCode::BadConfig,
            LifemarkError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            LifemarkError::Internal(_) => ErrorCode::Internal,
        }
    }
}
