//! Admin error model.

use thiserror::Error;

/// Result type used across the admin layers.
pub type AdminResult<T> = Result<T, AdminError>;

/// Error taxonomy surfaced at the presentation boundary.
///
/// Store-level failures are converted into one of these variants before they
/// leave the infrastructure layer; nothing opaque reaches a response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// No such execution, instance, step or job.
    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    /// The requested operation is incompatible with the current status.
    #[error("{message}")]
    StateConflict { code: &'static str, message: String },

    /// A request failed validation (e.g. job name mismatch, bad paging).
    #[error("validation failed: {message}")]
    Validation { code: &'static str, message: String },

    /// An execution context could not be encoded for display.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The execution store could not be reached at all.
    #[error("execution store unavailable: {0}")]
    Unavailable(String),
}

impl AdminError {
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::StateConflict {
            code,
            message: message.into(),
        }
    }

    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Stable, machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AdminError::NotFound { code, .. }
            | AdminError::StateConflict { code, .. }
            | AdminError::Validation { code, .. } => code,
            AdminError::Serialization(_) => "serialization.error",
            AdminError::Unavailable(_) => "store.unavailable",
        }
    }
}
