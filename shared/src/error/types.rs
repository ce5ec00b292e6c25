//! Error types and callback payload structures

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bridge error with structured error code
///
/// This is the primary error type for the store bridge, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BridgeError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl BridgeError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    // ==================== Convenience constructors ====================

    /// Create a bad parameters error
    pub fn bad_parameters(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::BadParameters, msg)
    }

    /// Create a canceled error
    pub fn canceled(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::Canceled, msg)
    }

    /// Create a logic error
    pub fn logic(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::LogicError, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::NetworkError, msg)
    }

    /// Create a server-side error
    pub fn server(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ServerError, msg)
    }

    /// Create an external store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ErrorWithExternalStore, msg)
    }

    /// Create an already in progress error
    pub fn already_in_progress(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyInProgress, msg)
    }
}

/// Callback error payload
///
/// The wire shape delivered to the embedding runtime when an operation
/// fails: `{"error": <code>, "description": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Numeric error code
    pub error: ErrorCode,
    /// Human-readable description
    pub description: String,
}

impl From<&BridgeError> for ErrorPayload {
    fn from(err: &BridgeError) -> Self {
        Self {
            error: err.code,
            description: err.message.clone(),
        }
    }
}

impl From<BridgeError> for ErrorPayload {
    fn from(err: BridgeError) -> Self {
        Self {
            error: err.code,
            description: err.message,
        }
    }
}

/// Type alias for Result with BridgeError
pub type BridgeResult<T> = Result<T, BridgeError>;
