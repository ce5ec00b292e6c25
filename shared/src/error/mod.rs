//! Unified error system for the store bridge
//!
//! This module provides a comprehensive error handling system with:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by code range
//! - [`BridgeError`]: Error type with code and message
//! - [`ErrorPayload`]: Callback wire format for failed operations
//!
//! # Error Code Ranges
//!
//! - 0: Success
//! - 20xx: Runtime errors (network, store, operation flow)
//! - 21xx: Setup and session errors
//!
//! # Example
//!
//! ```
//! use shared::error::{BridgeError, ErrorCode, ErrorPayload};
//!
//! // Create a simple error
//! let err = BridgeError::new(ErrorCode::NetworkError);
//!
//! // Create an error with custom message
//! let err = BridgeError::with_message(ErrorCode::BadParameters, "Empty product list");
//!
//! // Convert to the callback payload shape
//! let payload = ErrorPayload::from(&err);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{BridgeError, BridgeResult, ErrorPayload};
