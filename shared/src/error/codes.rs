//! Unified error codes for the store bridge
//!
//! This module defines all error codes surfaced by the bridge to the
//! embedding runtime. Error codes are organized by category:
//! - 0: Success
//! - 20xx: Runtime errors (network, store, operation flow)
//! - 21xx: Setup and session errors
//!
//! The set is closed: codes cross a runtime boundary as plain numbers, so
//! adding or renumbering a variant is a protocol revision. 2103 was never
//! allocated and stays reserved.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the embedding runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    /// Operation completed successfully
    Success = 0,

    // ==================== 20xx: Runtime ====================
    /// Networking error (unable to reach the server)
    NetworkError = 2000,
    /// Server side error
    ServerError = 2001,
    /// Functionality not implemented
    NotImplemented = 2002,
    /// Logic error, please check your code
    LogicError = 2003,
    /// Internal error
    InternalError = 2004,
    /// The operation has been canceled
    Canceled = 2005,
    /// This operation is already in progress
    AlreadyInProgress = 2006,

    // ==================== 21xx: Setup / Session ====================
    /// Setup has not been called prior to issuing this command
    NotSetup = 2100,
    /// Bad application credentials passed at setup
    BadAppCredentials = 2101,
    /// A logged in user is required for this functionality
    NotLoggedIn = 2102,
    /// Parameters passed to the call are out of constraints or missing some field
    BadParameters = 2104,
    /// An event listener for this domain is already registered
    EventListenerAlreadyRegistered = 2105,
    /// Cannot set up twice
    AlreadySetup = 2106,
    /// Error with a social network
    SocialNetworkError = 2107,
    /// The login was canceled
    LoginCanceled = 2108,
    /// Error with the external store
    ErrorWithExternalStore = 2109,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default developer-facing message for this error code
    ///
    /// These strings cross the runtime boundary in error payloads and are
    /// frozen the same way the numeric codes are. `Success` has none.
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "",

            // Runtime
            ErrorCode::NetworkError => "Networking error (unable to reach the server)",
            ErrorCode::ServerError => "Server side error",
            ErrorCode::NotImplemented => "Functionality not implemented",
            ErrorCode::LogicError => "Logic error, please check your code",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::Canceled => "The operation has been canceled",
            ErrorCode::AlreadyInProgress => "This operation is already in progress",

            // Setup / Session
            ErrorCode::NotSetup => "Please call setup prior to issuing this command",
            ErrorCode::BadAppCredentials => "Bad application credentials passed at Setup",
            ErrorCode::NotLoggedIn => "You need be logged in to use this functionality",
            ErrorCode::BadParameters => {
                "Parameters passed to the function are either out of constraints or missing some field"
            }
            ErrorCode::EventListenerAlreadyRegistered => {
                "An event listener for this domain is already registered"
            }
            ErrorCode::AlreadySetup => "Cannot set up twice",
            ErrorCode::SocialNetworkError => "Error with a social network",
            ErrorCode::LoginCanceled => "The login was canceled by the player",
            ErrorCode::ErrorWithExternalStore => "Error with the external store",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),

            // Runtime
            2000 => Ok(ErrorCode::NetworkError),
            2001 => Ok(ErrorCode::ServerError),
            2002 => Ok(ErrorCode::NotImplemented),
            2003 => Ok(ErrorCode::LogicError),
            2004 => Ok(ErrorCode::InternalError),
            2005 => Ok(ErrorCode::Canceled),
            2006 => Ok(ErrorCode::AlreadyInProgress),

            // Setup / Session
            2100 => Ok(ErrorCode::NotSetup),
            2101 => Ok(ErrorCode::BadAppCredentials),
            2102 => Ok(ErrorCode::NotLoggedIn),
            2104 => Ok(ErrorCode::BadParameters),
            2105 => Ok(ErrorCode::EventListenerAlreadyRegistered),
            2106 => Ok(ErrorCode::AlreadySetup),
            2107 => Ok(ErrorCode::SocialNetworkError),
            2108 => Ok(ErrorCode::LoginCanceled),
            2109 => Ok(ErrorCode::ErrorWithExternalStore),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
