//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the allocated code ranges:
/// - 0..2000: General (success and reserved space)
/// - 2000..2100: Runtime errors
/// - 2100 and up: Setup and session errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Success and reserved space (0..2000)
    General,
    /// Runtime errors (2000..2100)
    Runtime,
    /// Setup and session errors (2100+)
    Session,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..2000 => Self::General,
            2000..2100 => Self::Runtime,
            _ => Self::Session,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Runtime => "runtime",
            Self::Session => "session",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1999), ErrorCategory::General);

        assert_eq!(ErrorCategory::from_code(2000), ErrorCategory::Runtime);
        assert_eq!(ErrorCategory::from_code(2006), ErrorCategory::Runtime);
        assert_eq!(ErrorCategory::from_code(2099), ErrorCategory::Runtime);

        assert_eq!(ErrorCategory::from_code(2100), ErrorCategory::Session);
        assert_eq!(ErrorCategory::from_code(2109), ErrorCategory::Session);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::Session);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::NetworkError.category(), ErrorCategory::Runtime);
        assert_eq!(ErrorCode::Canceled.category(), ErrorCategory::Runtime);
        assert_eq!(
            ErrorCode::AlreadyInProgress.category(),
            ErrorCategory::Runtime
        );
        assert_eq!(ErrorCode::NotSetup.category(), ErrorCategory::Session);
        assert_eq!(ErrorCode::BadParameters.category(), ErrorCategory::Session);
        assert_eq!(
            ErrorCode::ErrorWithExternalStore.category(),
            ErrorCategory::Session
        );
    }

    #[test]
    fn test_category_name() {
        assert_eq!(ErrorCategory::General.name(), "general");
        assert_eq!(ErrorCategory::Runtime.name(), "runtime");
        assert_eq!(ErrorCategory::Session.name(), "session");
    }

    #[test]
    fn test_category_serialize() {
        let category = ErrorCategory::Runtime;
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, "\"runtime\"");

        let category = ErrorCategory::Session;
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, "\"session\"");
    }

    #[test]
    fn test_category_deserialize() {
        let category: ErrorCategory = serde_json::from_str("\"runtime\"").unwrap();
        assert_eq!(category, ErrorCategory::Runtime);

        let category: ErrorCategory = serde_json::from_str("\"general\"").unwrap();
        assert_eq!(category, ErrorCategory::General);
    }
}
