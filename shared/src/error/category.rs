//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Member errors (3xxx)
    Member,
    /// User errors (4xxx)
    User,
    /// Correction errors (5xxx)
    Correction,
    /// Upload errors (6xxx)
    Upload,
    /// System errors (7xxx and above)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Member,
            4000..5000 => Self::User,
            5000..6000 => Self::Correction,
            6000..7000 => Self::Upload,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Member => "member",
            Self::User => "user",
            Self::Correction => "correction",
            Self::Upload => "upload",
            Self::System => "system",
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
        assert_eq!(ErrorCategory::from_code(1005), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3002), ErrorCategory::Member);
        assert_eq!(ErrorCategory::from_code(4003), ErrorCategory::User);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Correction);
        assert_eq!(ErrorCategory::from_code(6005), ErrorCategory::Upload);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::MemberMismatch.category(), ErrorCategory::Member);
        assert_eq!(ErrorCode::ContactRequired.category(), ErrorCategory::Correction);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
        assert_eq!(ErrorCategory::Upload.name(), "upload");
    }
}
