//! Unified error codes for the SACCO services
//!
//! Error codes are shared by sacco-server, sacco-client and any frontend that
//! reads the `code` field of an error body. They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Member errors
//! - 4xxx: User errors
//! - 5xxx: Correction errors
//! - 6xxx: Upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for compact serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Too many requests from one client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Session has expired
    SessionExpired = 1005,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// A user tried to delete their own account
    CannotDeleteSelf = 2006,

    // ==================== 3xxx: Member ====================
    /// Member not found
    MemberNotFound = 3001,
    /// Member number already in use
    MemberNumberExists = 3002,
    /// Unknown member status value
    InvalidMemberStatus = 3003,
    /// Member id / member number / ID number do not identify the same record
    MemberMismatch = 3004,

    // ==================== 4xxx: User ====================
    /// User not found
    UserNotFound = 4001,
    /// Username already in use
    UsernameExists = 4002,
    /// Email already in use
    EmailExists = 4003,
    /// Unknown role value
    InvalidRole = 4004,
    /// Password too short
    PasswordTooShort = 4005,
    /// Email address is malformed
    InvalidEmail = 4006,

    // ==================== 5xxx: Correction ====================
    /// Correction request not found
    CorrectionNotFound = 5001,
    /// Correction request already resolved
    CorrectionAlreadyResolved = 5002,
    /// Neither email nor phone supplied
    ContactRequired = 5003,

    // ==================== 6xxx: Upload ====================
    /// No file part in the multipart body
    NoFileProvided = 6001,
    /// Uploaded file has no content
    EmptyFile = 6002,
    /// Uploaded file exceeds the configured limit
    FileTooLarge = 6003,
    /// File extension is not a supported spreadsheet type
    UnsupportedFileFormat = 6004,
    /// Header row lacks required columns
    MissingColumns = 6005,
    /// Spreadsheet could not be parsed
    SpreadsheetUnreadable = 6006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Configuration error
    ConfigError = 9005,
    /// PDF rendering failed
    PdfGenerationFailed = 9201,
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl ErrorCode {
    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::CannotDeleteSelf => "You cannot delete your own account",

            // Member
            ErrorCode::MemberNotFound => "Member not found",
            ErrorCode::MemberNumberExists => "Member number already exists",
            ErrorCode::InvalidMemberStatus => {
                "Status must be one of: active, dormant, closed, deceased"
            }
            ErrorCode::MemberMismatch => "Member details do not match",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailExists => "Email already exists",
            ErrorCode::InvalidRole => "Invalid role",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::InvalidEmail => "Invalid email address",

            // Correction
            ErrorCode::CorrectionNotFound => "Correction request not found",
            ErrorCode::CorrectionAlreadyResolved => "Correction request is already resolved",
            ErrorCode::ContactRequired => "Please provide at least one contact method",

            // Upload
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => {
                "Unsupported file format, upload a .csv, .xlsx or .xls file"
            }
            ErrorCode::MissingColumns => "Spreadsheet is missing required columns",
            ErrorCode::SpreadsheetUnreadable => "Spreadsheet could not be read",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::PdfGenerationFailed => "Failed to generate PDF",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1005 => Ok(ErrorCode::SessionExpired),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2006 => Ok(ErrorCode::CannotDeleteSelf),

            // Member
            3001 => Ok(ErrorCode::MemberNotFound),
            3002 => Ok(ErrorCode::MemberNumberExists),
            3003 => Ok(ErrorCode::InvalidMemberStatus),
            3004 => Ok(ErrorCode::MemberMismatch),

            // User
            4001 => Ok(ErrorCode::UserNotFound),
            4002 => Ok(ErrorCode::UsernameExists),
            4003 => Ok(ErrorCode::EmailExists),
            4004 => Ok(ErrorCode::InvalidRole),
            4005 => Ok(ErrorCode::PasswordTooShort),
            4006 => Ok(ErrorCode::InvalidEmail),

            // Correction
            5001 => Ok(ErrorCode::CorrectionNotFound),
            5002 => Ok(ErrorCode::CorrectionAlreadyResolved),
            5003 => Ok(ErrorCode::ContactRequired),

            // Upload
            6001 => Ok(ErrorCode::NoFileProvided),
            6002 => Ok(ErrorCode::EmptyFile),
            6003 => Ok(ErrorCode::FileTooLarge),
            6004 => Ok(ErrorCode::UnsupportedFileFormat),
            6005 => Ok(ErrorCode::MissingColumns),
            6006 => Ok(ErrorCode::SpreadsheetUnreadable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9005 => Ok(ErrorCode::ConfigError),
            9201 => Ok(ErrorCode::PdfGenerationFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::CannotDeleteSelf.code(), 2006);
        assert_eq!(ErrorCode::MemberNumberExists.code(), 3002);
        assert_eq!(ErrorCode::UsernameExists.code(), 4002);
        assert_eq!(ErrorCode::CorrectionAlreadyResolved.code(), 5002);
        assert_eq!(ErrorCode::MissingColumns.code(), 6005);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_covers_every_variant() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::TooManyRequests,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::SessionExpired,
            ErrorCode::AccountDisabled,
            ErrorCode::PermissionDenied,
            ErrorCode::CannotDeleteSelf,
            ErrorCode::MemberNotFound,
            ErrorCode::MemberNumberExists,
            ErrorCode::InvalidMemberStatus,
            ErrorCode::MemberMismatch,
            ErrorCode::UserNotFound,
            ErrorCode::UsernameExists,
            ErrorCode::EmailExists,
            ErrorCode::InvalidRole,
            ErrorCode::PasswordTooShort,
            ErrorCode::InvalidEmail,
            ErrorCode::CorrectionNotFound,
            ErrorCode::CorrectionAlreadyResolved,
            ErrorCode::ContactRequired,
            ErrorCode::NoFileProvided,
            ErrorCode::EmptyFile,
            ErrorCode::FileTooLarge,
            ErrorCode::UnsupportedFileFormat,
            ErrorCode::MissingColumns,
            ErrorCode::SpreadsheetUnreadable,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::NetworkError,
            ErrorCode::ConfigError,
            ErrorCode::PdfGenerationFailed,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::MemberNotFound).unwrap();
        assert_eq!(json, "3001");

        let code: ErrorCode = serde_json::from_str("5002").unwrap();
        assert_eq!(code, ErrorCode::CorrectionAlreadyResolved);

        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::MemberNotFound), "3001");
        assert_eq!(format!("{}", InvalidErrorCode(999)), "invalid error code: 999");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::MemberNumberExists.message(), "Member number already exists");
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }
}
