//! Unified error system for the SACCO services
//!
//! - [`ErrorCode`]: Standardized numeric error codes
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error type with code, message and details
//! - [`ErrorBody`]: The `{error, code, details}` JSON body of failed responses
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Member errors
//! - 4xxx: User errors
//! - 5xxx: Correction errors
//! - 6xxx: Upload errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::MemberNumberExists);
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.error, "Member number already exists");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
