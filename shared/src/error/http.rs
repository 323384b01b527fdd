//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::MemberNotFound
            | Self::UserNotFound
            | Self::CorrectionNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::MemberNumberExists
            | Self::UsernameExists
            | Self::EmailExists
            | Self::CorrectionAlreadyResolved => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::SessionExpired
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::CannotDeleteSelf => StatusCode::FORBIDDEN,

            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::NetworkError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::PdfGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::MemberNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::CorrectionNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::MemberNumberExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::CorrectionAlreadyResolved.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_auth_and_permission_status() {
        assert_eq!(
            ErrorCode::InvalidCredentials.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::SessionExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::PermissionDenied.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::CannotDeleteSelf.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_bad_request_default() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::ContactRequired.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::MissingColumns.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_statuses() {
        assert_eq!(ErrorCode::FileTooLarge.http_status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ErrorCode::TooManyRequests.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
