//! Client error types
//!
//! Mirrors how failures reach the user: local validation never touches the
//! network, 401 ends the session, 403 keeps the view, every other non-2xx
//! shows the server's `error` verbatim and transport failures get a generic
//! retry hint.

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Client error type
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Rejected locally, no request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// 401 from the server, with its message
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// 403 from the server
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Any other non-2xx response
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The control already has a request in flight
    #[error("Request already in progress")]
    Busy,
}

impl ClientError {
    /// Text for the error banner
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Unauthorized(_) => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Forbidden(message) if message.trim().is_empty() => {
                PERMISSION_DENIED_MESSAGE.to_string()
            }
            Self::Forbidden(message) => message.clone(),
            Self::Api { message, .. } => message.clone(),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::InvalidResponse(_) => "Unexpected response from server".to_string(),
            Self::Busy => "Please wait for the current request to finish".to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// The `error` text of a non-2xx response, if the server sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(message) | Self::Forbidden(message) | Self::Api { message, .. } => {
                Some(message.as_str()).filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Server error code, when the response carried one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => *code,
            Self::Unauthorized(_) => Some(ErrorCode::NotAuthenticated),
            Self::Forbidden(_) => Some(ErrorCode::PermissionDenied),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Shared validators run before a request is issued
impl From<AppError> for ClientError {
    fn from(err: AppError) -> Self {
        Self::Validation(err.message)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_messages() {
        assert_eq!(
            ClientError::Unauthorized("Invalid username or password".into()).user_message(),
            "Session expired. Please login again."
        );
        assert_eq!(
            ClientError::Network("connection refused".into()).user_message(),
            "Network error. Please try again."
        );
        assert_eq!(
            ClientError::Forbidden(String::new()).user_message(),
            PERMISSION_DENIED_MESSAGE
        );
        let api = ClientError::Api {
            status: 409,
            code: Some(ErrorCode::MemberNumberExists),
            message: "Member number already exists".into(),
        };
        assert_eq!(api.user_message(), "Member number already exists");
        assert_eq!(api.code(), Some(ErrorCode::MemberNumberExists));
    }

    #[test]
    fn shared_validation_stays_local() {
        let err: ClientError = AppError::new(ErrorCode::ContactRequired).into();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(err.user_message(), ErrorCode::ContactRequired.message());
    }
}
