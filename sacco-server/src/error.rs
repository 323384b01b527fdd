//! Service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`) so handlers can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::BoxError;

/// - `Db`: database/infrastructure errors (logged, mapped to DatabaseError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(e) => write!(f, "database error: {e}"),
            ServiceError::App(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// True when a write failed on a UNIQUE constraint
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    fn driver_error() -> sqlx::Error {
        sqlx::Error::Protocol("no such column: members.secret_note".into())
    }

    #[test]
    fn database_detail_stays_in_the_log() {
        let err: AppError = ServiceError::from(driver_error()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, ErrorCode::DatabaseError.message());
        assert!(!err.message.contains("secret_note"));
    }

    #[test]
    fn business_errors_pass_through() {
        let err: AppError = ServiceError::from(AppError::new(ErrorCode::MemberNotFound)).into();
        assert_eq!(err.code, ErrorCode::MemberNotFound);
    }

    #[tokio::test]
    async fn response_body_hides_driver_text() {
        let response = ServiceError::from(driver_error()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Database error"));
        assert!(!body.contains("secret_note"));
    }
}
