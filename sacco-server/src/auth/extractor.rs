//! Session extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::auth::{CurrentUser, resolve_session};
use crate::cookies::extract_session_token;
use crate::security_log;
use crate::state::AppState;

/// Resolves the session cookie into a [`CurrentUser`], 401 otherwise
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_auth`
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let Some(token) = extract_session_token(&parts.headers) else {
            return Err(AppError::unauthorized());
        };

        match resolve_session(&state.pool, &token, state.session_ttl_millis()).await? {
            Some(user) => {
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            None => {
                security_log!("WARN", "session_invalid", uri = parts.uri.to_string());
                Err(AppError::session_expired())
            }
        }
    }
}
