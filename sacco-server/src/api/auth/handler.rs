//! Auth API Handlers

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use shared::client::{LoginRequest, LoginResponse, MessageResponse};
use shared::error::{AppError, AppResult, ErrorCode};

use crate::auth::{CurrentUser, append_cookie, start_session};
use crate::cookies::{build_session_cookie, clear_session_cookie, extract_session_token};
use crate::db::{sessions, users};
use crate::security_log;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{hash_token, now_millis, verify_password};

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Please enter both username and password",
        ));
    }

    let credentials = users::find_credentials(&state.pool, username)
        .await
        .map_err(ServiceError::from)?;

    let Some(credentials) = credentials else {
        security_log!("WARN", "login_failed", username = username, reason = "unknown_user");
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(&req.password, &credentials.password_hash) {
        security_log!("WARN", "login_failed", username = username, reason = "bad_password");
        return Err(AppError::invalid_credentials());
    }

    let mut user = credentials.user;
    if !user.is_active {
        security_log!("WARN", "login_failed", username = username, reason = "disabled");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let token = start_session(&state.pool, user.id, state.session_ttl_millis()).await?;
    let now = now_millis();
    users::touch_last_login(&state.pool, user.id, now)
        .await
        .map_err(ServiceError::from)?;
    user.last_login = Some(now);

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    let cookie = build_session_cookie(
        &token,
        state.config.session_ttl_hours,
        state.config.cookie_secure,
    );
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            user,
            message: "Login successful".to_string(),
        }),
    )
        .into_response())
}

/// POST /auth/logout
///
/// Always succeeds; ends the cookie's session when there is one.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = extract_session_token(&headers) {
        sessions::delete(&state.pool, &hash_token(&token))
            .await
            .map_err(ServiceError::from)?;
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie(state.config.cookie_secure))],
        Json(MessageResponse::new("Logged out successfully")),
    )
        .into_response())
}

/// GET /auth/me
///
/// Called on every page load, so it also hands back the renewed cookie.
pub async fn me(State(state): State<AppState>, current: CurrentUser) -> Response {
    let renewal = current.renewal_cookie(&state.config);
    let mut response = Json(current.user).into_response();
    if let Some(cookie) = renewal {
        append_cookie(&mut response, &cookie);
    }
    response
}
