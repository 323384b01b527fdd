//! Admin User API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Role, User, UserCreate, UserUpdate, validate_password};

use crate::auth::CurrentUser;
use crate::db::{sessions, users};
use crate::security_log;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::hash_password;

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// GET /admin/users
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = users::list(&state.pool)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(users))
}

/// POST /admin/users
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<User>)> {
    let data = payload.validate()?;
    let password_hash = hash(&data.password)?;
    let user = users::create(
        &state.pool,
        &data.username,
        &data.email,
        &password_hash,
        data.role,
    )
    .await?;
    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        by = %current.username(),
        "Admin user created"
    );
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /admin/users/{id}
///
/// Deactivating a user or changing their password ends their sessions.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    let role = payload
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()?;

    let demotes_self = payload.is_active == Some(false) || role.is_some_and(|r| r != current.role());
    if id == current.id() && demotes_self {
        security_log!(
            "WARN",
            "self_demotion_denied",
            user_id = current.id(),
            username = current.username().to_string()
        );
        return Err(AppError::forbidden(
            "You cannot deactivate or demote your own account",
        ));
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash(password)?)
        }
        None => None,
    };

    let user = users::update(
        &state.pool,
        id,
        role,
        payload.is_active,
        password_hash.as_deref(),
    )
    .await?;

    if !user.is_active || password_hash.is_some() {
        let ended = sessions::delete_for_user(&state.pool, id)
            .await
            .map_err(ServiceError::from)?;
        tracing::info!(user_id = id, sessions = ended, "Ended user sessions");
    }

    tracing::info!(user_id = id, by = %current.username(), "Admin user updated");
    Ok(Json(user))
}

/// DELETE /admin/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if id == current.id() {
        security_log!(
            "WARN",
            "self_delete_denied",
            user_id = current.id(),
            username = current.username().to_string()
        );
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }

    let deleted = users::delete(&state.pool, id)
        .await
        .map_err(ServiceError::from)?;
    if !deleted {
        return Err(AppError::new(ErrorCode::UserNotFound));
    }

    tracing::info!(user_id = id, by = %current.username(), "Admin user deleted");
    Ok(StatusCode::NO_CONTENT)
}
