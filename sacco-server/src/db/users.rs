//! Admin user queries

use shared::error::{AppError, ErrorCode};
use shared::models::{Role, User};
use sqlx::SqlitePool;

use crate::error::{ServiceResult, is_unique_violation};

const USER_SELECT: &str =
    "SELECT id, username, email, role, is_active, last_login, created_at FROM users";

/// A user row together with its password hash (login only)
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} ORDER BY created_at ASC, id ASC"))
        .fetch_all(pool)
        .await
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_credentials(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as::<_, UserCredentials>(
        "SELECT id, username, email, role, is_active, last_login, created_at, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> ServiceResult<User> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, role, is_active, created_at) VALUES (?1, ?2, ?3, ?4, 1, ?5)",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .execute(pool)
    .await;

    let id = match result {
        Ok(done) => done.last_insert_rowid(),
        Err(e) if is_unique_violation(&e) => {
            return Err(duplicate_user_error(&e).into());
        }
        Err(e) => return Err(e.into()),
    };

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::database("Failed to create user").into())
}

/// SQLite names the violated column in the message (`users.username` / `users.email`)
fn duplicate_user_error(err: &sqlx::Error) -> AppError {
    let message = match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        _ => String::new(),
    };
    if message.contains("users.email") {
        AppError::new(ErrorCode::EmailExists)
    } else {
        AppError::new(ErrorCode::UsernameExists)
    }
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    role: Option<Role>,
    is_active: Option<bool>,
    password_hash: Option<&str>,
) -> ServiceResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET role = COALESCE(?1, role), is_active = COALESCE(?2, is_active), password_hash = COALESCE(?3, password_hash) WHERE id = ?4",
    )
    .bind(role)
    .bind(is_active)
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound).into());
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).into())
}

pub async fn set_password(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
        .bind(password_hash)
        .bind(username)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64, at: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
