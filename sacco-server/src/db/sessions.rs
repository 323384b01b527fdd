//! Cookie session storage
//!
//! Rows are keyed by the SHA-256 of the cookie token, never the token itself.

use shared::models::User;
use sqlx::SqlitePool;

pub async fn create(
    pool: &SqlitePool,
    token_hash: &str,
    user_id: i64,
    now: i64,
    expires_at: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// The active user behind a live session; expired rows are removed on sight
pub async fn find_user(
    pool: &SqlitePool,
    token_hash: &str,
    now: i64,
) -> Result<Option<User>, sqlx::Error> {
    let expires_at: Option<i64> =
        sqlx::query_scalar("SELECT expires_at FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(pool)
            .await?;

    match expires_at {
        None => Ok(None),
        Some(expiry) if expiry <= now => {
            delete(pool, token_hash).await?;
            Ok(None)
        }
        Some(_) => {
            sqlx::query_as::<_, User>(
                "SELECT u.id, u.username, u.email, u.role, u.is_active, u.last_login, u.created_at FROM sessions s JOIN users u ON u.id = s.user_id WHERE s.token_hash = ? AND u.is_active = 1",
            )
            .bind(token_hash)
            .fetch_optional(pool)
            .await
        }
    }
}

/// Push the expiry to `expires_at` unless it was pushed less than
/// `min_step` ms ago; true when the row changed
pub async fn extend(
    pool: &SqlitePool,
    token_hash: &str,
    expires_at: i64,
    min_step: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE sessions SET expires_at = ?1 WHERE token_hash = ?2 AND expires_at <= ?3",
    )
    .bind(expires_at)
    .bind(token_hash)
    .bind(expires_at - min_step)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, token_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_for_user(pool: &SqlitePool, user_id: i64) -> Result<u64, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

pub async fn purge_expired(pool: &SqlitePool, now: i64) -> Result<u64, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
