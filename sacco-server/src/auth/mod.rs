//! Authentication and authorization
//!
//! Sessions are opaque random tokens carried in an HttpOnly cookie; the
//! server stores only their SHA-256. Capabilities come from the role table in
//! [`shared::permissions`].

mod extractor;
mod middleware;
pub mod rate_limit;

pub use middleware::{require_auth, require_permission};
pub(crate) use middleware::append_cookie;

use shared::models::{Role, User};
use shared::permissions::{Capability, has_permission};
use sqlx::SqlitePool;

use crate::config::{BootstrapAdmin, Config};
use crate::cookies::build_session_cookie;
use crate::db::{sessions, users};
use crate::error::ServiceResult;
use crate::util::{generate_session_token, hash_password, hash_token, now_millis};

/// Sessions slide forward at most once per minute
const SESSION_EXTEND_STEP_MS: i64 = 60_000;

/// The signed-in admin for this request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Digest of the cookie token, used to end this session
    pub token_hash: String,
    /// Raw token when this request pushed the session expiry; the cookie
    /// has to be re-issued so the browser keeps it as long as the server
    pub renewed_token: Option<String>,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn can(&self, cap: Capability) -> bool {
        has_permission(self.user.role, cap)
    }

    /// `Set-Cookie` value for a session this request extended
    pub fn renewal_cookie(&self, config: &Config) -> Option<String> {
        self.renewed_token.as_deref().map(|token| {
            build_session_cookie(token, config.session_ttl_hours, config.cookie_secure)
        })
    }
}

/// Open a session for `user_id`; returns the raw cookie token
pub async fn start_session(pool: &SqlitePool, user_id: i64, ttl_millis: i64) -> ServiceResult<String> {
    let token = generate_session_token();
    let now = now_millis();
    sessions::create(pool, &hash_token(&token), user_id, now, now + ttl_millis).await?;
    Ok(token)
}

/// Resolve a raw cookie token to its active user
///
/// A live session is extended to `ttl_millis` from now, so it only lapses
/// after that long without requests.
pub async fn resolve_session(
    pool: &SqlitePool,
    token: &str,
    ttl_millis: i64,
) -> ServiceResult<Option<CurrentUser>> {
    let token_hash = hash_token(token);
    let now = now_millis();
    let Some(user) = sessions::find_user(pool, &token_hash, now).await? else {
        return Ok(None);
    };
    let extended =
        sessions::extend(pool, &token_hash, now + ttl_millis, SESSION_EXTEND_STEP_MS).await?;
    if extended {
        tracing::debug!(user_id = user.id, "Session extended");
    }
    Ok(Some(CurrentUser {
        user,
        token_hash,
        renewed_token: extended.then(|| token.to_owned()),
    }))
}

/// Create the first super admin when no users exist; returns whether one was created
pub async fn ensure_bootstrap_admin(
    pool: &SqlitePool,
    admin: &BootstrapAdmin,
) -> ServiceResult<bool> {
    if users::count(pool).await? > 0 {
        return Ok(false);
    }
    let hash = hash_password(&admin.password)
        .map_err(|e| shared::AppError::internal(format!("Failed to hash password: {e}")))?;
    let user = users::create(pool, &admin.username, &admin.email, &hash, Role::SuperAdmin).await?;
    tracing::warn!(
        username = %user.username,
        "Created bootstrap super admin; change its password"
    );
    Ok(true)
}
