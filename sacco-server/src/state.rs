//! Shared application state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::db::DbService;

/// Cloned into every handler
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Immutable server configuration
    pub config: Arc<Config>,
    /// Per-IP limits for login and public search
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(db: DbService, config: Config) -> Self {
        Self {
            pool: db.pool,
            rate_limiter: RateLimiter::from_config(&config),
            config: Arc::new(config),
        }
    }

    /// Session lifetime in milliseconds
    pub fn session_ttl_millis(&self) -> i64 {
        self.config.session_ttl_hours * 3_600_000
    }
}
