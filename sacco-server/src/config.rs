//! Server configuration

use crate::BoxError;
use crate::auth::rate_limit::RateLimit;

const DEV_BOOTSTRAP_PASSWORD: &str = "admin123";

/// Server configuration, read from the environment (after `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL (created if missing)
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Session lifetime in hours
    pub session_ttl_hours: i64,
    /// Add `Secure` to the session cookie
    pub cookie_secure: bool,
    /// Origins allowed to make credentialed requests
    pub cors_origins: Vec<String>,
    /// Bulk upload body limit in bytes
    pub max_upload_bytes: usize,
    /// Login attempts per IP
    pub login_rate_limit: RateLimit,
    /// Public searches per IP
    pub search_rate_limit: RateLimit,
    /// First super admin, created when the users table is empty
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://sacco_members.db".into(),
            http_port: 5000,
            environment: "development".into(),
            session_ttl_hours: 8,
            cookie_secure: false,
            cors_origins: vec![
                "http://localhost:5173".into(),
                "http://127.0.0.1:5173".into(),
            ],
            max_upload_bytes: 10 * 1024 * 1024,
            login_rate_limit: RateLimit::new(5, 60),
            search_rate_limit: RateLimit::new(30, 60),
            bootstrap_admin: None,
        }
    }
}

impl Config {
    /// Human-readable logs in development, JSON lines elsewhere
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Bootstrap password: required outside development, dev default otherwise.
    fn bootstrap_password(environment: &str) -> Result<String, BoxError> {
        match std::env::var("BOOTSTRAP_ADMIN_PASSWORD") {
            Ok(v) if !v.is_empty() => Ok(v),
            _ if environment == "development" => Ok(DEV_BOOTSTRAP_PASSWORD.into()),
            _ => Err(format!(
                "BOOTSTRAP_ADMIN_PASSWORD must be set in {environment} environment"
            )
            .into()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let defaults = Self::default();
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let bootstrap_admin = if env_flag("BOOTSTRAP_ADMIN_DISABLED") {
            None
        } else {
            Some(BootstrapAdmin {
                username: std::env::var("BOOTSTRAP_ADMIN_USERNAME")
                    .unwrap_or_else(|_| "admin".into()),
                email: std::env::var("BOOTSTRAP_ADMIN_EMAIL")
                    .unwrap_or_else(|_| "admin@localhost".into()),
                password: Self::bootstrap_password(&environment)?,
            })
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.http_port),
            session_ttl_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(defaults.session_ttl_hours),
            cookie_secure: env_flag("COOKIE_SECURE"),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            login_rate_limit: env_rate_limit("LOGIN_RATE_LIMIT", defaults.login_rate_limit)?,
            search_rate_limit: env_rate_limit("SEARCH_RATE_LIMIT", defaults.search_rate_limit)?,
            environment,
            bootstrap_admin,
        })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// `<requests>/<seconds>`; unset keeps the default, garbage is an error
fn env_rate_limit(name: &str, default: RateLimit) -> Result<RateLimit, BoxError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.parse().map_err(|e| format!("{name}: {e}").into()),
        _ => Ok(default),
    }
}
