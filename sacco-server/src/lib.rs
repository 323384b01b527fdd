//! SACCO membership verification server
//!
//! REST backend for the public member lookup (search, confirm, request a
//! correction) and the cookie-authenticated admin panel.
//!
//! # Module layout
//!
//! ```text
//! sacco-server/src/
//! ├── api/       # routers and handlers, one directory per resource
//! ├── auth/      # session extractor, capability middleware, rate limits
//! ├── db/        # SQLite pool, migrations, per-table queries
//! ├── import.rs  # CSV / Excel bulk import and update
//! ├── pdf.rs     # correction request PDFs
//! ├── cookies.rs # session cookie helpers
//! ├── config.rs  # environment configuration
//! └── state.rs   # shared handler state
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod cookies;
pub mod db;
pub mod error;
pub mod import;
pub mod pdf;
pub mod state;
pub mod util;

pub use config::Config;
pub use db::DbService;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Security event on the `security` tracing target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
