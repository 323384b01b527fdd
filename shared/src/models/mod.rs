//! Data models
//!
//! Shared between sacco-server and sacco-client (via the REST API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY); timestamps are ms since epoch.

pub mod correction;
pub mod member;
pub mod search_log;
pub mod stats;
pub mod user;
pub mod verification;

// Re-exports
pub use correction::*;
pub use member::*;
pub use search_log::*;
pub use stats::*;
pub use user::*;
pub use verification::*;
