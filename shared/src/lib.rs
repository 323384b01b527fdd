//! Shared types for the SACCO membership services
//!
//! Wire types, the role/capability table, error codes and CSV templates used
//! by both sacco-server and sacco-client.

pub mod client;
pub mod error;
pub mod models;
pub mod pagination;
pub mod permissions;
pub mod templates;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorBody, ErrorCode};
pub use permissions::{Capability, CapabilitySet, has_permission};
