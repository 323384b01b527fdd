//! Verification Model

use serde::{Deserialize, Serialize};

/// Append-only record of a member confirming their details are correct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Verification {
    pub id: i64,
    pub member_id: Option<i64>,
    pub member_name: String,
    pub member_number: String,
    pub id_number: String,
    pub zone: String,
    pub verified_at: i64,
}
