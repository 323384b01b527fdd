//! Search Log Model

use serde::{Deserialize, Serialize};

/// One public search attempt, successful or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SearchLog {
    pub id: i64,
    pub member_number: String,
    pub id_number: String,
    pub search_successful: bool,
    pub ip_address: Option<String>,
    pub searched_at: i64,
}
