//! Dashboard Statistics

use serde::{Deserialize, Serialize};

/// Aggregate counters shown at the top of the admin panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_members: i64,
    pub total_zones: i64,
    pub total_verifications: i64,
    pub pending_corrections: i64,
    #[serde(default)]
    pub resolved_corrections: i64,
    pub total_searches: i64,
    #[serde(default)]
    pub successful_searches: i64,
    #[serde(default)]
    pub failed_searches: i64,
}
