//! Correction Request Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// pending -> resolved is the only transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum CorrectionStatus {
    #[default]
    Pending,
    Resolved,
}

impl CorrectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for CorrectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member-submitted claim that their stored record is inaccurate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CorrectionRequest {
    pub id: i64,
    pub member_id: Option<i64>,
    pub member_number: String,
    pub id_number: String,
    pub current_name: String,
    pub current_zone: String,
    pub current_status: String,
    pub correct_name: Option<String>,
    pub correct_zone: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub additional_notes: Option<String>,
    pub status: CorrectionStatus,
    pub submitted_at: i64,
    #[serde(default)]
    pub resolved_at: Option<i64>,
    /// Username of the admin who resolved it
    #[serde(default)]
    pub resolved_by: Option<String>,
}

impl CorrectionRequest {
    pub fn is_pending(&self) -> bool {
        self.status == CorrectionStatus::Pending
    }
}
