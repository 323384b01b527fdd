//! Member Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult, ErrorCode};

/// Lifecycle status of a SACCO member account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum MemberStatus {
    #[default]
    Active,
    Dormant,
    Closed,
    Deceased,
}

impl MemberStatus {
    pub const ALL: [MemberStatus; 4] = [
        MemberStatus::Active,
        MemberStatus::Dormant,
        MemberStatus::Closed,
        MemberStatus::Deceased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dormant => "dormant",
            Self::Closed => "closed",
            Self::Deceased => "deceased",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = AppError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                AppError::new(ErrorCode::InvalidMemberStatus).with_detail("status", s.trim())
            })
    }
}

/// Member entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub member_number: String,
    pub id_number: String,
    pub zone: String,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Create member payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberCreate {
    pub name: String,
    pub member_number: String,
    pub id_number: String,
    pub zone: String,
    /// Defaults to `active` when omitted or blank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A create payload that passed validation: trimmed fields and a parsed status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub member_number: String,
    pub id_number: String,
    pub zone: String,
    pub status: MemberStatus,
}

impl MemberCreate {
    /// Trim every field, require the four identity fields and parse the status.
    pub fn validate(&self) -> AppResult<NewMember> {
        let name = required(&self.name, "name")?;
        let member_number = required(&self.member_number, "member_number")?;
        let id_number = required(&self.id_number, "id_number")?;
        let zone = required(&self.zone, "zone")?;
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => MemberStatus::Active,
            Some(s) => s.parse()?,
        };
        Ok(NewMember {
            name,
            member_number,
            id_number,
            zone,
            status,
        })
    }
}

/// Update member payload; `None` or blank leaves the stored value unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// An update with blanks dropped and the status parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberChanges {
    pub name: Option<String>,
    pub member_number: Option<String>,
    pub id_number: Option<String>,
    pub zone: Option<String>,
    pub status: Option<MemberStatus>,
}

impl MemberChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.member_number.is_none()
            && self.id_number.is_none()
            && self.zone.is_none()
            && self.status.is_none()
    }
}

impl MemberUpdate {
    /// Blank cells mean "leave unchanged", never "overwrite with empty".
    pub fn normalize(&self) -> AppResult<MemberChanges> {
        let status = match non_blank(&self.status) {
            Some(s) => Some(s.parse()?),
            None => None,
        };
        Ok(MemberChanges {
            name: non_blank(&self.name),
            member_number: non_blank(&self.member_number),
            id_number: non_blank(&self.id_number),
            zone: non_blank(&self.zone),
            status,
        })
    }
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::required(field));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
