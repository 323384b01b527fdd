//! Admin User Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult, ErrorCode};

/// Minimum password length for admin accounts
pub const MIN_PASSWORD_LEN: usize = 8;

/// Admin role; the capability table lives in [`crate::permissions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Role {
    SuperAdmin,
    MemberManager,
    VerificationViewer,
    CorrectionViewer,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::SuperAdmin,
        Role::MemberManager,
        Role::VerificationViewer,
        Role::CorrectionViewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::MemberManager => "member_manager",
            Self::VerificationViewer => "verification_viewer",
            Self::CorrectionViewer => "correction_viewer",
        }
    }

    /// Display label for role pickers
    pub fn label(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::MemberManager => "Member Manager",
            Self::VerificationViewer => "Verification Viewer",
            Self::CorrectionViewer => "Correction Viewer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Full access to all features",
            Self::MemberManager => "Manage members, view verifications and corrections",
            Self::VerificationViewer => "View verification records only",
            Self::CorrectionViewer => "View and manage correction requests",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| AppError::new(ErrorCode::InvalidRole).with_detail("role", wanted))
    }
}

/// Admin user (password hash never leaves the server)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    /// Milliseconds since epoch of the last successful login
    #[serde(default)]
    pub last_login: Option<i64>,
    #[serde(default)]
    pub created_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// A create payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl UserCreate {
    pub fn validate(&self) -> AppResult<NewUser> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AppError::required("username"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AppError::required("email"));
        }
        validate_email(email)?;
        validate_password(&self.password)?;
        Ok(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            role: self.role.parse()?,
        })
    }
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    Ok(())
}

/// Loose shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> AppResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::new(ErrorCode::InvalidEmail).with_detail("email", email));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(
            "admin".parse::<Role>().unwrap_err().code,
            ErrorCode::InvalidRole
        );
    }

    #[test]
    fn create_rejects_short_password() {
        let payload = UserCreate {
            username: "clerk".into(),
            email: "clerk@sacco.co.ke".into(),
            password: "short".into(),
            role: "verification_viewer".into(),
        };
        assert_eq!(
            payload.validate().unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
    }

    #[test]
    fn create_rejects_bad_email() {
        let payload = UserCreate {
            username: "clerk".into(),
            email: "clerk.sacco".into(),
            password: "long-enough".into(),
            role: "member_manager".into(),
        };
        assert_eq!(payload.validate().unwrap_err().code, ErrorCode::InvalidEmail);
    }

    #[test]
    fn create_accepts_valid_payload() {
        let payload = UserCreate {
            username: " clerk ".into(),
            email: "clerk@sacco.co.ke".into(),
            password: "long-enough".into(),
            role: "correction_viewer".into(),
        };
        let user = payload.validate().unwrap();
        assert_eq!(user.username, "clerk");
        assert_eq!(user.role, Role::CorrectionViewer);
    }
}
