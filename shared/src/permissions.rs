//! Role-based capabilities
//!
//! The single source of truth for "what may this role do". The server gates
//! handlers with [`has_permission`] and the client uses the same call to decide
//! which controls exist at all.
//!
//! | Role | Capabilities |
//! |------|--------------|
//! | super_admin | every capability |
//! | member_manager | manage_members, view_verifications, view_corrections |
//! | verification_viewer | view_verifications |
//! | correction_viewer | view_corrections, manage_corrections |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Role;

/// A named permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageUsers,
    ManageMembers,
    ViewVerifications,
    ViewCorrections,
    ManageCorrections,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::ManageUsers,
        Capability::ManageMembers,
        Capability::ViewVerifications,
        Capability::ViewCorrections,
        Capability::ManageCorrections,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageUsers => "manage_users",
            Self::ManageMembers => "manage_members",
            Self::ViewVerifications => "view_verifications",
            Self::ViewCorrections => "view_corrections",
            Self::ManageCorrections => "manage_corrections",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable set of capabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    pub const fn of(caps: &[Capability]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < caps.len() {
            bits |= caps[i].bit();
            i += 1;
        }
        CapabilitySet(bits)
    }

    pub const fn contains(&self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|cap| self.contains(*cap))
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let caps = Vec::<Capability>::deserialize(deserializer)?;
        Ok(CapabilitySet::of(&caps))
    }
}

const SUPER_ADMIN: CapabilitySet = CapabilitySet::of(&Capability::ALL);
const MEMBER_MANAGER: CapabilitySet = CapabilitySet::of(&[
    Capability::ManageMembers,
    Capability::ViewVerifications,
    Capability::ViewCorrections,
]);
const VERIFICATION_VIEWER: CapabilitySet = CapabilitySet::of(&[Capability::ViewVerifications]);
const CORRECTION_VIEWER: CapabilitySet =
    CapabilitySet::of(&[Capability::ViewCorrections, Capability::ManageCorrections]);

impl Role {
    pub const fn capabilities(&self) -> CapabilitySet {
        match self {
            Role::SuperAdmin => SUPER_ADMIN,
            Role::MemberManager => MEMBER_MANAGER,
            Role::VerificationViewer => VERIFICATION_VIEWER,
            Role::CorrectionViewer => CORRECTION_VIEWER,
        }
    }
}

/// The one authorization check used by both server and client
pub fn has_permission(role: Role, cap: Capability) -> bool {
    role.capabilities().contains(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn caps(role: Role) -> HashSet<Capability> {
        role.capabilities().iter().collect()
    }

    #[test]
    fn role_table_is_exact() {
        use Capability::*;
        assert_eq!(caps(Role::SuperAdmin), HashSet::from(Capability::ALL));
        assert_eq!(
            caps(Role::MemberManager),
            HashSet::from([ManageMembers, ViewVerifications, ViewCorrections])
        );
        assert_eq!(caps(Role::VerificationViewer), HashSet::from([ViewVerifications]));
        assert_eq!(
            caps(Role::CorrectionViewer),
            HashSet::from([ViewCorrections, ManageCorrections])
        );
    }

    #[test]
    fn has_permission_matches_table_for_every_pair() {
        for role in Role::ALL {
            for cap in Capability::ALL {
                assert_eq!(has_permission(role, cap), caps(role).contains(&cap));
            }
        }
        assert!(!has_permission(Role::MemberManager, Capability::ManageUsers));
        assert!(!has_permission(Role::CorrectionViewer, Capability::ManageMembers));
    }

    #[test]
    fn capability_set_serializes_as_names() {
        let json = serde_json::to_value(Role::CorrectionViewer.capabilities()).unwrap();
        assert_eq!(json, serde_json::json!(["view_corrections", "manage_corrections"]));

        let parsed: CapabilitySet = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, Role::CorrectionViewer.capabilities());
        assert_eq!(parsed.len(), 2);
        assert!(CapabilitySet::EMPTY.is_empty());
    }
}
