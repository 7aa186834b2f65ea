use std::fmt;

use serde::{Deserialize, Serialize};

/// Tier is a user's workspace-wide permission level.
///
/// Exactly one elevated tier exists (`Owner`). Container-level ownership is
/// tracked separately on each channel or DM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Owner,
    Member,
}

impl Tier {
    pub const OWNER_PERMISSION_ID: i64 = 1;
    pub const MEMBER_PERMISSION_ID: i64 = 2;

    /// Converts the numeric permission id used on the wire to a tier.
    pub fn from_permission_id(id: i64) -> Option<Tier> {
        match id {
            Self::OWNER_PERMISSION_ID => Some(Tier::Owner),
            Self::MEMBER_PERMISSION_ID => Some(Tier::Member),
            _ => None,
        }
    }

    #[must_use]
    pub const fn permission_id(self) -> i64 {
        match self {
            Tier::Owner => Self::OWNER_PERMISSION_ID,
            Tier::Member => Self::MEMBER_PERMISSION_ID,
        }
    }

    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Tier::Owner)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Owner => "owner",
            Tier::Member => "member",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn elevated(tier: Option<Tier>) -> bool {
    tier.is_some_and(Tier::is_elevated)
}

/// Workspace administration (removing users, changing tiers).
#[must_use]
pub fn may_administer(tier: Option<Tier>) -> bool {
    elevated(tier)
}

/// Joining a channel without an invitation.
#[must_use]
pub fn may_join(tier: Option<Tier>, is_public: bool) -> bool {
    is_public || elevated(tier)
}

/// Owner permission inside a channel: a channel owner, or an elevated-tier member.
#[must_use]
pub fn has_channel_owner_permission(tier: Option<Tier>, is_owner: bool, is_member: bool) -> bool {
    is_owner || (is_member && elevated(tier))
}

/// Owner permission inside a DM is never granted by tier.
#[must_use]
pub fn has_dm_owner_permission(is_owner: bool) -> bool {
    is_owner
}
