use bson::DateTime;
use serde::{Deserialize, Serialize};

/// One redeemable code and its usage state. The code itself is the
/// document `_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invite {
    #[serde(rename = "_id")]
    pub code: String,
    pub created_by: String,
    pub created_by_email: String,
    pub created_at: DateTime,
    pub expires_at: DateTime,
    /// `-1` means unlimited.
    pub max_uses: i64,
    #[serde(default)]
    pub current_uses: i64,
    #[serde(default)]
    pub used_by: Vec<InviteRedemption>,
    pub role: String,
    pub is_active: bool,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InviteRedemption {
    pub email: String,
    pub uid: String,
    pub redeemed_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Active,
    Expired,
    Revoked,
    Exhausted,
}

impl Invite {
    pub const COLLECTION: &'static str = "invites";
    pub const UNLIMITED: i64 = -1;

    pub fn is_unlimited(&self) -> bool {
        self.max_uses == Self::UNLIMITED
    }

    /// `None` when the invite has no usage cap.
    pub fn remaining_uses(&self) -> Option<i64> {
        if self.is_unlimited() {
            None
        } else {
            Some((self.max_uses - self.current_uses).max(0))
        }
    }

    /// Lifecycle state at `now`. Expiry is evaluated lazily; revocation
    /// takes precedence over every other terminal state.
    pub fn status(&self, now: DateTime) -> InviteStatus {
        if !self.is_active {
            InviteStatus::Revoked
        } else if self.expires_at <= now {
            InviteStatus::Expired
        } else if self.remaining_uses() == Some(0) {
            InviteStatus::Exhausted
        } else {
            InviteStatus::Active
        }
    }
}
