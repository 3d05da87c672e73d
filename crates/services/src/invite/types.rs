use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verified caller identity, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

/// Parameters of a new invite; unset fields take the configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateInvite {
    pub expires_in_days: Option<i64>,
    pub max_uses: Option<i64>,
    pub role: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role: String,
}

/// What an unauthenticated visitor may learn about a valid code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitePreview {
    pub role: String,
    pub expires_at: DateTime<Utc>,
    /// `None` when the invite is unlimited.
    pub remaining_uses: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub registered: bool,
    pub role: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn unregistered() -> Self {
        Self {
            registered: false,
            role: None,
            registered_at: None,
        }
    }
}
