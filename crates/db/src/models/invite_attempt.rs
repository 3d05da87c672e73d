use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Failed-redemption counter for one actor (IP or account key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InviteAttempt {
    #[serde(rename = "_id")]
    pub actor_key: String,
    #[serde(default)]
    pub failed_attempts: i64,
    #[serde(default)]
    pub locked_until: Option<DateTime>,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime>,
}

impl InviteAttempt {
    pub const COLLECTION: &'static str = "invite_attempts";

    pub fn new(actor_key: impl Into<String>) -> Self {
        Self {
            actor_key: actor_key.into(),
            failed_attempts: 0,
            locked_until: None,
            last_attempt_at: None,
        }
    }
}
