use bson::DateTime;
use serde::{Deserialize, Serialize};

/// A user who got in through an invite (or the initial admin bootstrap).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredUser {
    #[serde(rename = "_id")]
    pub uid: String,
    pub email: String,
    pub invite_code: String,
    pub role: String,
    pub registered_at: DateTime,
}

impl RegisteredUser {
    pub const COLLECTION: &'static str = "registered_users";
    /// Invite code recorded for users created by the admin bootstrap.
    pub const INITIAL_ADMIN_CODE: &'static str = "INITIAL_ADMIN_SETUP";
}
