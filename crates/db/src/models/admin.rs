use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Admin privilege record, keyed by the identity provider's uid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub uid: String,
    /// Missing means not an admin.
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl Admin {
    pub const COLLECTION: &'static str = "admins";
}
