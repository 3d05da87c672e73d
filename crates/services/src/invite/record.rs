use bson::DateTime;
use chrono::{DateTime as ChronoDateTime, Duration, Utc};
use invitegate_db::models::Invite;

use super::types::{CreateInvite, Identity};

pub const MIN_EXPIRY_DAYS: i64 = 1;
pub const MAX_EXPIRY_DAYS: i64 = 30;
pub const MAX_NOTE_LEN: usize = 200;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

pub fn clamp_expiry_days(days: i64) -> i64 {
    days.clamp(MIN_EXPIRY_DAYS, MAX_EXPIRY_DAYS)
}

/// Only `admin` survives as-is; every other requested role grants `user`.
pub fn normalize_role(role: Option<&str>) -> String {
    match role {
        Some(ROLE_ADMIN) => ROLE_ADMIN.to_string(),
        _ => ROLE_USER.to_string(),
    }
}

pub fn normalize_max_uses(max_uses: i64) -> i64 {
    if max_uses == Invite::UNLIMITED {
        Invite::UNLIMITED
    } else {
        max_uses.max(1)
    }
}

pub fn truncate_note(note: Option<&str>) -> String {
    note.unwrap_or_default().chars().take(MAX_NOTE_LEN).collect()
}

/// Fresh, unredeemed invite for `code` issued by `issuer` at `now`.
pub fn new_invite(
    code: String,
    request: &CreateInvite,
    default_expiry_days: i64,
    issuer: &Identity,
    now: ChronoDateTime<Utc>,
) -> Invite {
    let days = clamp_expiry_days(request.expires_in_days.unwrap_or(default_expiry_days));
    Invite {
        code,
        created_by: issuer.uid.clone(),
        created_by_email: issuer.email.clone(),
        created_at: DateTime::from_chrono(now),
        expires_at: DateTime::from_chrono(now + Duration::days(days)),
        max_uses: normalize_max_uses(request.max_uses.unwrap_or(1)),
        current_uses: 0,
        used_by: Vec::new(),
        role: normalize_role(request.role.as_deref()),
        is_active: true,
        note: truncate_note(request.note.as_deref()),
        revoked_at: None,
        revoked_by: None,
    }
}
