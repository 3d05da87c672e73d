use std::sync::Arc;

use bson::DateTime as BsonDateTime;
use chrono::{DateTime, Duration, Utc};
use invitegate_config::RateLimitSettings;
use tracing::warn;

use super::error::{InviteResult, Rejection};
use crate::store::AttemptStore;

const MAX_ACTOR_KEY_LEN: usize = 64;

/// Failed-redemption lockout per actor key.
pub struct RateLimiter {
    store: Arc<dyn AttemptStore>,
    max_failed_attempts: i64,
    lockout: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn AttemptStore>, settings: &RateLimitSettings) -> Self {
        Self {
            store,
            max_failed_attempts: i64::from(settings.max_failed_attempts.max(1)),
            lockout: lockout_window(settings.lockout_secs),
        }
    }

    pub async fn check_allowed(&self, actor_key: &str, now: DateTime<Utc>) -> InviteResult<()> {
        let Some(attempt) = self.store.find_attempt(actor_key).await? else {
            return Ok(());
        };
        match attempt.locked_until.map(|t| t.to_chrono()) {
            Some(until) if until > now => Err(Rejection::LockedOut {
                remaining_minutes: remaining_minutes(until, now),
            }
            .into()),
            _ => Ok(()),
        }
    }

    /// Counts one failure; reaching the threshold locks the actor out. The
    /// counter keeps growing past the threshold until a success resets it,
    /// so a failure after a lock expires locks again immediately.
    pub async fn record_failure(&self, actor_key: &str, now: DateTime<Utc>) -> InviteResult<()> {
        let failed = self
            .store
            .increment_failures(actor_key, BsonDateTime::from_chrono(now))
            .await?;

        if failed >= self.max_failed_attempts {
            let until = now
                .checked_add_signed(self.lockout)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            self.store
                .lock_until(actor_key, BsonDateTime::from_chrono(until))
                .await?;
            warn!(actor_key, failed, %until, "Invite redemption locked out");
        }
        Ok(())
    }

    pub async fn record_success(&self, actor_key: &str) -> InviteResult<()> {
        self.store.clear_failures(actor_key).await?;
        Ok(())
    }
}

/// `lockout_secs` as a duration. Values `Settings::load` would reject fall
/// back to the default window.
fn lockout_window(lockout_secs: i64) -> Duration {
    match Duration::try_seconds(lockout_secs) {
        Some(window) if window > Duration::zero() => window,
        _ => {
            let fallback = RateLimitSettings::default().lockout_secs;
            warn!(lockout_secs, fallback, "Invalid lockout window, using default");
            Duration::seconds(fallback)
        }
    }
}

/// Whole minutes left, rounded up.
pub fn remaining_minutes(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (until - now).num_milliseconds().max(0);
    (millis + 59_999) / 60_000
}

/// Makes a raw client identifier (IP, forwarded-for header) safe to use
/// as a document key.
pub fn normalize_actor_key(raw: &str) -> String {
    let key: String = raw
        .chars()
        .take(MAX_ACTOR_KEY_LEN)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if key.is_empty() {
        "unknown".to_string()
    } else {
        key
    }
}
