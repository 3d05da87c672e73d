//! Pure redemption checks. No I/O, no clock: `now` is always passed in.

use chrono::{DateTime, Utc};
use invitegate_db::models::Invite;

use super::{error::Rejection, types::Identity};

/// Decides whether `redeemer` may consume `invite` at `now`.
///
/// Checks run in a fixed order and stop at the first failure: revoked,
/// expired, exhausted, then already used. A prior redemption matching on
/// either email or uid blocks the redeemer.
pub fn can_redeem(
    invite: &Invite,
    redeemer: &Identity,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    can_preview(invite, now)?;

    let already_used = invite.used_by.iter().any(|prior| {
        (!redeemer.email.is_empty() && prior.email == redeemer.email)
            || (!redeemer.uid.is_empty() && prior.uid == redeemer.uid)
    });
    if already_used {
        return Err(Rejection::AlreadyUsed);
    }

    Ok(())
}

/// The identity-independent subset of [`can_redeem`].
pub fn can_preview(invite: &Invite, now: DateTime<Utc>) -> Result<(), Rejection> {
    if !invite.is_active {
        return Err(Rejection::Revoked);
    }
    if invite.expires_at.to_chrono() <= now {
        return Err(Rejection::Expired);
    }
    if !invite.is_unlimited() && invite.current_uses >= invite.max_uses {
        return Err(Rejection::UsesExhausted);
    }
    Ok(())
}
