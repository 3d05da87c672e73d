use std::sync::Arc;

use bson::DateTime as BsonDateTime;
use chrono::{DateTime, Utc};
use invitegate_config::{AdminSettings, InviteSettings, Settings};
use invitegate_db::models::{Admin, Invite, InviteRedemption, RegisteredUser};
use tracing::{debug, info, warn};

use super::{
    admin::AdminAuthorizer,
    code::{CodeSource, RandomCodes, is_acceptable_length, sanitize},
    error::{InviteError, InviteResult, Rejection},
    rate_limit::RateLimiter,
    record::{ROLE_ADMIN, new_invite},
    types::{CreateInvite, Identity, InvitePreview, Registration, RoleGrant},
    validator::{can_preview, can_redeem},
};
use crate::{
    dao::base::DaoError,
    store::{AdminStore, InviteStore, RegistrationStore, Stores},
};

/// Issuer recorded on invites created by operator tooling.
pub const SYSTEM_ISSUER: &str = "system";

/// Create, redeem and revoke invites. Holds no per-request state; all
/// durable state goes through the injected stores.
pub struct InviteService {
    invites: Arc<dyn InviteStore>,
    admins: Arc<dyn AdminStore>,
    registrations: Arc<dyn RegistrationStore>,
    authorizer: AdminAuthorizer,
    rate_limiter: RateLimiter,
    codes: Box<dyn CodeSource>,
    settings: InviteSettings,
    admin_settings: AdminSettings,
}

impl InviteService {
    pub fn new(stores: Stores, settings: &Settings) -> Self {
        Self {
            authorizer: AdminAuthorizer::new(stores.admins.clone()),
            rate_limiter: RateLimiter::new(stores.attempts.clone(), &settings.rate_limit),
            invites: stores.invites,
            admins: stores.admins,
            registrations: stores.registrations,
            codes: Box::new(RandomCodes),
            settings: settings.invites.clone(),
            admin_settings: settings.admin.clone(),
        }
    }

    pub fn with_code_source(mut self, codes: impl CodeSource + 'static) -> Self {
        self.codes = Box::new(codes);
        self
    }

    pub fn authorizer(&self) -> &AdminAuthorizer {
        &self.authorizer
    }

    pub fn invite_url(&self, code: &str) -> String {
        format!("{}?invite={}", self.settings.public_base_url, code)
    }

    pub async fn create_invite(
        &self,
        request: CreateInvite,
        actor: &Identity,
        now: DateTime<Utc>,
    ) -> InviteResult<Invite> {
        self.authorizer.require(&actor.uid).await?;
        let invite = self.insert_unique(&request, actor, now).await?;
        info!(code = %invite.code, created_by = %actor.email, "Invite created");
        Ok(invite)
    }

    /// Creates an invite without the admin gate, attributed to
    /// [`SYSTEM_ISSUER`]. For operator tooling that already holds direct
    /// database access.
    pub async fn create_system_invite(
        &self,
        request: CreateInvite,
        operator_email: &str,
        now: DateTime<Utc>,
    ) -> InviteResult<Invite> {
        let issuer = Identity::new(SYSTEM_ISSUER, operator_email);
        let invite = self.insert_unique(&request, &issuer, now).await?;
        info!(code = %invite.code, operator = operator_email, "System invite created");
        Ok(invite)
    }

    async fn insert_unique(
        &self,
        request: &CreateInvite,
        issuer: &Identity,
        now: DateTime<Utc>,
    ) -> InviteResult<Invite> {
        for _ in 0..self.settings.max_generation_attempts.max(1) {
            let invite = new_invite(
                self.codes.next_code(),
                request,
                self.settings.default_expiry_days,
                issuer,
                now,
            );
            match self.invites.insert_invite(&invite).await {
                Ok(()) => return Ok(invite),
                Err(DaoError::DuplicateKey(_)) => {
                    warn!(code = %invite.code, "Generated invite code collided, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(InviteError::StorageUnavailable(
            "could not allocate a unique invite code".to_string(),
        ))
    }

    /// Consumes one use of `code` for `redeemer`.
    ///
    /// Format is checked before anything touches storage; the rate-limit
    /// gate runs before the invite is loaded, so a locked-out actor learns
    /// nothing about the code. Every lookup or validation failure counts
    /// against `actor_key`.
    pub async fn redeem_invite(
        &self,
        code: &str,
        redeemer: &Identity,
        actor_key: &str,
        now: DateTime<Utc>,
    ) -> InviteResult<RoleGrant> {
        let code = sanitize(code);
        if !is_acceptable_length(&code) {
            return Err(Rejection::InvalidFormat.into());
        }

        self.rate_limiter.check_allowed(actor_key, now).await?;

        let redemption = InviteRedemption {
            email: redeemer.email.clone(),
            uid: redeemer.uid.clone(),
            redeemed_at: BsonDateTime::from_chrono(now),
        };

        let mut conflicts = 0;
        let invite = loop {
            let Some(invite) = self.invites.find_invite(&code).await? else {
                return self.reject(actor_key, now, Rejection::NotFound).await;
            };
            if let Err(rejection) = can_redeem(&invite, redeemer, now) {
                return self.reject(actor_key, now, rejection).await;
            }

            // The write only lands if nobody redeemed or revoked since the
            // read above; otherwise re-read and re-validate.
            if self
                .invites
                .append_redemption(&code, invite.current_uses, &redemption)
                .await?
            {
                break invite;
            }

            conflicts += 1;
            if conflicts >= self.settings.max_commit_attempts.max(1) {
                warn!(code = %code, conflicts, "Gave up redeeming contended invite");
                return Err(InviteError::StorageUnavailable(
                    "invite is under heavy contention".to_string(),
                ));
            }
            debug!(code = %code, conflicts, "Concurrent redemption, retrying");
        };

        // The redemption is committed; bookkeeping below must not turn it
        // into a reported failure.
        if let Err(e) = self.rate_limiter.record_success(actor_key).await {
            warn!(actor_key, error = %e, "Failed to clear rate limit after redemption");
        }
        let registered = RegisteredUser {
            uid: redeemer.uid.clone(),
            email: redeemer.email.clone(),
            invite_code: code.clone(),
            role: invite.role.clone(),
            registered_at: BsonDateTime::from_chrono(now),
        };
        if let Err(e) = self.registrations.upsert_registration(&registered).await {
            warn!(uid = %redeemer.uid, error = %e, "Failed to record registration");
        }

        info!(code = %code, email = %redeemer.email, role = %invite.role, "Invite redeemed");
        Ok(RoleGrant { role: invite.role })
    }

    async fn reject<T>(
        &self,
        actor_key: &str,
        now: DateTime<Utc>,
        rejection: Rejection,
    ) -> InviteResult<T> {
        self.rate_limiter.record_failure(actor_key, now).await?;
        debug!(actor_key, reason = rejection.tag(), "Invite rejected");
        Err(rejection.into())
    }

    /// Checks a code before sign-up without consuming it. Goes through the
    /// same rate-limit gate as redemption; misses count as failures, but a
    /// good preview does not reset the counter. Only redemption does.
    pub async fn validate_invite(
        &self,
        code: &str,
        actor_key: &str,
        now: DateTime<Utc>,
    ) -> InviteResult<InvitePreview> {
        let code = sanitize(code);
        if !is_acceptable_length(&code) {
            return Err(Rejection::InvalidFormat.into());
        }

        self.rate_limiter.check_allowed(actor_key, now).await?;

        let Some(invite) = self.invites.find_invite(&code).await? else {
            return self.reject(actor_key, now, Rejection::NotFound).await;
        };
        if let Err(rejection) = can_preview(&invite, now) {
            return self.reject(actor_key, now, rejection).await;
        }

        Ok(InvitePreview {
            remaining_uses: invite.remaining_uses(),
            expires_at: invite.expires_at.to_chrono(),
            role: invite.role,
        })
    }

    /// Deactivates an invite. Revoking twice is a success.
    pub async fn revoke_invite(
        &self,
        code: &str,
        actor: &Identity,
        now: DateTime<Utc>,
    ) -> InviteResult<()> {
        self.authorizer.require(&actor.uid).await?;
        let code = self.deactivate(code, &actor.uid, now).await?;
        info!(code = %code, revoked_by = %actor.email, "Invite revoked");
        Ok(())
    }

    /// Revokes without the admin gate, attributed to [`SYSTEM_ISSUER`].
    /// Returns the sanitized code that was revoked.
    pub async fn revoke_system_invite(
        &self,
        code: &str,
        operator_email: &str,
        now: DateTime<Utc>,
    ) -> InviteResult<String> {
        let code = self.deactivate(code, SYSTEM_ISSUER, now).await?;
        info!(code = %code, operator = operator_email, "Invite revoked by operator");
        Ok(code)
    }

    async fn deactivate(
        &self,
        code: &str,
        revoked_by: &str,
        now: DateTime<Utc>,
    ) -> InviteResult<String> {
        let code = sanitize(code);
        if !is_acceptable_length(&code) {
            return Err(Rejection::InvalidFormat.into());
        }

        let found = self
            .invites
            .deactivate_invite(&code, revoked_by, BsonDateTime::from_chrono(now))
            .await?;
        if !found {
            return Err(Rejection::NotFound.into());
        }
        Ok(code)
    }

    pub async fn list_invites(&self, actor: &Identity) -> InviteResult<Vec<Invite>> {
        self.authorizer.require(&actor.uid).await?;
        self.list_all_invites().await
    }

    /// Ungated listing for operator tooling.
    pub async fn list_all_invites(&self) -> InviteResult<Vec<Invite>> {
        Ok(self.invites.list_invites().await?)
    }

    /// Whether `uid` got in through an invite. Admins count as registered.
    /// Lookup faults report "not registered".
    pub async fn check_registration(&self, uid: &str) -> Registration {
        match self.registrations.find_registration(uid).await {
            Ok(Some(user)) => {
                return Registration {
                    registered: true,
                    role: Some(user.role),
                    registered_at: Some(user.registered_at.to_chrono()),
                };
            }
            Ok(None) => {}
            Err(e) => {
                warn!(uid, error = %e, "Registration lookup failed");
                return Registration::unregistered();
            }
        }

        if self.authorizer.is_authorized(uid).await {
            Registration {
                registered: true,
                role: Some(ROLE_ADMIN.to_string()),
                registered_at: None,
            }
        } else {
            Registration::unregistered()
        }
    }

    /// Grants admin to `uid` without any gate. Operator tooling only.
    pub async fn grant_admin(
        &self,
        uid: &str,
        email: &str,
        granted_by: &str,
        now: DateTime<Utc>,
    ) -> InviteResult<()> {
        self.admins
            .upsert_admin(&Admin {
                uid: uid.to_string(),
                is_admin: true,
                email: Some(email.to_string()),
                created_at: Some(BsonDateTime::from_chrono(now)),
                created_by: Some(granted_by.to_string()),
            })
            .await?;
        info!(uid, email, granted_by, "Admin granted");
        Ok(())
    }

    /// Promotes `actor` to admin when their email is on the configured
    /// bootstrap list.
    pub async fn setup_initial_admin(
        &self,
        actor: &Identity,
        now: DateTime<Utc>,
    ) -> InviteResult<RoleGrant> {
        let allowed = self
            .admin_settings
            .initial_admins
            .iter()
            .any(|email| email.eq_ignore_ascii_case(&actor.email));
        if !allowed || actor.uid.is_empty() {
            return Err(Rejection::Unauthorized.into());
        }

        self.grant_admin(&actor.uid, &actor.email, "setup_initial_admin", now)
            .await?;
        self.registrations
            .upsert_registration(&RegisteredUser {
                uid: actor.uid.clone(),
                email: actor.email.clone(),
                invite_code: RegisteredUser::INITIAL_ADMIN_CODE.to_string(),
                role: ROLE_ADMIN.to_string(),
                registered_at: BsonDateTime::from_chrono(now),
            })
            .await?;

        info!(email = %actor.email, "Initial admin setup complete");
        Ok(RoleGrant {
            role: ROLE_ADMIN.to_string(),
        })
    }
}
