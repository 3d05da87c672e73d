use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bson::DateTime;
use dashmap::{DashMap, mapref::entry::Entry};
use invitegate_db::models::{Admin, Invite, InviteAttempt, InviteRedemption, RegisteredUser};

use super::{AdminStore, AttemptStore, InviteStore, RegistrationStore};
use crate::dao::base::{DaoError, DaoResult};

/// Process-local store with the same per-document atomicity as the
/// MongoDB DAOs. Every mutation runs while holding the DashMap entry lock
/// for its key.
#[derive(Default)]
pub struct MemoryStore {
    pub invites: DashMap<String, Invite>,
    pub attempts: DashMap<String, InviteAttempt>,
    pub admins: DashMap<String, Admin>,
    pub registrations: DashMap<String, RegisteredUser>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with [`DaoError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> DaoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DaoError::Unavailable("memory store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InviteStore for MemoryStore {
    async fn find_invite(&self, code: &str) -> DaoResult<Option<Invite>> {
        self.check()?;
        Ok(self.invites.get(code).map(|i| i.clone()))
    }

    async fn insert_invite(&self, invite: &Invite) -> DaoResult<()> {
        self.check()?;
        match self.invites.entry(invite.code.clone()) {
            Entry::Occupied(_) => Err(DaoError::DuplicateKey(invite.code.clone())),
            Entry::Vacant(slot) => {
                slot.insert(invite.clone());
                Ok(())
            }
        }
    }

    async fn append_redemption(
        &self,
        code: &str,
        expected_uses: i64,
        redemption: &InviteRedemption,
    ) -> DaoResult<bool> {
        self.check()?;
        let Some(mut invite) = self.invites.get_mut(code) else {
            return Ok(false);
        };
        if !invite.is_active || invite.current_uses != expected_uses {
            return Ok(false);
        }
        invite.current_uses += 1;
        invite.used_by.push(redemption.clone());
        Ok(true)
    }

    async fn deactivate_invite(
        &self,
        code: &str,
        revoked_by: &str,
        revoked_at: DateTime,
    ) -> DaoResult<bool> {
        self.check()?;
        let Some(mut invite) = self.invites.get_mut(code) else {
            return Ok(false);
        };
        if invite.is_active {
            invite.is_active = false;
            invite.revoked_at = Some(revoked_at);
            invite.revoked_by = Some(revoked_by.to_string());
        }
        Ok(true)
    }

    async fn list_invites(&self) -> DaoResult<Vec<Invite>> {
        self.check()?;
        let mut invites: Vec<Invite> = self.invites.iter().map(|i| i.clone()).collect();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invites)
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn find_attempt(&self, actor_key: &str) -> DaoResult<Option<InviteAttempt>> {
        self.check()?;
        Ok(self.attempts.get(actor_key).map(|a| a.clone()))
    }

    async fn increment_failures(&self, actor_key: &str, at: DateTime) -> DaoResult<i64> {
        self.check()?;
        let mut attempt = self
            .attempts
            .entry(actor_key.to_string())
            .or_insert_with(|| InviteAttempt::new(actor_key));
        attempt.failed_attempts += 1;
        attempt.last_attempt_at = Some(at);
        Ok(attempt.failed_attempts)
    }

    async fn lock_until(&self, actor_key: &str, until: DateTime) -> DaoResult<()> {
        self.check()?;
        self.attempts
            .entry(actor_key.to_string())
            .or_insert_with(|| InviteAttempt::new(actor_key))
            .locked_until = Some(until);
        Ok(())
    }

    async fn clear_failures(&self, actor_key: &str) -> DaoResult<()> {
        self.check()?;
        if let Some(mut attempt) = self.attempts.get_mut(actor_key) {
            attempt.failed_attempts = 0;
            attempt.locked_until = None;
        }
        Ok(())
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn find_admin(&self, uid: &str) -> DaoResult<Option<Admin>> {
        self.check()?;
        Ok(self.admins.get(uid).map(|a| a.clone()))
    }

    async fn upsert_admin(&self, admin: &Admin) -> DaoResult<()> {
        self.check()?;
        self.admins.insert(admin.uid.clone(), admin.clone());
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn find_registration(&self, uid: &str) -> DaoResult<Option<RegisteredUser>> {
        self.check()?;
        Ok(self.registrations.get(uid).map(|u| u.clone()))
    }

    async fn upsert_registration(&self, user: &RegisteredUser) -> DaoResult<()> {
        self.check()?;
        self.registrations.insert(user.uid.clone(), user.clone());
        Ok(())
    }
}
