//! Storage seams the invite engine is written against.
//!
//! Each trait names the document operations the engine relies on; every
//! mutating method is a single atomic document operation in the MongoDB
//! implementations under [`crate::dao`], and holds the per-key entry lock
//! in [`memory::MemoryStore`].

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use bson::DateTime;
use invitegate_db::models::{Admin, Invite, InviteAttempt, InviteRedemption, RegisteredUser};
use mongodb::Database;

use crate::dao::{
    admin::AdminDao, base::DaoResult, invite::InviteDao, invite_attempt::InviteAttemptDao,
    registered_user::RegisteredUserDao,
};

#[async_trait]
pub trait InviteStore: Send + Sync {
    async fn find_invite(&self, code: &str) -> DaoResult<Option<Invite>>;

    /// Fails with [`DaoError::DuplicateKey`](crate::dao::base::DaoError::DuplicateKey)
    /// when an invite with the same code already exists.
    async fn insert_invite(&self, invite: &Invite) -> DaoResult<()>;

    /// Increments `current_uses` and appends `redemption` to `used_by`, but
    /// only while the stored invite is still active and its `current_uses`
    /// equals `expected_uses`. Returns whether the write was applied.
    async fn append_redemption(
        &self,
        code: &str,
        expected_uses: i64,
        redemption: &InviteRedemption,
    ) -> DaoResult<bool>;

    /// Marks the invite inactive. The first revocation stamps `revoked_at`
    /// and `revoked_by`; later ones leave them alone. Returns `false` when
    /// no invite has this code.
    async fn deactivate_invite(
        &self,
        code: &str,
        revoked_by: &str,
        revoked_at: DateTime,
    ) -> DaoResult<bool>;

    /// Newest first.
    async fn list_invites(&self) -> DaoResult<Vec<Invite>>;
}

#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn find_attempt(&self, actor_key: &str) -> DaoResult<Option<InviteAttempt>>;

    /// Atomically increments `failed_attempts`, creating the record when
    /// missing, and returns the new count.
    async fn increment_failures(&self, actor_key: &str, at: DateTime) -> DaoResult<i64>;

    async fn lock_until(&self, actor_key: &str, until: DateTime) -> DaoResult<()>;

    /// Resets the counter and lifts any lock. The record itself is kept.
    async fn clear_failures(&self, actor_key: &str) -> DaoResult<()>;
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_admin(&self, uid: &str) -> DaoResult<Option<Admin>>;
    async fn upsert_admin(&self, admin: &Admin) -> DaoResult<()>;
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn find_registration(&self, uid: &str) -> DaoResult<Option<RegisteredUser>>;
    async fn upsert_registration(&self, user: &RegisteredUser) -> DaoResult<()>;
}

/// The full set of collaborators the engine needs.
#[derive(Clone)]
pub struct Stores {
    pub invites: Arc<dyn InviteStore>,
    pub attempts: Arc<dyn AttemptStore>,
    pub admins: Arc<dyn AdminStore>,
    pub registrations: Arc<dyn RegistrationStore>,
}

impl Stores {
    pub fn mongo(db: &Database) -> Self {
        Self {
            invites: Arc::new(InviteDao::new(db)),
            attempts: Arc::new(InviteAttemptDao::new(db)),
            admins: Arc::new(AdminDao::new(db)),
            registrations: Arc::new(RegisteredUserDao::new(db)),
        }
    }

    /// All four seams backed by one shared in-memory store.
    pub fn memory(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            invites: store.clone(),
            attempts: store.clone(),
            admins: store.clone(),
            registrations: store,
        }
    }
}
