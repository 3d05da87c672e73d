use async_trait::async_trait;
use bson::{doc, DateTime};
use invitegate_db::models::{Invite, InviteRedemption};
use mongodb::Database;
use tracing::debug;

use super::base::{BaseDao, DaoResult};
use crate::store::InviteStore;

pub struct InviteDao {
    pub base: BaseDao<Invite>,
}

impl InviteDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Invite::COLLECTION),
        }
    }
}

#[async_trait]
impl InviteStore for InviteDao {
    async fn find_invite(&self, code: &str) -> DaoResult<Option<Invite>> {
        self.base.find_by_id(code).await
    }

    async fn insert_invite(&self, invite: &Invite) -> DaoResult<()> {
        self.base.insert_one(invite).await
    }

    async fn append_redemption(
        &self,
        code: &str,
        expected_uses: i64,
        redemption: &InviteRedemption,
    ) -> DaoResult<bool> {
        // Conditional single-document write: the filter re-asserts the state
        // the caller validated, so a concurrent redemption makes this a no-op.
        let (matched, _) = self
            .base
            .update_one(
                doc! {
                    "_id": code,
                    "is_active": true,
                    "current_uses": expected_uses,
                },
                doc! {
                    "$inc": { "current_uses": 1_i64 },
                    "$push": { "used_by": bson::to_bson(redemption)? },
                },
            )
            .await?;

        debug!(code, expected_uses, applied = matched == 1, "Redemption commit");
        Ok(matched == 1)
    }

    async fn deactivate_invite(
        &self,
        code: &str,
        revoked_by: &str,
        revoked_at: DateTime,
    ) -> DaoResult<bool> {
        let (matched, _) = self
            .base
            .update_one(
                doc! { "_id": code, "is_active": true },
                doc! {
                    "$set": {
                        "is_active": false,
                        "revoked_at": revoked_at,
                        "revoked_by": revoked_by,
                    }
                },
            )
            .await?;

        if matched == 1 {
            return Ok(true);
        }
        // Already revoked, or never existed.
        Ok(self.base.count(doc! { "_id": code }).await? > 0)
    }

    async fn list_invites(&self) -> DaoResult<Vec<Invite>> {
        self.base
            .find_many(doc! {}, Some(doc! { "created_at": -1 }))
            .await
    }
}
