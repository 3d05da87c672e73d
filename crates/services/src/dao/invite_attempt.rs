use async_trait::async_trait;
use bson::{doc, DateTime};
use invitegate_db::models::InviteAttempt;
use mongodb::{Database, options::ReturnDocument};

use super::base::{BaseDao, DaoResult};
use crate::store::AttemptStore;

pub struct InviteAttemptDao {
    pub base: BaseDao<InviteAttempt>,
}

impl InviteAttemptDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, InviteAttempt::COLLECTION),
        }
    }
}

#[async_trait]
impl AttemptStore for InviteAttemptDao {
    async fn find_attempt(&self, actor_key: &str) -> DaoResult<Option<InviteAttempt>> {
        self.base.find_by_id(actor_key).await
    }

    async fn increment_failures(&self, actor_key: &str, at: DateTime) -> DaoResult<i64> {
        let updated = self
            .base
            .collection()
            .find_one_and_update(
                doc! { "_id": actor_key },
                doc! {
                    "$inc": { "failed_attempts": 1_i64 },
                    "$set": { "last_attempt_at": at },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated.map(|a| a.failed_attempts).unwrap_or(1))
    }

    async fn lock_until(&self, actor_key: &str, until: DateTime) -> DaoResult<()> {
        self.base
            .collection()
            .update_one(
                doc! { "_id": actor_key },
                doc! { "$set": { "locked_until": until } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn clear_failures(&self, actor_key: &str) -> DaoResult<()> {
        self.base
            .update_one(
                doc! { "_id": actor_key },
                doc! { "$set": { "failed_attempts": 0_i64, "locked_until": null } },
            )
            .await?;
        Ok(())
    }
}
