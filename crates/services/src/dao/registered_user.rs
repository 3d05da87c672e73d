use async_trait::async_trait;
use invitegate_db::models::RegisteredUser;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::store::RegistrationStore;

pub struct RegisteredUserDao {
    pub base: BaseDao<RegisteredUser>,
}

impl RegisteredUserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, RegisteredUser::COLLECTION),
        }
    }
}

#[async_trait]
impl RegistrationStore for RegisteredUserDao {
    async fn find_registration(&self, uid: &str) -> DaoResult<Option<RegisteredUser>> {
        self.base.find_by_id(uid).await
    }

    async fn upsert_registration(&self, user: &RegisteredUser) -> DaoResult<()> {
        self.base.upsert_by_id(&user.uid, user).await
    }
}
