use async_trait::async_trait;
use invitegate_db::models::Admin;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::store::AdminStore;

pub struct AdminDao {
    pub base: BaseDao<Admin>,
}

impl AdminDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Admin::COLLECTION),
        }
    }
}

#[async_trait]
impl AdminStore for AdminDao {
    async fn find_admin(&self, uid: &str) -> DaoResult<Option<Admin>> {
        self.base.find_by_id(uid).await
    }

    async fn upsert_admin(&self, admin: &Admin) -> DaoResult<()> {
        self.base.upsert_by_id(&admin.uid, admin).await
    }
}
