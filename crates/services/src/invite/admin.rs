use std::sync::Arc;

use tracing::warn;

use super::error::{InviteResult, Rejection};
use crate::store::AdminStore;

/// Fail-closed admin privilege check.
pub struct AdminAuthorizer {
    store: Arc<dyn AdminStore>,
}

impl AdminAuthorizer {
    pub fn new(store: Arc<dyn AdminStore>) -> Self {
        Self { store }
    }

    /// True only when an admin record exists for `actor_id` with
    /// `is_admin == true`. Lookup faults and unreadable records deny.
    pub async fn is_authorized(&self, actor_id: &str) -> bool {
        if actor_id.is_empty() {
            return false;
        }
        match self.store.find_admin(actor_id).await {
            Ok(Some(admin)) => admin.is_admin,
            Ok(None) => false,
            Err(e) => {
                warn!(actor_id, error = %e, "Admin lookup failed, denying");
                false
            }
        }
    }

    pub async fn require(&self, actor_id: &str) -> InviteResult<()> {
        if self.is_authorized(actor_id).await {
            Ok(())
        } else {
            Err(Rejection::Unauthorized.into())
        }
    }
}
