use invitegate_config::Settings;
use invitegate_services::{AuthService, InviteService, Stores};
use mongodb::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub invites: Arc<InviteService>,
}

impl AppState {
    pub fn new(db: &Database, settings: Settings) -> Self {
        Self::with_stores(Stores::mongo(db), settings)
    }

    pub fn with_stores(stores: Stores, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let invites = Arc::new(InviteService::new(stores, &settings));

        Self {
            settings,
            auth,
            invites,
        }
    }
}
