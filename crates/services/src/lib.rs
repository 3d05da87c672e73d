pub mod auth;
pub mod dao;
pub mod invite;
pub mod store;

pub use auth::AuthService;
pub use invite::InviteService;
pub use store::Stores;
