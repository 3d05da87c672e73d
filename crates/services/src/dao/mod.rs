pub mod admin;
pub mod base;
pub mod invite;
pub mod invite_attempt;
pub mod registered_user;

pub use base::BaseDao;
