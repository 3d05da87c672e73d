pub mod admin;
pub mod invite;
pub mod invite_attempt;
pub mod registered_user;

pub use admin::Admin;
pub use invite::{Invite, InviteRedemption, InviteStatus};
pub use invite_attempt::InviteAttempt;
pub use registered_user::RegisteredUser;
