//! Invite-code lifecycle: sanitize, generate, validate, rate-limit,
//! authorize, and the orchestrating [`InviteService`].

pub mod admin;
pub mod code;
pub mod error;
pub mod rate_limit;
pub mod record;
pub mod service;
pub mod types;
pub mod validator;


pub use admin::AdminAuthorizer;
pub use error::{InviteError, InviteResult, Rejection};
pub use rate_limit::RateLimiter;
pub use service::InviteService;
pub use types::{CreateInvite, Identity, InvitePreview, Registration, RoleGrant};
