pub mod health;
pub mod invite;
pub mod registration;
