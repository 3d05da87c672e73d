use thiserror::Error;

use crate::dao::base::DaoError;

/// Expected, user-recoverable outcomes of an invite operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Admin access required")]
    Unauthorized,
    #[error("Invalid invite code format")]
    InvalidFormat,
    #[error("Too many failed attempts. Try again in {remaining_minutes} minutes.")]
    LockedOut { remaining_minutes: i64 },
    #[error("Invalid invite code")]
    NotFound,
    #[error("This invite has been revoked")]
    Revoked,
    #[error("This invite has expired")]
    Expired,
    #[error("This invite has reached its usage limit")]
    UsesExhausted,
    #[error("This invite has already been used by this account")]
    AlreadyUsed,
}

impl Rejection {
    /// Stable machine-readable tag for callers to render.
    pub fn tag(&self) -> &'static str {
        match self {
            Rejection::Unauthorized => "unauthorized",
            Rejection::InvalidFormat => "invalid_format",
            Rejection::LockedOut { .. } => "locked_out",
            Rejection::NotFound => "not_found",
            Rejection::Revoked => "revoked",
            Rejection::Expired => "expired",
            Rejection::UsesExhausted => "uses_exhausted",
            Rejection::AlreadyUsed => "already_used",
        }
    }
}

#[derive(Debug, Error)]
pub enum InviteError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl InviteError {
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            InviteError::Rejected(r) => Some(*r),
            InviteError::StorageUnavailable(_) => None,
        }
    }
}

impl From<DaoError> for InviteError {
    fn from(err: DaoError) -> Self {
        InviteError::StorageUnavailable(err.to_string())
    }
}

pub type InviteResult<T> = Result<T, InviteError>;
