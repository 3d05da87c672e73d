use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use invitegate_services::auth::AuthError;
use invitegate_services::invite::{InviteError, Rejection};
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    Unauthenticated(String),
    BadRequest(String),
    Rejected(Rejection),
    Unavailable(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_minutes: Option<i64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, retry_after_minutes) = match self {
            ApiError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", msg, None)
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Rejected(rejection) => {
                let retry = match rejection {
                    Rejection::LockedOut { remaining_minutes } => Some(remaining_minutes),
                    _ => None,
                };
                (
                    rejection_status(rejection),
                    rejection.tag(),
                    rejection.to_string(),
                    retry,
                )
            }
            ApiError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "storage_unavailable",
                    "Storage temporarily unavailable".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            retry_after_minutes,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(minutes) = retry_after_minutes {
            if let Ok(value) = HeaderValue::from_str(&(minutes * 60).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

fn rejection_status(rejection: Rejection) -> StatusCode {
    match rejection {
        Rejection::Unauthorized => StatusCode::FORBIDDEN,
        Rejection::InvalidFormat => StatusCode::BAD_REQUEST,
        Rejection::LockedOut { .. } => StatusCode::TOO_MANY_REQUESTS,
        Rejection::NotFound => StatusCode::NOT_FOUND,
        Rejection::Revoked | Rejection::Expired | Rejection::UsesExhausted | Rejection::AlreadyUsed => {
            StatusCode::CONFLICT
        }
    }
}

impl From<InviteError> for ApiError {
    fn from(err: InviteError) -> Self {
        match err {
            InviteError::Rejected(rejection) => ApiError::Rejected(rejection),
            InviteError::StorageUnavailable(msg) => ApiError::Unavailable(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => ApiError::Unauthenticated("Token expired".to_string()),
            AuthError::InvalidToken(msg) => ApiError::Unauthenticated(msg),
        }
    }
}
