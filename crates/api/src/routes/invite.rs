use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use invitegate_db::models::{Invite, InviteStatus};
use invitegate_services::invite::{CreateInvite, InvitePreview, RoleGrant};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, client::ClientKey},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub code: String,
    pub invite_url: String,
    pub role: String,
    pub max_uses: i64,
    pub current_uses: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by_email: String,
    pub status: InviteStatus,
    pub note: String,
}

impl InviteResponse {
    fn from_invite(state: &AppState, invite: Invite, now: DateTime<Utc>) -> Self {
        Self {
            invite_url: state.invites.invite_url(&invite.code),
            status: invite.status(now.into()),
            role: invite.role,
            max_uses: invite.max_uses,
            current_uses: invite.current_uses,
            expires_at: invite.expires_at.to_chrono(),
            created_at: invite.created_at.to_chrono(),
            created_by_email: invite.created_by_email,
            note: invite.note,
            code: invite.code,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(flatten)]
    pub preview: InvitePreview,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateInvite>,
) -> Result<(StatusCode, Json<InviteResponse>), ApiError> {
    let now = Utc::now();
    let invite = state
        .invites
        .create_invite(body, &auth.identity, now)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InviteResponse::from_invite(&state, invite, now)),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<InviteResponse>>, ApiError> {
    let now = Utc::now();
    let invites = state.invites.list_invites(&auth.identity).await?;

    Ok(Json(
        invites
            .into_iter()
            .map(|i| InviteResponse::from_invite(&state, i, now))
            .collect(),
    ))
}

/// Pre-signup check; no authentication required.
pub async fn validate(
    State(state): State<AppState>,
    ClientKey(actor_key): ClientKey,
    Json(body): Json<CodeRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let preview = state
        .invites
        .validate_invite(&body.code, &actor_key, Utc::now())
        .await?;

    Ok(Json(ValidateResponse {
        valid: true,
        preview,
    }))
}

pub async fn redeem(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientKey(actor_key): ClientKey,
    Json(body): Json<CodeRequest>,
) -> Result<Json<RoleGrant>, ApiError> {
    let grant = state
        .invites
        .redeem_invite(&body.code, &auth.identity, &actor_key, Utc::now())
        .await?;

    Ok(Json(grant))
}

pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .invites
        .revoke_invite(&code, &auth.identity, Utc::now())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
