use axum::{Json, extract::State};
use chrono::Utc;
use invitegate_services::invite::{Registration, RoleGrant};

use crate::{
    error::ApiError,
    extractors::auth::{AuthUser, MaybeAuthUser},
    state::AppState,
};

/// Anonymous callers are simply not registered.
pub async fn check(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
) -> Json<Registration> {
    let registration = match auth {
        Some(auth) => state.invites.check_registration(&auth.identity.uid).await,
        None => Registration::unregistered(),
    };
    Json(registration)
}

pub async fn setup_initial_admin(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<RoleGrant>, ApiError> {
    let grant = state
        .invites
        .setup_initial_admin(&auth.identity, Utc::now())
        .await?;

    Ok(Json(grant))
}
