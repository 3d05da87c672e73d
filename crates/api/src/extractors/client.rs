use std::{convert::Infallible, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use invitegate_services::invite::rate_limit::normalize_actor_key;

use crate::state::AppState;

/// Rate-limit key for the calling client: the socket peer address, or the
/// first `x-forwarded-for` hop when `app.trust_forwarded_for` is set.
/// Falls back to `unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl FromRequestParts<AppState> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let raw = if state.settings.app.trust_forwarded_for {
            forwarded_for(parts).or(peer)
        } else {
            peer
        };

        Ok(ClientKey(normalize_actor_key(&raw.unwrap_or_default())))
    }
}

fn forwarded_for(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
