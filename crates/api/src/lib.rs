pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);

    let invite_routes = Router::new()
        .route("/", get(routes::invite::list).post(routes::invite::create))
        .route("/validate", post(routes::invite::validate))
        .route("/redeem", post(routes::invite::redeem))
        .route("/{code}", delete(routes::invite::revoke));

    let api = Router::new()
        .nest("/invite", invite_routes)
        .route("/registration", get(routes::registration::check))
        .route("/admin/setup", post(routes::registration::setup_initial_admin));

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
