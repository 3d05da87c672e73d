use std::net::SocketAddr;

use invitegate_api::{build_router, state::AppState};
use invitegate_config::Settings;
use invitegate_db::{connect, indexes::ensure_indexes};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "invitegate_api=debug,invitegate_services=debug,invitegate_db=debug,tower_http=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!("Starting invitegate API on {}:{}", settings.app.host, settings.app.port);
    info!(
        max_failed_attempts = settings.rate_limit.max_failed_attempts,
        lockout_secs = settings.rate_limit.lockout_secs,
        initial_admins = settings.admin.initial_admins.len(),
        "Invite policy"
    );

    // Connect to MongoDB
    let db = connect(&settings).await?;

    // Ensure indexes
    ensure_indexes(&db).await?;

    let app = build_router(AppState::new(&db, settings.clone()));

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    // Peer addresses feed the rate-limit key when no proxy header is present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
