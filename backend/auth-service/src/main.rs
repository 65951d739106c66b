/// Auth Service - main entry point.
///
/// Wires configuration, the Postgres-backed user store, the token codec,
/// and the Google OAuth client into the HTTP router.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use auth_service::{
    config::Settings,
    db::PgUserStore,
    http::{self, AppState},
    services::{GoogleOAuth, SessionManager},
};
use token_core::TokenCodec;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "auth_service=info,info".into()),
        )
        .with_target(false)
        .json()
        .init();

    info!("Starting auth service");

    let settings = Settings::load().context("Failed to load configuration")?;

    let db_pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout_secs))
        .connect(&settings.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    info!(
        "Database pool initialized with {} max connections",
        settings.database.max_connections
    );

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let codec = TokenCodec::new(settings.tokens.codec_config());
    let sessions = Arc::new(SessionManager::new(PgUserStore::new(db_pool), codec));
    let oauth = Arc::new(GoogleOAuth::new(settings.oauth.clone()));

    let state = AppState {
        sessions,
        oauth,
        server: settings.server.clone(),
    };
    let app = http::router(state)?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Auth service listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Auth service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
