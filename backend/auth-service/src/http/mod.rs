/// HTTP surface: router, shared state, and handlers.
pub mod auth;
pub mod cookies;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerSettings;
use crate::db::PgUserStore;
use crate::services::{GoogleOAuth, SessionManager};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager<PgUserStore>>,
    pub oauth: Arc<GoogleOAuth>,
    pub server: ServerSettings,
}

pub fn router(state: AppState) -> anyhow::Result<Router> {
    let allow_origin = state
        .server
        .client_url
        .parse::<HeaderValue>()
        .context("CLIENT_URL is not a valid origin")?;

    // Credentialed CORS requires explicit origin, methods, and headers.
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/healthz", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/google", get(auth::google_start))
        .route("/api/auth/google/callback", get(auth::google_callback))
        .route("/api/auth/refresh-token", post(auth::refresh_token))
        .route(
            "/api/auth/profile",
            get(auth::get_profile).patch(auth::update_profile),
        )
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/account", delete(auth::delete_account))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
