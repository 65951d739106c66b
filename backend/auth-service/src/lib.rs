/// Auth Service Library
///
/// Authentication and session lifecycle: password and Google-federated
/// login, access/refresh token pairs with a single revocable refresh slot
/// per account, and reconciliation of federated identities onto existing
/// accounts.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `db`: Credential store (Postgres and in-memory backends)
/// - `error`: Error types
/// - `http`: axum router and handlers
/// - `models`: Data models
/// - `security`: Password hashing
/// - `services`: Session manager, identity reconciler, OAuth client
/// - `validators`: Input validation
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod security;
pub mod services;
pub mod validators;

// Re-export commonly used types
pub use error::{AuthError, Result};
pub use models::User;
pub use services::{AuthSession, SessionManager};
