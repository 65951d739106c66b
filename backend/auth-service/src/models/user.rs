use chrono::{DateTime, Utc};
/// User model and request/response shapes
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// Default avatar for accounts with no provider picture.
pub const DEFAULT_AVATAR_URL: &str = "https://www.gravatar.com/avatar/?d=mp&f=y";

/// Which credential path is valid for the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "auth_provider", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Local,
    Google,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Local => "local",
            AuthProvider::Google => "google",
        }
    }
}

/// User model - the durable identity record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored normalized (trimmed, lowercased); globally unique.
    pub email: String,
    /// Present only for accounts with a local credential path.
    pub password_hash: Option<String>,
    /// Identity-provider subject id; unique when present.
    pub google_id: Option<String>,
    pub auth_provider: AuthProvider,
    pub avatar_url: String,
    /// Single active refresh token; overwriting it revokes the prior session.
    pub refresh_token: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A federated account's email is provider-verified and may not be
    /// changed through the local update path.
    pub fn is_federated(&self) -> bool {
        self.auth_provider != AuthProvider::Local
    }
}

/// Sanitized projection of a [`User`] for response bodies.
///
/// The password hash and refresh token are redacted here, at the boundary,
/// instead of relying on serializer behavior.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub auth_provider: AuthProvider,
    pub avatar_url: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            auth_provider: user.auth_provider,
            avatar_url: user.avatar_url.clone(),
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Minimal identity claim attached to authenticated requests.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityClaim {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Profile delivered by the identity provider after the OAuth exchange.
#[derive(Debug, Clone)]
pub struct FederatedProfile {
    pub provider_id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}
