use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// One opaque failure for no-such-user, federated-only account, and bad
    /// password alike, so callers cannot enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authorization token not found. Please log in")]
    MissingToken,

    #[error("The access token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid or expired refresh token")]
    TokenRevoked,

    /// The subject of a valid token no longer exists.
    #[error("User no longer exists")]
    Unauthenticated,

    #[error("User not found")]
    UserNotFound,

    #[error("Cannot change email for federated accounts")]
    EmailChangeForbidden,

    #[error("No changes detected. Provided values are same as current values.")]
    NothingToUpdate,

    #[error("Invalid OAuth state")]
    InvalidOAuthState,

    #[error("Database error: {0}")]
    Database(String),

    #[error("OAuth provider error: {0}")]
    OAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-checkable kind, serialized in every failure body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::InvalidCredentials => "invalid_credentials",
            Self::MissingToken => "missing_token",
            Self::TokenExpired => "token_expired",
            Self::InvalidToken => "invalid_token",
            Self::TokenRevoked => "token_revoked",
            Self::Unauthenticated => "unauthenticated",
            Self::UserNotFound => "not_found",
            Self::EmailChangeForbidden => "email_change_forbidden",
            Self::NothingToUpdate => "no_changes",
            Self::InvalidOAuthState => "invalid_oauth_state",
            Self::Database(_) | Self::OAuth(_) => "dependency_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::Conflict(_)
            | Self::NothingToUpdate
            | Self::InvalidOAuthState => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::TokenRevoked | Self::EmailChangeForbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::OAuth(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Internal detail stays in the server logs, never in the body.
        let message = match &self {
            Self::Database(_) | Self::OAuth(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "success": false,
            "error": self.kind(),
            "message": message,
        });
        if matches!(self, Self::TokenExpired) {
            body["expired"] = json!(true);
        }

        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AuthError::Conflict("This value is already in use".to_string());
            }
        }
        tracing::error!("Database error: {err}");
        AuthError::Database(err.to_string())
    }
}

impl From<token_core::Error> for AuthError {
    fn from(err: token_core::Error) -> Self {
        match err {
            token_core::Error::Expired => AuthError::TokenExpired,
            token_core::Error::Invalid => AuthError::InvalidToken,
            token_core::Error::Signing(e) => {
                tracing::error!("Token signing failed: {e}");
                AuthError::Internal(e.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("OAuth provider request failed: {err}");
        AuthError::OAuth(err.to_string())
    }
}
