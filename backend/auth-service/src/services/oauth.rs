/// Google OAuth 2.0 client.
///
/// Owns the authorization-URL construction, the one-time state tokens, and
/// the code-for-profile exchange. The reconciliation of the returned profile
/// onto an account happens in `services::reconcile`, not here.
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::OAuthSettings;
use crate::error::{AuthError, Result};
use crate::models::user::FederatedProfile;

const OAUTH_STATE_TTL_SECS: i64 = 600; // 10 minutes

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub struct GoogleOAuth {
    config: OAuthSettings,
    http: Client,
    /// One-time state tokens issued by `authorization_url`, keyed by value.
    /// In-process because the service runs as a single instance.
    pending_states: DashMap<String, DateTime<Utc>>,
}

impl GoogleOAuth {
    pub fn new(config: OAuthSettings) -> Self {
        Self {
            config,
            http: Client::new(),
            pending_states: DashMap::new(),
        }
    }

    /// Build the consent-page URL with a fresh one-time state token.
    pub fn authorization_url(&self) -> Result<String> {
        let client_id = self.config.google_client_id.as_ref().ok_or_else(|| {
            AuthError::OAuth("Google client ID not configured".to_string())
        })?;

        self.purge_expired_states();
        let state = Uuid::new_v4().to_string();
        self.pending_states.insert(state.clone(), Utc::now());

        Ok(format!(
            "{GOOGLE_AUTH_URL}?client_id={}&redirect_uri={}&response_type=code&scope=openid%20profile%20email&state={}",
            client_id,
            urlencoding::encode(&self.config.google_callback_url),
            state
        ))
    }

    /// Complete the flow: verify the state token, trade the authorization
    /// code for an access token, and fetch the user's profile.
    pub async fn exchange_code(&self, state: &str, code: &str) -> Result<FederatedProfile> {
        if !self.consume_state(state) {
            return Err(AuthError::InvalidOAuthState);
        }

        let client_id = self.config.google_client_id.as_ref().ok_or_else(|| {
            AuthError::OAuth("Google client ID not configured".to_string())
        })?;
        let client_secret = self.config.google_client_secret.as_ref().ok_or_else(|| {
            AuthError::OAuth("Google client secret not configured".to_string())
        })?;

        let token_response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", &self.config.google_callback_url),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AuthError::OAuth(format!("Token exchange failed: {e}")))?;

        let tokens: GoogleTokenResponse = token_response.json().await?;

        let user_info: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&tokens.access_token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AuthError::OAuth(format!("Userinfo fetch failed: {e}")))?
            .json()
            .await?;

        let email = user_info.email.unwrap_or_default();
        let display_name = user_info
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or("user").to_string());

        Ok(FederatedProfile {
            provider_id: user_info.id,
            email,
            display_name,
            avatar_url: user_info.picture,
        })
    }

    /// Remove and check a state token. One-time use: a second presentation
    /// of the same value fails.
    fn consume_state(&self, state: &str) -> bool {
        match self.pending_states.remove(state) {
            Some((_, issued_at)) => {
                Utc::now() - issued_at < Duration::seconds(OAUTH_STATE_TTL_SECS)
            }
            None => false,
        }
    }

    fn purge_expired_states(&self) {
        let cutoff = Utc::now() - Duration::seconds(OAUTH_STATE_TTL_SECS);
        self.pending_states.retain(|_, issued_at| *issued_at > cutoff);
    }
}

#[derive(Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oauth() -> GoogleOAuth {
        GoogleOAuth::new(OAuthSettings {
            google_client_id: Some("client-id".to_string()),
            google_client_secret: Some("client-secret".to_string()),
            google_callback_url: "http://localhost:5000/api/auth/google/callback".to_string(),
        })
    }

    #[test]
    fn authorization_url_carries_client_and_state() {
        let oauth = oauth();
        let url = oauth.authorization_url().unwrap();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("scope=openid%20profile%20email"));
        assert!(url.contains("state="));
    }

    #[test]
    fn state_token_is_single_use() {
        let oauth = oauth();
        let url = oauth.authorization_url().unwrap();
        let state = url.split("state=").nth(1).unwrap().to_string();

        assert!(oauth.consume_state(&state));
        assert!(!oauth.consume_state(&state));
    }

    #[test]
    fn unknown_state_is_rejected() {
        let oauth = oauth();
        assert!(!oauth.consume_state("never-issued"));
    }

    #[test]
    fn missing_client_id_is_a_config_error() {
        let oauth = GoogleOAuth::new(OAuthSettings {
            google_client_id: None,
            google_client_secret: None,
            google_callback_url: String::new(),
        });

        assert!(matches!(
            oauth.authorization_url(),
            Err(AuthError::OAuth(_))
        ));
    }
}
