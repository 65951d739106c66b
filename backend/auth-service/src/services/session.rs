/// Session lifecycle: credential verification, token issuance and
/// revocation, and the profile write path.
///
/// Each operation is an independent unit of work; the user store is the only
/// shared state. The service keeps a single refresh-token slot per account,
/// so issuing a new pair implicitly revokes the previous session.
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use token_core::{TokenCodec, TokenKind, TokenPair};

use crate::db::{NewUser, UserStore};
use crate::error::{AuthError, Result};
use crate::models::user::{
    AuthProvider, FederatedProfile, IdentityClaim, LoginRequest, RegisterRequest,
    UpdateProfileRequest, User, DEFAULT_AVATAR_URL,
};
use crate::security::{hash_password, verify_password};
use crate::services::reconcile::{reconcile, LinkOutcome};
use crate::validators;

/// A logged-in account plus its freshly issued token pair.
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct SessionManager<S> {
    store: S,
    codec: TokenCodec,
}

impl<S: UserStore> SessionManager<S> {
    pub fn new(store: S, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create a local account and open its first session.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthSession> {
        let name = req.name.trim().to_string();
        if !validators::validate_name(&name) {
            return Err(AuthError::Validation(
                "Name must be between 2 and 50 characters".to_string(),
            ));
        }

        let email = validators::normalize_email(&req.email);
        if !validators::validate_email(&email) {
            return Err(AuthError::Validation("Invalid email format".to_string()));
        }

        if !validators::validate_password(&req.password) {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                validators::PASSWORD_MIN_CHARS
            )));
        }

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .store
            .insert(NewUser {
                name,
                email,
                password_hash: Some(password_hash),
                google_id: None,
                auth_provider: AuthProvider::Local,
                avatar_url: DEFAULT_AVATAR_URL.to_string(),
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        self.open_session(user).await
    }

    /// Verify local credentials and open a session.
    ///
    /// All failure shapes (unknown email, federated-only account, wrong
    /// password) collapse into the same opaque error.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthSession> {
        let email = validators::normalize_email(&req.email);
        if email.is_empty() || req.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = match (&user.password_hash, user.is_federated()) {
            (Some(hash), false) => hash.clone(),
            _ => return Err(AuthError::InvalidCredentials),
        };

        if !verify_password(&req.password, &hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        self.open_session(user).await
    }

    /// Resolve a federated profile through the reconciler and open a session.
    pub async fn federated_login(
        &self,
        profile: FederatedProfile,
    ) -> Result<(AuthSession, LinkOutcome)> {
        let (user, outcome) = reconcile(&self.store, profile).await?;

        info!(user_id = %user.id, outcome = ?outcome, "Federated login");
        let session = self.open_session(user).await?;
        Ok((session, outcome))
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated: the stored slot changes only
    /// on login, logout, and deletion, and a presented token must exactly
    /// match it - anything superseded is rejected even before expiry.
    pub async fn refresh_access(&self, refresh_token: &str) -> Result<String> {
        let subject = self
            .codec
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::TokenRevoked)?;

        let user = self
            .store
            .find_by_id(subject)
            .await?
            .ok_or(AuthError::TokenRevoked)?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            return Err(AuthError::TokenRevoked);
        }

        Ok(self.codec.issue_access(user.id)?)
    }

    /// Resolve an access token to an identity claim.
    ///
    /// Side-effect-free; safe to call on every request.
    pub async fn authenticate(&self, access_token: &str) -> Result<IdentityClaim> {
        let subject = self.codec.verify(access_token, TokenKind::Access)?;

        let user = self
            .store
            .find_by_id(subject)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(IdentityClaim {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply a name/email update.
    ///
    /// Email changes are forbidden for federated accounts and duplicate-checked
    /// otherwise; an update with no net change is an error, not a silent
    /// success. Returns the stored user and the fields that changed.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<(User, Vec<&'static str>)> {
        if req.name.is_none() && req.email.is_none() {
            return Err(AuthError::Validation(
                "At least one field (name or email) is required for update".to_string(),
            ));
        }

        let mut user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let mut updated_fields = Vec::new();

        if let Some(name) = &req.name {
            let name = name.trim();
            if !validators::validate_name(name) {
                return Err(AuthError::Validation(
                    "Name must be between 2 and 50 characters".to_string(),
                ));
            }
            if name != user.name {
                user.name = name.to_string();
                updated_fields.push("name");
            }
        }

        if let Some(email) = &req.email {
            let email = validators::normalize_email(email);
            if !validators::validate_email(&email) {
                return Err(AuthError::Validation("Invalid email format".to_string()));
            }
            if email != user.email {
                if user.is_federated() {
                    return Err(AuthError::EmailChangeForbidden);
                }
                if self.store.find_by_email(&email).await?.is_some() {
                    return Err(AuthError::Conflict(
                        "This email is already associated with another account".to_string(),
                    ));
                }
                user.email = email;
                updated_fields.push("email");
            }
        }

        if updated_fields.is_empty() {
            return Err(AuthError::NothingToUpdate);
        }

        let user = self.store.update(&user).await?;
        info!(user_id = %user.id, fields = ?updated_fields, "Profile updated");
        Ok((user, updated_fields))
    }

    /// Clear the refresh slot, ending the session.
    ///
    /// The outstanding access token stays usable until its natural expiry
    /// (at most 15 minutes); only the refresh path is cut off here.
    pub async fn logout(&self, user_id: Uuid) -> Result<()> {
        let mut user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.refresh_token = None;
        self.store.update(&user).await?;

        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Remove the account entirely, which also invalidates its refresh slot.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<()> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.store.delete(user_id).await?;

        info!(user_id = %user_id, "Account deleted");
        Ok(())
    }

    /// Issue a token pair, store the refresh token, stamp the login time.
    async fn open_session(&self, mut user: User) -> Result<AuthSession> {
        let tokens = self.codec.issue_pair(user.id)?;

        user.refresh_token = Some(tokens.refresh_token.clone());
        user.last_login_at = Some(Utc::now());
        let user = self.store.update(&user).await?;

        Ok(AuthSession { user, tokens })
    }
}
