/// Identity reconciliation: attach a federated login to an existing account
/// or create a new one.
use tracing::info;

use crate::db::{NewUser, UserStore};
use crate::error::{AuthError, Result};
use crate::models::user::{AuthProvider, FederatedProfile, User, DEFAULT_AVATAR_URL};
use crate::validators::normalize_email;

/// How the federated profile was resolved to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    LinkedExisting,
    CreatedNew,
}

/// Resolve a federated profile to an account.
///
/// In order:
/// 1. provider id already known - return the linked account (fast path);
/// 2. an account exists under the same verified email - attach the provider
///    id to it instead of creating a duplicate;
/// 3. otherwise create a new federated account.
///
/// The provider is trusted to have verified the email; a profile without one
/// is a caller error (the email scope was not requested).
pub async fn reconcile<S: UserStore + ?Sized>(
    store: &S,
    profile: FederatedProfile,
) -> Result<(User, LinkOutcome)> {
    if profile.email.trim().is_empty() {
        return Err(AuthError::Validation(
            "Federated profile did not include a verified email".to_string(),
        ));
    }
    let email = normalize_email(&profile.email);

    if let Some(user) = store.find_by_google_id(&profile.provider_id).await? {
        return Ok((user, LinkOutcome::LinkedExisting));
    }

    if let Some(mut user) = store.find_by_email(&email).await? {
        user.google_id = Some(profile.provider_id);
        user.auth_provider = AuthProvider::Google;
        if let Some(avatar_url) = profile.avatar_url {
            user.avatar_url = avatar_url;
        }
        let user = store.update(&user).await?;

        info!(user_id = %user.id, "Linked federated identity to existing account");
        return Ok((user, LinkOutcome::LinkedExisting));
    }

    let user = store
        .insert(NewUser {
            name: profile.display_name.trim().to_string(),
            email,
            password_hash: None,
            google_id: Some(profile.provider_id),
            auth_provider: AuthProvider::Google,
            avatar_url: profile
                .avatar_url
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
        })
        .await?;

    info!(user_id = %user.id, "Created new account from federated profile");
    Ok((user, LinkOutcome::CreatedNew))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;

    fn profile(provider_id: &str, email: &str) -> FederatedProfile {
        FederatedProfile {
            provider_id: provider_id.to_string(),
            email: email.to_string(),
            display_name: "Ann G".to_string(),
            avatar_url: Some("https://lh3.example.com/photo.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn creates_account_on_first_federated_login() {
        let store = MemoryUserStore::new();

        let (user, outcome) = reconcile(&store, profile("g1", "Ann@X.com")).await.unwrap();

        assert_eq!(outcome, LinkOutcome::CreatedNew);
        assert_eq!(user.email, "ann@x.com");
        assert_eq!(user.auth_provider, AuthProvider::Google);
        assert_eq!(user.google_id.as_deref(), Some("g1"));
        assert!(user.password_hash.is_none());
        assert_eq!(user.avatar_url, "https://lh3.example.com/photo.jpg");
    }

    #[tokio::test]
    async fn second_login_takes_the_provider_id_fast_path() {
        let store = MemoryUserStore::new();

        let (first, _) = reconcile(&store, profile("g1", "ann@x.com")).await.unwrap();
        let (second, outcome) = reconcile(&store, profile("g1", "ann@x.com")).await.unwrap();

        assert_eq!(outcome, LinkOutcome::LinkedExisting);
        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn links_to_existing_local_account_by_email() {
        let store = MemoryUserStore::new();
        let local = store
            .insert(NewUser {
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                password_hash: Some("$argon2id$stub".to_string()),
                google_id: None,
                auth_provider: AuthProvider::Local,
                avatar_url: DEFAULT_AVATAR_URL.to_string(),
            })
            .await
            .unwrap();

        let (linked, outcome) = reconcile(&store, profile("g1", "ANN@x.com")).await.unwrap();

        assert_eq!(outcome, LinkOutcome::LinkedExisting);
        assert_eq!(linked.id, local.id);
        assert_eq!(linked.auth_provider, AuthProvider::Google);
        assert_eq!(linked.google_id.as_deref(), Some("g1"));
        // the local password stays; only the auth path changes
        assert!(linked.password_hash.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_email_is_a_fatal_input_error() {
        let store = MemoryUserStore::new();

        let err = reconcile(&store, profile("g1", "   ")).await.unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn default_avatar_applies_when_profile_has_none() {
        let store = MemoryUserStore::new();
        let mut p = profile("g2", "bob@x.com");
        p.avatar_url = None;

        let (user, _) = reconcile(&store, p).await.unwrap();

        assert_eq!(user.avatar_url, DEFAULT_AVATAR_URL);
    }
}
