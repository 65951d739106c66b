/// In-memory user store.
///
/// Mirrors the uniqueness guarantees of the Postgres schema (normalized
/// email, sparse google_id) so the session logic behaves identically under
/// test and in local runs without a database.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewUser, UserStore};
use crate::error::{AuthError, Result};
use crate::models::user::User;

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == new_user.email) {
            return Err(AuthError::Conflict(
                "This value is already in use".to_string(),
            ));
        }
        if let Some(google_id) = &new_user.google_id {
            if users
                .values()
                .any(|u| u.google_id.as_deref() == Some(google_id.as_str()))
            {
                return Err(AuthError::Conflict(
                    "This value is already in use".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            google_id: new_user.google_id,
            auth_provider: new_user.auth_provider,
            avatar_url: new_user.avatar_url,
            refresh_token: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(AuthError::UserNotFound);
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AuthError::Conflict(
                "This value is already in use".to_string(),
            ));
        }

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        users.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.users.write().await.remove(&id);
        Ok(())
    }
}
