/// Credential store: the only shared mutable state in the service.
///
/// The trait keeps the surface narrow (lookups by identifier, insert,
/// whole-record update, delete) so business logic never leans on
/// driver-specific behavior. `PgUserStore` is the production backend;
/// `MemoryUserStore` backs the test suites.
pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::user::{AuthProvider, User};

/// Insert payload for a new account. Emails must already be normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub auth_provider: AuthProvider,
    pub avatar_url: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>>;

    /// Insert a new account. A duplicate email or provider id surfaces as
    /// `AuthError::Conflict`.
    async fn insert(&self, new_user: NewUser) -> Result<User>;

    /// Persist the mutable fields of an existing account and return the
    /// stored row. Conflicting writes per account are last-writer-wins.
    async fn update(&self, user: &User) -> Result<User>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
