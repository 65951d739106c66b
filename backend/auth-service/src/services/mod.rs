/// Business logic services
pub mod oauth;
pub mod reconcile;
pub mod session;

pub use oauth::GoogleOAuth;
pub use reconcile::{reconcile, LinkOutcome};
pub use session::{AuthSession, SessionManager};
