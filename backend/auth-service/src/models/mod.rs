/// Data models for authentication
pub mod user;

pub use user::{
    AuthProvider, FederatedProfile, IdentityClaim, LoginRequest, PublicUser, RefreshTokenRequest,
    RegisterRequest, UpdateProfileRequest, User,
};
