/// Signed session tokens for the auth service.
///
/// Two token kinds exist: short-lived `access` tokens presented on every
/// request, and long-lived `refresh` tokens used only to mint new access
/// tokens. Each kind is signed with its own secret, so a leaked access
/// signing key cannot be used to forge refresh tokens.
///
/// All state lives in [`TokenCodec`]; secrets and lifetimes are supplied by
/// the caller at construction time and never read from process globals.
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Access tokens expire after 15 minutes.
pub const ACCESS_TOKEN_LIFETIME_SECS: i64 = 15 * 60;

/// Refresh tokens expire after 7 days.
pub const REFRESH_TOKEN_LIFETIME_SECS: i64 = 7 * 24 * 60 * 60;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Signature and payload were valid but the token is past its expiry.
    /// Recoverable: the caller may attempt a refresh or re-authenticate.
    #[error("token expired")]
    Expired,

    /// Malformed payload, bad signature, or wrong token kind. Fatal: the
    /// caller must force a re-login.
    #[error("invalid token")]
    Invalid,

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Token kind, carried in the `token_type` claim and selecting the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// JWT claims: subject (user id), issue/expiry timestamps, and kind.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    token_type: String,
}

/// Construction-time configuration for [`TokenCodec`].
///
/// Lifetimes default to the service constants but are overridable so tests
/// can simulate clock movement without sleeping.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_lifetime: Duration,
    pub refresh_lifetime: Duration,
}

impl TokenConfig {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_lifetime: Duration::seconds(ACCESS_TOKEN_LIFETIME_SECS),
            refresh_lifetime: Duration::seconds(REFRESH_TOKEN_LIFETIME_SECS),
        }
    }
}

/// An access/refresh pair issued together at login time.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
}

/// Issues and verifies signed, expiring tokens for one subject id.
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_lifetime: config.access_lifetime,
            refresh_lifetime: config.refresh_lifetime,
        }
    }

    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime.num_seconds()
    }

    pub fn refresh_lifetime_secs(&self) -> i64 {
        self.refresh_lifetime.num_seconds()
    }

    /// Issue a short-lived access token for `subject`.
    pub fn issue_access(&self, subject: Uuid) -> Result<String> {
        self.issue(subject, TokenKind::Access)
    }

    /// Issue a long-lived refresh token for `subject`.
    pub fn issue_refresh(&self, subject: Uuid) -> Result<String> {
        self.issue(subject, TokenKind::Refresh)
    }

    /// Issue a matched access/refresh pair for `subject`.
    pub fn issue_pair(&self, subject: Uuid) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(subject, TokenKind::Access)?,
            refresh_token: self.issue(subject, TokenKind::Refresh)?,
            expires_in: self.access_lifetime.num_seconds(),
        })
    }

    /// Verify a token of the expected kind and return its subject id.
    ///
    /// Expiry is checked with zero leeway so a token is rejected the moment
    /// its lifetime elapses. A token of the wrong kind fails as [`Error::Invalid`]
    /// even before the claim check, since the kinds use different secrets.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Uuid> {
        let decoding = match expected {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        };

        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.leeway = 0;

        let data = decode::<Claims>(token, decoding, &validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => Error::Expired,
                _ => Error::Invalid,
            }
        })?;

        if data.claims.token_type != expected.as_str() {
            return Err(Error::Invalid);
        }

        Uuid::parse_str(&data.claims.sub).map_err(|_| Error::Invalid)
    }

    fn issue(&self, subject: Uuid, kind: TokenKind) -> Result<String> {
        let (encoding, lifetime) = match kind {
            TokenKind::Access => (&self.access_encoding, self.access_lifetime),
            TokenKind::Refresh => (&self.refresh_encoding, self.refresh_lifetime),
        };

        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            token_type: kind.as_str().to_string(),
        };

        Ok(encode(&Header::new(JWT_ALGORITHM), &claims, encoding)?)
    }
}
