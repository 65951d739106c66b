// Tests for token issuance and verification, including the kind-specific
// secret separation and the expired-vs-invalid error split.

use chrono::Duration;
use token_core::{Error, TokenCodec, TokenConfig, TokenKind};
use uuid::Uuid;

fn codec() -> TokenCodec {
    TokenCodec::new(TokenConfig::new("access-secret", "refresh-secret"))
}

#[test]
fn access_token_round_trip_preserves_subject() {
    let codec = codec();
    let subject = Uuid::new_v4();

    let token = codec.issue_access(subject).expect("issue access token");
    let verified = codec
        .verify(&token, TokenKind::Access)
        .expect("verify access token");

    assert_eq!(verified, subject);
}

#[test]
fn refresh_token_round_trip_preserves_subject() {
    let codec = codec();
    let subject = Uuid::new_v4();

    let token = codec.issue_refresh(subject).expect("issue refresh token");
    let verified = codec
        .verify(&token, TokenKind::Refresh)
        .expect("verify refresh token");

    assert_eq!(verified, subject);
}

#[test]
fn pair_contains_both_kinds() {
    let codec = codec();
    let subject = Uuid::new_v4();

    let pair = codec.issue_pair(subject).expect("issue pair");

    assert_eq!(
        codec
            .verify(&pair.access_token, TokenKind::Access)
            .expect("access half"),
        subject
    );
    assert_eq!(
        codec
            .verify(&pair.refresh_token, TokenKind::Refresh)
            .expect("refresh half"),
        subject
    );
    assert_eq!(pair.expires_in, token_core::ACCESS_TOKEN_LIFETIME_SECS);
}

#[test]
fn wrong_kind_is_invalid() {
    let codec = codec();
    let subject = Uuid::new_v4();

    let access = codec.issue_access(subject).expect("issue access token");
    let refresh = codec.issue_refresh(subject).expect("issue refresh token");

    assert!(matches!(
        codec.verify(&access, TokenKind::Refresh),
        Err(Error::Invalid)
    ));
    assert!(matches!(
        codec.verify(&refresh, TokenKind::Access),
        Err(Error::Invalid)
    ));
}

#[test]
fn expired_token_reports_expired_not_invalid() {
    // A codec whose access lifetime is already in the past issues tokens
    // that are structurally valid but expired on arrival.
    let mut config = TokenConfig::new("access-secret", "refresh-secret");
    config.access_lifetime = Duration::seconds(-60);
    let expired_codec = TokenCodec::new(config);

    let token = expired_codec
        .issue_access(Uuid::new_v4())
        .expect("issue expired token");

    assert!(matches!(
        expired_codec.verify(&token, TokenKind::Access),
        Err(Error::Expired)
    ));
}

#[test]
fn token_signed_with_other_secret_is_invalid() {
    let codec = codec();
    let forger = TokenCodec::new(TokenConfig::new("not-the-secret", "also-wrong"));

    let forged = forger
        .issue_access(Uuid::new_v4())
        .expect("issue forged token");

    assert!(matches!(
        codec.verify(&forged, TokenKind::Access),
        Err(Error::Invalid)
    ));
}

#[test]
fn garbage_input_is_invalid() {
    let codec = codec();

    assert!(matches!(
        codec.verify("not-a-jwt", TokenKind::Access),
        Err(Error::Invalid)
    ));
    assert!(matches!(
        codec.verify("", TokenKind::Refresh),
        Err(Error::Invalid)
    ));
}
