//! JWT codec tests

use super::handler::now_secs;
use super::types::{JwtCodec, Role};
use crate::config::AuthConfig;
use crate::utils::error::GateError;

fn test_codec() -> JwtCodec {
    let config = AuthConfig {
        jwt_secret: "test-secret-key-for-testing-only-0123456789".to_string(),
        jwt_expiration_ms: 86_400_000,
        session_ttl_secs: 86_400,
    };
    JwtCodec::new(&config).unwrap()
}

#[test]
fn test_issue_verify_round_trip() {
    let codec = test_codec();

    let token = codec.issue("a@x.com", Role::User).unwrap();
    let claims = codec.verify(&token).unwrap();

    assert_eq!(claims.sub, "a@x.com");
    assert_eq!(claims.role, Role::User);
    assert!(claims.exp > claims.iat);
    assert_eq!(claims.exp - claims.iat, 86_400);
}

#[test]
fn test_round_trip_admin_role() {
    let codec = test_codec();
    let token = codec.issue("root@x.com", Role::Admin).unwrap();
    let claims = codec.verify(&token).unwrap();
    assert_eq!(claims.role, Role::Admin);
}

#[test]
fn test_garbage_token_is_malformed() {
    let codec = test_codec();
    let result = codec.verify("not.a.jwt");
    assert!(matches!(result, Err(GateError::MalformedToken)));

    let result = codec.verify("");
    assert!(matches!(result, Err(GateError::MalformedToken)));
}

#[test]
fn test_tampered_signature_is_invalid() {
    let codec = test_codec();
    let token = codec.issue("a@x.com", Role::User).unwrap();

    // Flip a character in the signature segment
    let mut parts: Vec<String> = token.split('.').map(String::from).collect();
    let sig = parts[2].clone();
    let flipped = if sig.starts_with('A') { "B" } else { "A" };
    parts[2] = format!("{}{}", flipped, &sig[1..]);
    let tampered = parts.join(".");

    let result = codec.verify(&tampered);
    assert!(matches!(result, Err(GateError::InvalidSignature)));
}

#[test]
fn test_wrong_key_is_invalid_signature() {
    let codec = test_codec();
    let other = JwtCodec::new(&AuthConfig {
        jwt_secret: "a-different-secret-key-of-sufficient-len".to_string(),
        jwt_expiration_ms: 86_400_000,
        session_ttl_secs: 86_400,
    })
    .unwrap();

    let token = other.issue("a@x.com", Role::User).unwrap();
    let result = codec.verify(&token);
    assert!(matches!(result, Err(GateError::InvalidSignature)));
}

#[test]
fn test_expiry_independent_of_signature() {
    let codec = test_codec();

    let token = codec
        .issue_at("a@x.com", Role::User, 3600, now_secs() - 7200)
        .unwrap();

    // Signature still verifies even though the token is long expired
    let claims = codec.verify(&token).unwrap();
    assert!(codec.is_expired(&claims));
}

#[test]
fn test_fresh_token_not_expired() {
    let codec = test_codec();
    let token = codec.issue("a@x.com", Role::User).unwrap();
    let claims = codec.verify(&token).unwrap();
    assert!(!codec.is_expired(&claims));
    assert!(codec.check_expiry(&claims).is_ok());
}

#[test]
fn test_check_expiry_reports_expired_token() {
    let codec = test_codec();
    let token = codec
        .issue_at("a@x.com", Role::User, 3600, now_secs() - 7200)
        .unwrap();
    let claims = codec.verify(&token).unwrap();
    assert!(matches!(
        codec.check_expiry(&claims),
        Err(GateError::ExpiredToken)
    ));
}

#[test]
fn test_compact_serialization_shape() {
    let codec = test_codec();
    let token = codec.issue("a@x.com", Role::User).unwrap();
    assert_eq!(token.split('.').count(), 3, "header.payload.signature");
}

#[test]
fn test_extract_token_from_header() {
    assert_eq!(
        JwtCodec::extract_token_from_header("Bearer abc.def.ghi"),
        Some("abc.def.ghi")
    );
    assert_eq!(JwtCodec::extract_token_from_header("Basic dXNlcg=="), None);
    assert_eq!(JwtCodec::extract_token_from_header("bearer abc"), None);
}

#[test]
fn test_debug_redacts_keys() {
    let codec = test_codec();
    let rendered = format!("{:?}", codec);
    assert!(rendered.contains("[REDACTED]"));
    assert!(!rendered.contains("test-secret-key"));
}
