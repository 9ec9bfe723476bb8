//! Integration tests for embedded-app session token verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use shopify_app::auth::{decode_token_from_header, decode_token_from_header_at, SessionTokenError};
use shopify_app::{ApiKey, ApiSecretKey, ShopifyConfig};
use tokio_test::{assert_err, assert_ok};

fn config() -> ShopifyConfig {
    ShopifyConfig::builder()
        .api_key(ApiKey::new("test-api-key").unwrap())
        .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
        .build()
        .unwrap()
}

fn sign(claims: &serde_json::Value, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn claims(exp: i64, nbf: i64) -> serde_json::Value {
    json!({
        "iss": "https://test-shop.myshopify.com/admin",
        "dest": "https://test-shop.myshopify.com",
        "aud": "test-api-key",
        "sub": "902541635",
        "exp": exp,
        "nbf": nbf,
        "iat": nbf,
        "jti": "f8912129-1af6-4cad-9ca3-76b0f7621087",
        "sid": "aaea182f2732d44c23057c0fea584021a4485b2bd25d3eb7fd349313ad24c685"
    })
}

fn decode(header: &str) -> Result<shopify_app::auth::SessionClaims, SessionTokenError> {
    let config = config();
    decode_token_from_header(
        header,
        config.api_key().as_ref(),
        config.api_secret_key().as_ref(),
    )
}

#[test]
fn test_valid_token_yields_store_and_user() {
    let now = Utc::now().timestamp();
    let token = sign(&claims(now + 60, now - 5), "test-secret");

    let claims = assert_ok!(decode(&format!("Bearer {token}")));

    assert_eq!(claims.shop(), "test-shop.myshopify.com");
    assert_eq!(claims.sub.as_deref(), Some("902541635"));
    assert_eq!(claims.user_id(), Some(902_541_635));
}

#[test]
fn test_expired_token_is_rejected() {
    let now = Utc::now().timestamp();
    let token = sign(&claims(now - 120, now - 180), "test-secret");

    assert_eq!(
        decode(&format!("Bearer {token}")),
        Err(SessionTokenError::ExpiredSessionToken)
    );
}

#[test]
fn test_token_signed_with_another_secret_is_rejected() {
    let now = Utc::now().timestamp();
    let token = sign(&claims(now + 60, now), "someone-else");

    let error = assert_err!(decode(&format!("Bearer {token}")));
    assert_eq!(error, SessionTokenError::InvalidSignature);
    assert_eq!(error.status_code(), 401);
}

#[test]
fn test_header_without_bearer_prefix_is_malformed() {
    let now = Utc::now().timestamp();
    let token = sign(&claims(now + 60, now), "test-secret");

    assert_eq!(decode(&token), Err(SessionTokenError::MalformedHeader));
    assert_eq!(decode("Bearer "), Err(SessionTokenError::MalformedHeader));
}

#[test]
fn test_clock_skew_within_leeway_is_accepted() {
    let now = Utc::now();
    let token = sign(
        &claims(now.timestamp() + 60, now.timestamp()),
        "test-secret",
    );
    let header = format!("Bearer {token}");

    // a verifier whose clock runs a few seconds behind the issuer
    let behind = now - Duration::seconds(5);
    assert_ok!(decode_token_from_header_at(
        &header,
        "test-api-key",
        "test-secret",
        behind
    ));

    let far_behind = now - Duration::seconds(60);
    assert_eq!(
        decode_token_from_header_at(&header, "test-api-key", "test-secret", far_behind),
        Err(SessionTokenError::PrematureSessionToken)
    );
}
