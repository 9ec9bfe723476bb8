//! Signed, expiring OAuth nonces.
//!
//! [`NonceCodec`] turns a caller payload into a compact HS256 JWT carrying the
//! payload, issue time, expiry and a random id. Nothing is stored server-side:
//! a nonce is valid exactly when its signature verifies and its expiry has not
//! passed. A replay inside the validity window is therefore accepted. Hosts
//! that need single use can record [`NonceClaims::jti`] in a seen-nonce set.
//!
//! Issue and expiry times are whole seconds. The issue time is truncated, and
//! a nonce stays valid through the entire second named by its expiry, so the
//! effective lifetime is `ttl` give or take one second.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use shopify_app::auth::NonceCodec;
//!
//! let codec = NonceCodec::new(b"private-key");
//! let nonce = codec.encode("shop.example.com", Duration::from_secs(600)).unwrap();
//! assert_eq!(codec.decode(&nonce).unwrap(), "shop.example.com");
//! ```

use std::fmt;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nonce verification failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NonceError {
    /// Signature did not verify or the token is not a well-formed nonce.
    #[error("Invalid nonce")]
    InvalidNonce,

    /// Signature verified but the expiry has passed.
    #[error("Nonce expired at {expired_at}")]
    ExpiredNonce {
        /// When the nonce stopped being valid.
        expired_at: DateTime<Utc>,
    },
}

/// Claims embedded in every nonce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceClaims {
    /// Caller-supplied payload, returned unchanged by [`NonceCodec::decode`].
    pub payload: String,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch. Valid through the end of this second.
    pub exp: i64,
    /// Random unique id.
    pub jti: String,
}

/// Issues and verifies nonces with a process-wide key.
#[derive(Clone)]
pub struct NonceCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl NonceCodec {
    /// Creates a codec signing with `key`.
    #[must_use]
    pub fn new(key: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
        }
    }

    /// Encodes `payload` into a nonce valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`NonceError::InvalidNonce`] if the token cannot be signed.
    pub fn encode(&self, payload: &str, ttl: Duration) -> Result<String, NonceError> {
        self.encode_at(payload, ttl, Utc::now())
    }

    /// Encodes `payload` as if issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [`NonceError::InvalidNonce`] if the token cannot be signed.
    pub fn encode_at(
        &self,
        payload: &str,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, NonceError> {
        let iat = issued_at.timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = NonceClaims {
            payload: payload.to_string(),
            iat,
            exp: iat.saturating_add(ttl_secs),
            jti: random_jti(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|error| {
            tracing::warn!(%error, "failed to sign nonce");
            NonceError::InvalidNonce
        })
    }

    /// Verifies `token` and returns its payload.
    ///
    /// # Errors
    ///
    /// - [`NonceError::InvalidNonce`] if the signature does not verify
    /// - [`NonceError::ExpiredNonce`] if the expiry has passed
    pub fn decode(&self, token: &str) -> Result<String, NonceError> {
        self.decode_at(token, Utc::now())
    }

    /// Verifies `token` against the clock value `now`.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, NonceError> {
        self.decode_claims_at(token, now).map(|claims| claims.payload)
    }

    /// Verifies `token` and returns all of its claims, including `jti`.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_claims(&self, token: &str) -> Result<NonceClaims, NonceError> {
        self.decode_claims_at(token, Utc::now())
    }

    fn decode_claims_at(&self, token: &str, now: DateTime<Utc>) -> Result<NonceClaims, NonceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked below against the supplied clock
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<NonceClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| NonceError::InvalidNonce)?
            .claims;

        // second granularity: sub-second parts of `now` are ignored
        if now.timestamp() > claims.exp {
            return Err(NonceError::ExpiredNonce {
                expired_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
            });
        }
        Ok(claims)
    }
}

impl fmt::Debug for NonceCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NonceCodec(*****)")
    }
}

fn random_jti() -> String {
    let mut bytes = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// Verify NonceCodec is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NonceCodec>();
};
