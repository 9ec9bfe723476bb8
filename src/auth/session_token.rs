//! Session token verification for embedded apps.
//!
//! An embedded app's frontend sends a short-lived HS256 JWT, signed with the
//! app's API secret, as `Authorization: Bearer <token>`. Verification is pure:
//! no I/O and no shared state.
//!
//! Checks run in a fixed order: bearer prefix, signature, audience, expiry,
//! not-before. A 10 second leeway absorbs clock skew on the time claims.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_app::auth::decode_token_from_header;
//!
//! let claims = decode_token_from_header(
//!     request.headers()["authorization"].to_str()?,
//!     config.api_key().as_ref(),
//!     config.api_secret_key().as_ref(),
//! )?;
//! println!("{} on {}", claims.sub.unwrap_or_default(), claims.shop());
//! ```

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const LEEWAY_SECS: i64 = 10;
const BEARER_PREFIX: &str = "Bearer ";

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer, `https://{shop}/admin`.
    pub iss: String,
    /// Destination, `https://{shop}`.
    pub dest: String,
    /// Audience, the app's API key.
    pub aud: String,
    /// Subject, the platform user id.
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub nbf: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub jti: String,
    /// Session id.
    pub sid: Option<String>,
}

impl SessionClaims {
    /// The store domain the token was issued for.
    #[must_use]
    pub fn shop(&self) -> &str {
        self.dest
            .strip_prefix("https://")
            .unwrap_or(self.dest.as_str())
    }

    /// The numeric user id from `sub`, when present.
    #[must_use]
    pub fn user_id(&self) -> Option<u64> {
        self.sub.as_deref().and_then(|sub| sub.parse().ok())
    }
}

/// Session token verification failures. Hosts answer all of them with 401.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionTokenError {
    /// The header is missing the `Bearer ` prefix or carries no token.
    #[error("Authorization header is not a bearer token")]
    MalformedHeader,

    /// The signature did not verify or the token is not a well-formed JWT.
    #[error("Session token signature is invalid")]
    InvalidSignature,

    /// The token was issued for another app.
    #[error("Session token audience '{audience}' does not match the API key")]
    AudienceMismatch {
        /// The audience found in the token.
        audience: String,
    },

    /// The token's expiry has passed.
    #[error("Session token expired")]
    ExpiredSessionToken,

    /// The token is not valid yet.
    #[error("Session token used before its not-before time")]
    PrematureSessionToken,
}

impl SessionTokenError {
    /// HTTP status a host should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        401
    }
}

/// Verifies an `Authorization` header value and returns the token's claims.
///
/// # Errors
///
/// Returns the first failing check as a [`SessionTokenError`].
pub fn decode_token_from_header(
    header_value: &str,
    api_key: &str,
    secret: &str,
) -> Result<SessionClaims, SessionTokenError> {
    decode_token_from_header_at(header_value, api_key, secret, Utc::now())
}

/// Like [`decode_token_from_header`] with an explicit clock value.
///
/// # Errors
///
/// See [`decode_token_from_header`].
pub fn decode_token_from_header_at(
    header_value: &str,
    api_key: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<SessionClaims, SessionTokenError> {
    let token = header_value
        .trim()
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(SessionTokenError::MalformedHeader)?;

    decode_session_token_at(token, api_key, secret, now)
}

/// Verifies a bare session token (no `Bearer ` prefix).
///
/// # Errors
///
/// See [`decode_token_from_header`], minus `MalformedHeader`.
pub fn decode_session_token(
    token: &str,
    api_key: &str,
    secret: &str,
) -> Result<SessionClaims, SessionTokenError> {
    decode_session_token_at(token, api_key, secret, Utc::now())
}

fn decode_session_token_at(
    token: &str,
    api_key: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<SessionClaims, SessionTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // time claims and audience are checked below, in order
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;

    let claims = decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|error| {
            tracing::debug!(%error, "session token rejected");
            SessionTokenError::InvalidSignature
        })?
        .claims;

    if claims.aud != api_key {
        return Err(SessionTokenError::AudienceMismatch {
            audience: claims.aud,
        });
    }

    let now = now.timestamp();
    if claims.exp.saturating_add(LEEWAY_SECS) < now {
        return Err(SessionTokenError::ExpiredSessionToken);
    }
    if claims.nbf.saturating_sub(LEEWAY_SECS) > now {
        return Err(SessionTokenError::PrematureSessionToken);
    }

    Ok(claims)
}
