//! Callback HMAC verification.
//!
//! The platform signs callback query strings with HMAC-SHA256 keyed by the
//! app's API secret and sends the lowercase hex digest as the `hmac`
//! parameter. Comparisons are constant-time.

use std::fmt::Write as _;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::AuthQuery;

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase hex HMAC-SHA256 of `message` keyed by `secret`.
#[must_use]
pub fn compute_signature(message: &str, secret: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        // HMAC accepts keys of any length
        return String::new();
    };
    mac.update(message.as_bytes());

    mac.finalize()
        .into_bytes()
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}

/// Compares two strings without short-circuiting on the first difference.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Returns `true` if `query.hmac` matches the signature over the rest of the
/// query.
#[must_use]
pub fn validate_hmac(query: &AuthQuery, secret: &str) -> bool {
    let computed = compute_signature(&query.to_signable_string(), secret);
    !computed.is_empty() && constant_time_compare(&computed, &query.hmac)
}
