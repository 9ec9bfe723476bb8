//! OAuth flow errors.
//!
//! Every variant maps to a stable [`kind`](OAuthError::kind) string and an
//! HTTP [`status_code`](OAuthError::status_code), so a host's callback
//! handler can answer with a diagnostic response without inspecting messages.
//!
//! ```rust
//! use shopify_app::auth::oauth::OAuthError;
//!
//! let error = OAuthError::NonceMismatch {
//!     expected: "a.example.com".to_string(),
//!     received: "b.example.com".to_string(),
//! };
//! assert_eq!(error.kind(), "nonce_mismatch");
//! assert_eq!(error.status_code(), 400);
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::NonceError;

/// Boxed error returned by completion hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by [`OAuthFlow`](crate::auth::oauth::OAuthFlow).
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The `state` nonce did not verify.
    #[error("OAuth state nonce is invalid")]
    InvalidNonce,

    /// The `state` nonce verified but is past its expiry.
    #[error("OAuth state nonce expired at {expired_at}")]
    ExpiredNonce {
        /// When the nonce stopped being valid.
        expired_at: DateTime<Utc>,
    },

    /// The nonce was issued for a different store than the callback names.
    #[error("OAuth state was issued for '{expected}' but the callback is for '{received}'")]
    NonceMismatch {
        /// Store embedded in the nonce.
        expected: String,
        /// Store named by the callback.
        received: String,
    },

    /// The callback's HMAC signature did not verify.
    #[error("HMAC signature validation failed")]
    InvalidHmac,

    /// The authorization code could not be exchanged for a token.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// HTTP status from the token endpoint, `0` for transport failures.
        status: u16,
        /// Failure detail.
        message: String,
    },

    /// The callback parameters are malformed.
    #[error("Invalid callback: {reason}")]
    InvalidCallback {
        /// What was wrong.
        reason: String,
    },

    /// No public host is configured, so no `redirect_uri` can be built.
    #[error("Host URL must be configured in ShopifyConfig for OAuth")]
    MissingHostConfig,

    /// A `post_install` or `post_login` hook failed.
    #[error("{hook} hook failed: {source}")]
    Completion {
        /// Which hook failed.
        hook: &'static str,
        /// The hook's error.
        #[source]
        source: HookError,
    },

    /// The flow was cancelled before it completed.
    #[error("OAuth flow was cancelled")]
    Cancelled,
}

impl OAuthError {
    /// Stable machine-readable identifier for this failure.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidNonce => "invalid_nonce",
            Self::ExpiredNonce { .. } => "expired_nonce",
            Self::NonceMismatch { .. } => "nonce_mismatch",
            Self::InvalidHmac => "invalid_hmac",
            Self::TokenExchangeFailed { .. } => "token_exchange_failed",
            Self::InvalidCallback { .. } => "invalid_callback",
            Self::MissingHostConfig => "missing_host_config",
            Self::Completion { .. } => "completion_failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// HTTP status a callback handler should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidNonce
            | Self::ExpiredNonce { .. }
            | Self::NonceMismatch { .. }
            | Self::InvalidHmac
            | Self::TokenExchangeFailed { .. }
            | Self::InvalidCallback { .. } => 400,
            Self::MissingHostConfig | Self::Completion { .. } => 500,
            Self::Cancelled => 503,
        }
    }
}

impl From<NonceError> for OAuthError {
    fn from(error: NonceError) -> Self {
        match error {
            NonceError::InvalidNonce => Self::InvalidNonce,
            NonceError::ExpiredNonce { expired_at } => Self::ExpiredNonce { expired_at },
        }
    }
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
