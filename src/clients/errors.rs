//! HTTP-level error types.
//!
//! [`HttpError`] is shared by both API surfaces; [`RestError`](crate::clients::rest::RestError)
//! and [`GraphqlError`](crate::clients::graphql::GraphqlError) wrap it.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A request was rejected before it was sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST or PUT was built without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method used.
        method: String,
    },
}

/// Errors from executing a request against the platform.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The platform answered with a non-2xx status other than 429.
    #[error("{message}")]
    ApiRequestFailed {
        /// HTTP status code.
        code: u16,
        /// Caller message followed by the platform's serialized error body.
        message: String,
        /// The `X-Request-Id` of the failed response.
        error_reference: Option<String>,
    },

    /// Every attempt allowed by the retry policy was throttled.
    #[error("Rate limit still exceeded after {attempts} attempts. Last message: {message}")]
    RateLimitExceeded {
        /// Requests made.
        attempts: u32,
        /// The last throttling response, serialized.
        message: String,
    },

    /// The request was malformed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Transport failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The client's online token has expired.
    #[error("Access token expired at {expired_at}")]
    ExpiredToken {
        /// When the token expired.
        expired_at: DateTime<Utc>,
    },

    /// The client's token has no access token.
    #[error("Missing access token")]
    MissingAccessToken,

    /// The client was cancelled while the call was in flight.
    #[error("Request was cancelled")]
    Cancelled,
}

impl HttpError {
    /// The platform's HTTP status for this failure, when one was received.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiRequestFailed { code, .. } => Some(*code),
            Self::RateLimitExceeded { .. } => Some(429),
            _ => None,
        }
    }
}

// Verify HttpError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};
