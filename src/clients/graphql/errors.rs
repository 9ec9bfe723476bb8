//! GraphQL execution errors.

use crate::clients::HttpError;
use thiserror::Error;

/// Errors from [`RateLimitedClient::execute_gql`](crate::clients::RateLimitedClient::execute_gql).
///
/// Ordinary GraphQL errors (validation, user errors) are not failures here;
/// they come back in [`GraphqlResponse::errors`](crate::clients::graphql::GraphqlResponse::errors).
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// HTTP-level failure, including throttle retries running out.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The query costs more than a full bucket and can never run as written.
    #[error("Query rejected, its cost exceeds the maximum query cost: {message}")]
    MaxCostExceeded {
        /// The platform's error message.
        message: String,
    },

    /// The platform rejected the access token.
    #[error("Invalid API key or access token")]
    InvalidAccessToken,

    /// The body is not a GraphQL response object.
    #[error("Invalid GraphQL response body: {reason}")]
    InvalidResponseBody {
        /// What was wrong.
        reason: String,
    },
}

// Verify GraphqlError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlError>();
};
