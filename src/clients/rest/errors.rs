//! REST execution errors.

use crate::clients::HttpError;
use thiserror::Error;

/// Errors from [`RateLimitedClient::execute_rest`](crate::clients::RateLimitedClient::execute_rest).
#[derive(Debug, Error)]
pub enum RestError {
    /// The endpoint path is empty once normalized.
    #[error("Invalid REST API path: {path}")]
    InvalidPath {
        /// The path as given.
        path: String,
    },

    /// HTTP-level failure.
    #[error(transparent)]
    Http(#[from] HttpError),
}

// Verify RestError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_message() {
        let error = RestError::InvalidPath {
            path: "/.json".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid REST API path: /.json");
    }

    #[test]
    fn test_http_error_is_transparent() {
        let error: RestError = HttpError::ApiRequestFailed {
            code: 422,
            message: r#"Order creation failed: {"errors":{"line_items":["is empty"]}}"#.to_string(),
            error_reference: None,
        }
        .into();

        assert!(error.to_string().starts_with("Order creation failed"));
        assert!(matches!(error, RestError::Http(HttpError::ApiRequestFailed { code: 422, .. })));
    }
}
