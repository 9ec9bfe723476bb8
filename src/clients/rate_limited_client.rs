//! Token-bound API execution.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::auth::Token;
use crate::clients::graphql::{GraphqlError, GraphqlResponse};
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::rate_limit::RateLimitSnapshot;
use crate::clients::rest::{normalize_path, RestError};
use crate::clients::sleeper::Sleeper;
use crate::clients::HttpError;
use crate::config::ShopifyConfig;

/// Executes REST and GraphQL calls for one store with one [`Token`].
///
/// Throttling is handled locally: REST 429s and GraphQL `THROTTLED` errors
/// are waited out and retried up to the configured
/// [`RetryPolicy::max_attempts`](crate::RetryPolicy::max_attempts). Every
/// other failure is returned immediately.
///
/// # Example
///
/// ```rust,ignore
/// use shopify_app::{HttpMethod, OfflineToken, RateLimitedClient};
///
/// let token = OfflineToken::load(&store, &shop).await?;
/// let client = RateLimitedClient::new(&token.into(), &config)?;
///
/// let orders = client
///     .execute_rest(HttpMethod::Get, "orders.json", None, Some("Order lookup failed"))
///     .await?;
///
/// let shop = client.execute_gql("{ shop { name } }", None, None).await?;
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitedClient {
    token: Token,
    http: HttpClient,
}

// Verify RateLimitedClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RateLimitedClient>();
};

impl RateLimitedClient {
    /// Binds a client to `token`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the HTTP client cannot be built.
    pub fn new(token: &Token, config: &ShopifyConfig) -> Result<Self, HttpError> {
        Ok(Self {
            token: token.clone(),
            http: HttpClient::new(token, config)?,
        })
    }

    /// Replaces the backoff sleeper.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.http = self.http.with_sleeper(sleeper);
        self
    }

    /// Ties every call and backoff wait to `cancel`.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.http = self.http.with_cancellation(cancel);
        self
    }

    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http
    }

    /// Last reported state of both rate-limit buckets.
    #[must_use]
    pub fn rate_limits(&self) -> RateLimitSnapshot {
        self.http.rate_limits()
    }

    /// Calls a REST endpoint and returns the parsed JSON body.
    ///
    /// `endpoint_path` is relative to `/admin/api/{version}/`. An empty
    /// response body yields `{}`. `error_message` prefixes the failure
    /// message if the platform rejects the call.
    ///
    /// # Errors
    ///
    /// - [`RestError::InvalidPath`] for an empty endpoint
    /// - [`RestError::Http`] wrapping [`HttpError::ExpiredToken`],
    ///   [`HttpError::MissingAccessToken`], [`HttpError::ApiRequestFailed`],
    ///   [`HttpError::RateLimitExceeded`] and transport failures
    pub async fn execute_rest(
        &self,
        method: HttpMethod,
        endpoint_path: &str,
        body: Option<Value>,
        error_message: Option<&str>,
    ) -> Result<Value, RestError> {
        self.execute_rest_with_query(method, endpoint_path, HashMap::new(), body, error_message)
            .await
    }

    /// [`execute_rest`](Self::execute_rest) with query parameters.
    ///
    /// # Errors
    ///
    /// See [`execute_rest`](Self::execute_rest).
    pub async fn execute_rest_with_query(
        &self,
        method: HttpMethod,
        endpoint_path: &str,
        query: HashMap<String, String>,
        body: Option<Value>,
        error_message: Option<&str>,
    ) -> Result<Value, RestError> {
        self.ensure_usable()?;
        let path = normalize_path(endpoint_path)?;

        let mut builder = HttpRequest::builder(method, path);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(message) = error_message {
            builder = builder.error_message(message);
        }
        let request = builder.build().map_err(HttpError::from)?;

        let response = self.http.request(request).await?;
        Ok(response.body)
    }

    /// Runs a GraphQL query.
    ///
    /// GraphQL errors other than the fatal ones below are returned in
    /// [`GraphqlResponse::errors`].
    ///
    /// # Errors
    ///
    /// - [`GraphqlError::MaxCostExceeded`] without retrying
    /// - [`GraphqlError::InvalidAccessToken`] when the token is rejected
    /// - [`GraphqlError::Http`] with [`HttpError::RateLimitExceeded`] when
    ///   every attempt was throttled, by an HTTP 429 or a `THROTTLED` error,
    ///   plus the REST-level failures
    ///
    /// Throttle waits are capped at the policy's `max_backoff`.
    pub async fn execute_gql(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: Option<&str>,
    ) -> Result<GraphqlResponse, GraphqlError> {
        self.ensure_usable()?;

        let body = serde_json::json!({
            "query": query,
            "variables": variables,
            "operationName": operation_name,
        });
        let policy = *self.http.retry_policy();

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let request = HttpRequest::builder(HttpMethod::Post, "graphql.json")
                .body(body.clone())
                .error_message("GraphQL query failed")
                .build()
                .map_err(HttpError::from)?;
            let response = self.http.send(&request).await?;

            // an HTTP 429 and a THROTTLED error draw on the same attempt budget
            let (delay, message) = if response.is_throttled() {
                (
                    self.http.retry_delay(&response, attempt),
                    HttpClient::serialize_error(&response),
                )
            } else if !response.is_ok() {
                return Err(HttpClient::api_request_failed(&request, &response).into());
            } else {
                let response = GraphqlResponse::from_body(response.body)?;

                if let Some(cost) = &response.cost {
                    let status = &cost.throttle_status;
                    self.http.rate_limit_state().record_graphql(
                        status.maximum_available,
                        status.currently_available,
                        status.restore_rate,
                    );
                }

                if !response.is_throttled() {
                    return Ok(response);
                }

                let delay = response.throttle_delay().map_or_else(
                    || policy.backoff_for(attempt),
                    |delay| delay.min(policy.max_backoff()),
                );
                let message = serde_json::to_string(&response.errors)
                    .unwrap_or_else(|_| "THROTTLED".to_string());
                (delay, message)
            };

            if attempt >= policy.max_attempts() {
                tracing::warn!(attempts = attempt, "graphql throttle retries exhausted");
                return Err(HttpError::RateLimitExceeded {
                    attempts: attempt,
                    message,
                }
                .into());
            }

            tracing::warn!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "graphql query throttled, retrying"
            );
            self.http.pause(delay).await?;
        }
    }

    fn ensure_usable(&self) -> Result<(), HttpError> {
        if self.token.access_token().is_empty() {
            return Err(HttpError::MissingAccessToken);
        }
        if let Token::Online(token) = &self.token {
            if token.is_expired() {
                return Err(HttpError::ExpiredToken {
                    expired_at: token.expires_at(),
                });
            }
        }
        Ok(())
    }
}
