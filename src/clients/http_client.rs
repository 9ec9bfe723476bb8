//! Low-level HTTP client for the Admin API.
//!
//! Handles URL construction, default headers, the 429 retry loop and the
//! advisory REST call-limit bookkeeping. Higher-level concerns (path
//! normalization, GraphQL cost throttling) live in
//! [`RateLimitedClient`](crate::clients::RateLimitedClient).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::auth::Token;
use crate::clients::errors::HttpError;
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;
use crate::clients::rate_limit::{RateLimitSnapshot, RateLimitState};
use crate::clients::sleeper::{Sleeper, TokioSleeper};
use crate::config::{RetryPolicy, ShopifyConfig};

/// Crate version sent in the User-Agent.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_ERROR_MESSAGE: &str = "Shopify API request failed";

/// Executes requests for one store and token.
///
/// Clones share the connection pool, the rate-limit state and the
/// cancellation token.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_uri: String,
    base_path: String,
    default_headers: HashMap<String, String>,
    retry_policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancellationToken,
    rate_limits: Arc<RateLimitState>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client for `token`'s store, rooted at
    /// `/admin/api/{version}`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the TLS backend cannot be initialized.
    pub fn new(token: &Token, config: &ShopifyConfig) -> Result<Self, HttpError> {
        let base_uri = config.store_base_uri(token.store_domain());
        let base_path = format!("/admin/api/{}", config.api_version());

        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Shopify App Library v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        if !token.access_token().is_empty() {
            default_headers.insert(
                "X-Shopify-Access-Token".to_string(),
                token.access_token().to_string(),
            );
        }

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_uri,
            base_path,
            default_headers,
            retry_policy: *config.retry_policy(),
            sleeper: Arc::new(TokioSleeper),
            cancel: CancellationToken::new(),
            rate_limits: Arc::new(RateLimitState::new()),
        })
    }

    /// Replaces the backoff sleeper.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Ties in-flight requests and backoff sleeps to `cancel`.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    #[must_use]
    pub fn rate_limits(&self) -> RateLimitSnapshot {
        self.rate_limits.snapshot()
    }

    pub(crate) fn rate_limit_state(&self) -> &RateLimitState {
        &self.rate_limits
    }

    /// Sends `request`, retrying 429 responses.
    ///
    /// A 429 waits `Retry-After` when present (capped at the policy's
    /// `max_backoff`), else the policy's exponential backoff. Other non-2xx
    /// statuses fail immediately.
    ///
    /// # Errors
    ///
    /// - [`HttpError::InvalidRequest`] for a POST/PUT without a body
    /// - [`HttpError::ApiRequestFailed`] for non-2xx, non-429 statuses
    /// - [`HttpError::RateLimitExceeded`] when every attempt was throttled
    /// - [`HttpError::Network`] on transport failures, including a body cut
    ///   short
    /// - [`HttpError::Cancelled`] when cancelled mid-call
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;
        let max_attempts = self.retry_policy.max_attempts();

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let response = self.send(&request).await?;

            if response.is_ok() {
                return Ok(response);
            }
            if !response.is_throttled() {
                return Err(Self::api_request_failed(&request, &response));
            }

            if attempt >= max_attempts {
                tracing::warn!(path = %request.path, attempts = attempt, "rate limit retries exhausted");
                return Err(HttpError::RateLimitExceeded {
                    attempts: attempt,
                    message: Self::serialize_error(&response),
                });
            }

            let delay = self.retry_delay(&response, attempt);
            tracing::warn!(
                path = %request.path,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "request throttled, retrying"
            );
            self.pause(delay).await?;
        }
    }

    /// Sends `request` once and reads the whole body, whatever the status.
    ///
    /// Both the exchange and the body read race the cancellation token.
    pub(crate) async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = format!("{}{}/{}", self.base_uri, self.base_path, request.path);

        let mut req_builder = self
            .client
            .request(request.http_method.as_reqwest(), &url);
        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        let exchange = async {
            let res = req_builder.send().await?;
            let code = res.status().as_u16();
            let headers = Self::parse_response_headers(res.headers());
            let text = res.text().await?;
            Ok::<_, reqwest::Error>((code, headers, text))
        };
        let (code, res_headers, body_text) = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(HttpError::Cancelled),
            res = exchange => res?,
        };

        let body = if body_text.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&body_text)
                .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
        };

        let response = HttpResponse::new(code, res_headers, body);

        if let Some(limit) = &response.api_call_limit {
            self.rate_limits.record_rest(limit);
        }
        if let Some(reason) = response.deprecation_reason() {
            tracing::warn!(
                "Deprecated request to Shopify API at {}, received reason: {}",
                request.path,
                reason
            );
        }

        Ok(response)
    }

    /// The failure for a non-2xx, non-429 response.
    pub(crate) fn api_request_failed(request: &HttpRequest, response: &HttpResponse) -> HttpError {
        let prefix = request
            .error_message
            .as_deref()
            .unwrap_or(DEFAULT_ERROR_MESSAGE);
        HttpError::ApiRequestFailed {
            code: response.code,
            message: format!("{prefix}: {}", Self::serialize_error(response)),
            error_reference: response.request_id().map(String::from),
        }
    }

    /// Sleeps for `delay` unless cancelled first.
    pub(crate) async fn pause(&self, delay: Duration) -> Result<(), HttpError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(HttpError::Cancelled),
            () = self.sleeper.sleep(delay) => Ok(()),
        }
    }

    pub(crate) fn retry_delay(&self, response: &HttpResponse, attempt: u32) -> Duration {
        response.retry_request_after.map_or_else(
            || self.retry_policy.backoff_for(attempt),
            |secs| {
                Duration::try_from_secs_f64(secs)
                    .map_or(self.retry_policy.max_backoff(), |delay| {
                        delay.min(self.retry_policy.max_backoff())
                    })
            },
        )
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    pub(crate) fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        for key in ["errors", "error", "error_description", "raw_body"] {
            if let Some(value) = response.body.get(key) {
                error_body.insert(key.to_string(), value.clone());
            }
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_uri", &self.base_uri)
            .field("base_path", &self.base_path)
            .field("retry_policy", &self.retry_policy)
            .field("rate_limits", &self.rate_limits.snapshot())
            .finish_non_exhaustive()
    }
}
