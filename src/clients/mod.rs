//! Rate-limited Admin API execution.
//!
//! [`RateLimitedClient`] is the entry point: it binds one store's [`Token`](crate::Token)
//! and exposes [`execute_rest`](RateLimitedClient::execute_rest) and
//! [`execute_gql`](RateLimitedClient::execute_gql).
//!
//! # Throttling
//!
//! The platform meters each surface with a leaky bucket:
//!
//! - **REST** reports `X-Shopify-Shop-Api-Call-Limit: used/capacity` and answers
//!   429 when the bucket is full. The client waits `Retry-After` when sent,
//!   otherwise an exponential backoff, and retries.
//! - **GraphQL** reports query cost in `extensions.cost` and fails a query
//!   with a `THROTTLED` error when the bucket lacks the requested points. The
//!   client waits `ceil((requested - available) / restoreRate)` seconds.
//!
//! Both surfaces share the [`RetryPolicy`](crate::RetryPolicy) attempt bound.
//! The last reported bucket state is available from
//! [`RateLimitedClient::rate_limits`]; it is advisory and never delays a call
//! on its own.
//!
//! # Cancellation
//!
//! [`RateLimitedClient::with_cancellation`] ties in-flight requests and
//! backoff waits to a [`CancellationToken`](tokio_util::sync::CancellationToken).
//! Backoff waits go through a [`Sleeper`], replaceable with
//! [`RateLimitedClient::with_sleeper`].

mod errors;
pub mod graphql;
mod http_client;
mod http_request;
mod http_response;
mod rate_limit;
mod rate_limited_client;
pub mod rest;
mod sleeper;

pub use errors::{HttpError, InvalidHttpRequestError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{ApiCallLimit, HttpResponse};
pub use rate_limit::{BucketSnapshot, RateLimitSnapshot, RateLimitState};
pub use rate_limited_client::RateLimitedClient;
pub use sleeper::{SleepFuture, Sleeper, TokioSleeper};

pub use graphql::{GraphqlError, GraphqlResponse};
pub use rest::RestError;
