//! Admin REST API support.
//!
//! Calls go through [`RateLimitedClient::execute_rest`](crate::clients::RateLimitedClient::execute_rest).
//! Endpoints are given relative to `/admin/api/{version}/` and normalized by
//! [`normalize_path`]: `"/orders"`, `"orders"` and `"orders.json"` all hit
//! `orders.json`.
//!
//! The bucket reported in `X-Shopify-Shop-Api-Call-Limit` is recorded after
//! every response; a 429 is retried per the client's
//! [`RetryPolicy`](crate::RetryPolicy).

mod errors;
mod path;

pub use errors::RestError;
pub use path::normalize_path;
