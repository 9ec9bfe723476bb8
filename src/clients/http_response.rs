//! Parsed platform responses.

use std::collections::HashMap;

/// The REST call-limit header, `X-Shopify-Shop-Api-Call-Limit: used/capacity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApiCallLimit {
    /// Requests currently in the bucket.
    pub request_count: u32,
    /// Bucket size.
    pub bucket_size: u32,
}

impl ApiCallLimit {
    /// Parses `used/capacity`. Anything else yields `None`.
    #[must_use]
    pub fn parse(header_value: &str) -> Option<Self> {
        let (used, capacity) = header_value.trim().split_once('/')?;
        let request_count = used.trim().parse().ok()?;
        let bucket_size: u32 = capacity.trim().parse().ok()?;
        if bucket_size == 0 {
            return None;
        }

        Some(Self {
            request_count,
            bucket_size,
        })
    }

    /// Requests that can still be made before the bucket is full.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.bucket_size.saturating_sub(self.request_count)
    }

    /// Requests per second drained from the bucket. A full bucket empties in
    /// 20 seconds.
    #[must_use]
    pub fn leak_rate(&self) -> f64 {
        f64::from(self.bucket_size) / 20.0
    }
}

/// A response with lowercase header names and a JSON body.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub code: u16,
    pub headers: HashMap<String, Vec<String>>,
    /// `{}` when the platform sent no body.
    pub body: serde_json::Value,
    pub api_call_limit: Option<ApiCallLimit>,
    /// Seconds from `Retry-After`.
    pub retry_request_after: Option<f64>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let api_call_limit = headers
            .get("x-shopify-shop-api-call-limit")
            .and_then(|values| values.first())
            .and_then(|value| ApiCallLimit::parse(value));

        let retry_request_after = headers
            .get("retry-after")
            .and_then(|values| values.first())
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0);

        Self {
            code,
            headers,
            body,
            api_call_limit,
            retry_request_after,
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    #[must_use]
    pub const fn is_throttled(&self) -> bool {
        self.code == 429
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-request-id")
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// The `X-Shopify-API-Deprecated-Reason` header.
    #[must_use]
    pub fn deprecation_reason(&self) -> Option<&str> {
        self.headers
            .get("x-shopify-api-deprecated-reason")
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
