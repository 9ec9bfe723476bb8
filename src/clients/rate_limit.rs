//! Advisory rate-limit counters.
//!
//! Every response refreshes the bucket of the surface it came from. The
//! counters never gate a request; throttling is handled when the platform
//! answers with a throttle signal. Updates are lock-free and a snapshot may
//! mix values from concurrent responses.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::clients::http_response::ApiCallLimit;

/// One surface's bucket as last reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketSnapshot {
    /// Bucket size (REST requests, or GraphQL cost points).
    pub capacity: f64,
    /// Room left in the bucket.
    pub remaining: f64,
    /// Units restored per second.
    pub leak_rate: f64,
}

/// Both buckets of one client.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RateLimitSnapshot {
    /// `None` until a REST response carried the call-limit header.
    pub rest: Option<BucketSnapshot>,
    /// `None` until a GraphQL response carried a cost extension.
    pub graphql: Option<BucketSnapshot>,
}

#[derive(Debug, Default)]
struct Bucket {
    // f64 bit patterns
    capacity: AtomicU64,
    remaining: AtomicU64,
    leak_rate: AtomicU64,
}

impl Bucket {
    fn store(&self, capacity: f64, remaining: f64, leak_rate: f64) {
        self.capacity.store(capacity.to_bits(), Ordering::Relaxed);
        self.remaining.store(remaining.to_bits(), Ordering::Relaxed);
        self.leak_rate.store(leak_rate.to_bits(), Ordering::Relaxed);
    }

    fn snapshot(&self) -> Option<BucketSnapshot> {
        let capacity = f64::from_bits(self.capacity.load(Ordering::Relaxed));
        if capacity <= 0.0 {
            return None;
        }
        Some(BucketSnapshot {
            capacity,
            remaining: f64::from_bits(self.remaining.load(Ordering::Relaxed)),
            leak_rate: f64::from_bits(self.leak_rate.load(Ordering::Relaxed)),
        })
    }
}

/// Per-client rate-limit state, shared by clones of the client.
#[derive(Debug, Default)]
pub struct RateLimitState {
    rest: Bucket,
    graphql: Bucket,
}

impl RateLimitState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a REST call-limit header.
    pub fn record_rest(&self, limit: &ApiCallLimit) {
        self.rest.store(
            f64::from(limit.bucket_size),
            f64::from(limit.remaining()),
            limit.leak_rate(),
        );
        tracing::debug!(
            used = limit.request_count,
            capacity = limit.bucket_size,
            "rest rate limit updated"
        );
    }

    /// Records a GraphQL throttle status.
    pub fn record_graphql(&self, maximum_available: f64, currently_available: f64, restore_rate: f64) {
        if !(maximum_available.is_finite() && currently_available.is_finite() && restore_rate.is_finite()) {
            return;
        }
        self.graphql
            .store(maximum_available, currently_available, restore_rate);
        tracing::debug!(
            available = currently_available,
            capacity = maximum_available,
            restore_rate,
            "graphql rate limit updated"
        );
    }

    #[must_use]
    pub fn snapshot(&self) -> RateLimitSnapshot {
        RateLimitSnapshot {
            rest: self.rest.snapshot(),
            graphql: self.graphql.snapshot(),
        }
    }
}
