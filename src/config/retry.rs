//! Retry tuning shared by the REST and GraphQL execution paths.

use std::time::Duration;

use crate::error::ConfigError;

/// Bounds for throttled-call retries.
///
/// `max_attempts` counts every request issued, including the first one, so a
/// policy with `max_attempts = 3` sleeps at most twice.
///
/// ```rust
/// use std::time::Duration;
/// use shopify_app::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts(), 5);
/// assert_eq!(policy.backoff_for(1), Duration::from_secs(1));
/// assert_eq!(policy.backoff_for(3), Duration::from_secs(4));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Default number of requests per call.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    /// Default first backoff step.
    pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_secs(1);
    /// Default backoff ceiling.
    pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(32);

    /// Creates a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRetryPolicy`] when `max_attempts` is zero
    /// or `max_backoff` is shorter than `base_backoff`.
    pub fn new(
        max_attempts: u32,
        base_backoff: Duration,
        max_backoff: Duration,
    ) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: "max_attempts must be at least 1".to_string(),
            });
        }
        if max_backoff < base_backoff {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: format!(
                    "max_backoff ({max_backoff:?}) is shorter than base_backoff ({base_backoff:?})"
                ),
            });
        }
        Ok(Self {
            max_attempts,
            base_backoff,
            max_backoff,
        })
    }

    /// Maximum number of requests issued for a single call.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// First backoff step.
    #[must_use]
    pub const fn base_backoff(&self) -> Duration {
        self.base_backoff
    }

    /// Ceiling applied to every computed or suggested delay.
    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Exponential delay after the given failed attempt (1-based):
    /// `base * 2^(attempt - 1)`, capped at `max_backoff`.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_backoff
            .checked_mul(1_u32 << exponent)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            base_backoff: Self::DEFAULT_BASE_BACKOFF,
            max_backoff: Self::DEFAULT_MAX_BACKOFF,
        }
    }
}
