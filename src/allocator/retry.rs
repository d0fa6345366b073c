//! Retry policy for lost compare-and-swap races.

use std::time::Duration;

use rand::Rng;

/// Bounded retry with capped exponential backoff and uniform jitter.
///
/// Conflicts are expected under concurrent allocation, so the defaults
/// are short: 5 attempts starting at 50ms. The allocator never retries
/// unboundedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(2_000),
        }
    }
}

impl RetryPolicy {
    /// Build a policy from environment variables, falling back to the
    /// defaults for anything unset or unparseable.
    ///
    /// - `DOCNUM_MAX_ATTEMPTS`: total attempts (default: 5)
    /// - `DOCNUM_RETRY_INITIAL_MS`: first retry delay in ms (default: 50)
    /// - `DOCNUM_RETRY_MAX_MS`: delay cap in ms (default: 2000)
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_attempts: env_var("DOCNUM_MAX_ATTEMPTS").unwrap_or(default.max_attempts),
            initial_delay: env_var("DOCNUM_RETRY_INITIAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(default.initial_delay),
            max_delay: env_var("DOCNUM_RETRY_MAX_MS")
                .map(Duration::from_millis)
                .unwrap_or(default.max_delay),
        }
    }

    /// Delay before the retry following failed attempt number `attempt`
    /// (zero-based). Doubles per attempt up to the cap, then jittered
    /// uniformly over `[cap/2, cap]` so contending sessions spread out.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self
            .initial_delay
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_delay);
        let millis = base.as_millis() as u64;
        if millis == 0 {
            return base;
        }
        Duration::from_millis(rand::thread_rng().gen_range(millis / 2..=millis))
    }
}

fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
