use tokio::time::Duration;

use super::QuoteFailure;

/// Total attempts per request, first try included.
pub const MAX_ATTEMPTS: u32 = 3;
pub const NETWORK_RETRY_DELAY: Duration = Duration::from_secs(5);
pub const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(65);

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for `delay`, optionally restart the limiter window, then try again.
    Retry { delay: Duration, reset_window: bool },
    /// The failure is permanent for this run.
    GiveUp,
    /// The failure was retryable but the attempt cap is reached. A rate limit
    /// still carries its cooldown so the next caller starts in a fresh window.
    Exhausted { cooldown: Option<Duration> },
}

/// Bounded retry rules for quote requests, keyed by failure class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub network_delay: Duration,
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            network_delay: NETWORK_RETRY_DELAY,
            rate_limit_cooldown: RATE_LIMIT_COOLDOWN,
        }
    }
}

impl RetryPolicy {
    /// Decide the next step for `failure` observed on zero-based `attempt`.
    pub fn decide(&self, failure: &QuoteFailure, attempt: u32) -> RetryDecision {
        let (delay, reset_window) = match failure {
            QuoteFailure::Network(_) => (self.network_delay, false),
            QuoteFailure::RateLimited => (self.rate_limit_cooldown, true),
            QuoteFailure::NoData | QuoteFailure::InvalidSymbol(_) | QuoteFailure::Unknown(_) => {
                return RetryDecision::GiveUp
            }
        };

        if attempt + 1 >= self.max_attempts {
            RetryDecision::Exhausted {
                cooldown: reset_window.then_some(delay),
            }
        } else {
            RetryDecision::Retry {
                delay,
                reset_window,
            }
        }
    }
}
