use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Calls allowed per window; kept one below the provider's 8/minute cap.
pub const CALL_BUDGET: u32 = 7;
pub const WINDOW_LENGTH: Duration = Duration::from_secs(60);
/// Waits are measured against this so the provider's own window has surely rolled.
pub const WAIT_HORIZON: Duration = Duration::from_secs(61);

/// Call accounting for the current rate-limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub call_count: u32,
    pub window_start: Instant,
}

impl RateLimitWindow {
    fn starting_at(now: Instant) -> Self {
        Self {
            call_count: 0,
            window_start: now,
        }
    }
}

/// Pre-emptive throttle for the quote API.
///
/// Every outbound request, retries included, must be preceded by exactly one
/// [`acquire`](RateLimiter::acquire). The window sits behind an async mutex so
/// concurrent workers are serialised through the same budget.
#[derive(Debug)]
pub struct RateLimiter {
    budget: u32,
    state: Mutex<RateLimitWindow>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_budget(CALL_BUDGET)
    }

    pub fn with_budget(budget: u32) -> Self {
        Self {
            budget: budget.max(1),
            state: Mutex::new(RateLimitWindow::starting_at(Instant::now())),
        }
    }

    /// Charge one call, sleeping first if the window's budget is spent.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        if now.duration_since(state.window_start) >= WINDOW_LENGTH {
            *state = RateLimitWindow::starting_at(now);
        }

        if state.call_count >= self.budget {
            let elapsed = now.duration_since(state.window_start);
            let wait = WAIT_HORIZON.saturating_sub(elapsed);
            if !wait.is_zero() {
                log::info!(
                    "rate limit budget of {} calls used, waiting {:.1}s",
                    self.budget,
                    wait.as_secs_f64()
                );
                sleep(wait).await;
            }
            *state = RateLimitWindow::starting_at(Instant::now());
        }

        state.call_count += 1;
        log::debug!("rate limiter charged call {}/{}", state.call_count, self.budget);
    }

    /// Start a fresh window, used after the provider reported a rate-limit hit.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = RateLimitWindow::starting_at(Instant::now());
        log::debug!("rate limiter window reset");
    }

    pub async fn snapshot(&self) -> RateLimitWindow {
        *self.state.lock().await
    }
}
