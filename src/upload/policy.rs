use std::time::Duration;

/// Backoff schedule for answer submissions
///
/// Pure policy, decoupled from the transport. Attempts are numbered from 1;
/// the wait after a failed attempt `n` is `base_delay * 2^(n-1)` (1s, 2s,
/// 4s, ...). No wait follows the final attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts per submission
    pub max_attempts: u32,
    /// Wait after the first failed attempt; doubles on each retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait before the next attempt, or `None` when `attempt` was the last
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        Some(self.base_delay * 2u32.saturating_pow(attempt - 1))
    }
}

/// Sleep seam so the retry loop runs instantly under test
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Tokio-backed sleeper used outside tests
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
