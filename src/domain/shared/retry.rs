use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Classifies an error as transient (worth retrying) or permanent.
pub trait Retryable {
    fn is_retryable(&self) -> bool;

    /// Server-provided hint for how long to wait before the next attempt
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Bounded exponential backoff shared by every network call site
/// (segment synthesis, upload chunks, artifact attachment).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `attempt` is the number of attempts already made (1-based).
    pub fn should_retry<E: Retryable>(&self, attempt: u32, error: &E) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }

        error.is_retryable()
    }

    /// Delay after the given failed attempt: base, 2*base, 4*base... capped at max_delay.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(multiplier).min(self.max_delay)
    }

    /// Computed backoff, stretched to honour a longer retry-after hint.
    pub fn delay_for_error<E: Retryable>(&self, attempt: u32, error: &E) -> Duration {
        let computed = self.delay_for(attempt);
        match error.retry_after() {
            Some(hint) if hint > computed => hint,
            _ => computed,
        }
    }

    pub async fn wait_before_retry<E: Retryable>(&self, attempt: u32, error: &E) {
        let delay = self.delay_for_error(attempt, error);

        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            next_attempt = attempt + 1,
            max_attempts = self.max_attempts,
            "Retrying after backoff"
        );
        sleep(delay).await;
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt budget is spent.
    /// The closure receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1u32;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        retryable = e.is_retryable(),
                        error = %e,
                        "Attempt failed"
                    );

                    if !self.should_retry(attempt, &e) {
                        return Err(e);
                    }

                    self.wait_before_retry(attempt, &e).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(4, Duration::from_secs(1), Duration::from_secs(8))
    }
}
