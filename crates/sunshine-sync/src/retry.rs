//! Optional exponential backoff for publishes.
//!
//! The default is a single attempt: a lost request or update is simply
//! superseded by the next one. Retries only apply to transient transport
//! failures (connection failed or suspended, publish rejected); encoding
//! errors fail immediately.

use std::future::Future;
use std::time::Duration;

use sunshine_core::{SyncConfig, SyncError};

pub const DEFAULT_INITIAL_DELAY_MS: u64 = 100;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Initial delay between retries (doubles each attempt)
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// At-most-once: no retries
    pub fn none() -> Self {
        Self::new(0, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_DELAY_MS)
    }

    pub fn from_sync_config(config: &SyncConfig) -> Self {
        Self::new(
            config.publish_retries,
            config.retry_initial_delay_ms,
            config.retry_max_delay_ms,
        )
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay_ms = (self.initial_delay.as_millis() as u64).saturating_mul(factor);
        let capped = delay_ms.min(self.max_delay.as_millis() as u64);
        Duration::from_millis(capped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

pub fn is_retryable(error: &SyncError) -> RetryDecision {
    if error.is_transient() {
        RetryDecision::Retry
    } else {
        RetryDecision::NoRetry
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T, SyncError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SyncError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("Publish succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(e) => {
                if is_retryable(&e) == RetryDecision::NoRetry || attempt >= config.max_retries {
                    if attempt > 0 {
                        tracing::warn!("Giving up after {} attempts: {}", attempt + 1, e);
                    }
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                attempt += 1;
                tracing::info!(
                    "Retry attempt {} of {} in {:?}: {}",
                    attempt,
                    config.max_retries,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
