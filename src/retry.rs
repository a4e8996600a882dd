//! Retry logic for node operations.
//!
//! Transient network failures are retried with exponential backoff; reverts,
//! validation failures and missing-wallet errors are surfaced immediately.

use crate::config::ClientConfig;
use crate::error::{Result, RetryContext, SaccoError};
use backoff::{backoff::Backoff, ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry strategy configuration
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    /// Maximum number of retries
    pub max_retries: usize,
    /// Initial retry delay
    pub initial_delay: Duration,
    /// Maximum retry delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub multiplier: f64,
}

impl RetryStrategy {
    /// Create a new retry strategy from client config
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
            multiplier: config.retry_multiplier,
        }
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_max_interval(self.max_delay)
            .with_multiplier(self.multiplier)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Check if an error is retryable
    pub fn is_retryable(error: &SaccoError) -> bool {
        match error {
            // Transport-level failures are retryable
            SaccoError::Network(_) => true,
            // Node 5xx responses are retryable
            SaccoError::Node(msg) => {
                msg.contains("500") || msg.contains("502") || msg.contains("503")
            }
            // Server-side JSON-RPC errors (-32000 range) may be transient;
            // anything else (invalid params, reverts mapped earlier) is not
            SaccoError::Rpc { code, .. } => (-32099..=-32000).contains(code),
            // Receipt not visible yet, the transaction may still be propagating
            SaccoError::ReceiptNotFound(_) => true,
            // Malformed responses can be a proxy hiccup
            SaccoError::InvalidResponse(_) => true,
            // Reverts, validation, missing wallet: never retried
            _ => false,
        }
    }

    /// Execute a function with retry logic
    pub async fn retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.create_backoff();
        let mut retry_ctx = RetryContext::new();
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("attempt {} of {}", attempts, self.max_retries + 1);

            match operation().await {
                Ok(result) => {
                    if attempts > 1 {
                        debug!("operation succeeded after {} attempts", attempts);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !Self::is_retryable(&error) {
                        warn!("non-retryable error: {:?}", error);
                        return Err(error);
                    }

                    if attempts > self.max_retries {
                        warn!(
                            "max retries ({}) exceeded, last error: {:?}",
                            self.max_retries, error
                        );
                        return Err(SaccoError::MaxRetriesExceeded(self.max_retries));
                    }

                    let delay = match backoff.next_backoff() {
                        Some(d) => d,
                        None => {
                            warn!("backoff exhausted");
                            return Err(SaccoError::MaxRetriesExceeded(self.max_retries));
                        }
                    };

                    retry_ctx.record_attempt(&error.to_string(), delay.as_millis() as u64);

                    warn!(
                        "attempt {} failed: {:?}, retrying in {:?}",
                        attempts, error, delay
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
