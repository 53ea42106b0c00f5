use std::{future::Future, time::Duration};

use sui_mm_utils::constants::{SWAP_RETRY_ATTEMPTS, SWAP_RETRY_DELAY};

use crate::errors::MmError;

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub retryable: fn(&MmError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: SWAP_RETRY_ATTEMPTS,
            delay: SWAP_RETRY_DELAY,
            retryable: MmError::is_transient,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure {
    pub attempts: u32,
    pub last_error: MmError,
    /// Every attempt was used; false when a non-retryable error stopped early.
    pub exhausted: bool,
}

impl RetryPolicy {
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, MmError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let err = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !(self.retryable)(&err) {
                log::error!("{} attempt {} failed, not retryable: {}", label, attempt, err);
                return Err(RetryFailure {
                    attempts: attempt,
                    last_error: err,
                    exhausted: false,
                });
            }
            if attempt >= max_attempts {
                log::error!("{} failed after {} attempts: {}", label, attempt, err);
                return Err(RetryFailure {
                    attempts: attempt,
                    last_error: err,
                    exhausted: true,
                });
            }

            log::warn!(
                "{} attempt {}/{} failed: {}, retrying in {:?}",
                label,
                attempt,
                max_attempts,
                err,
                self.delay
            );
            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}
