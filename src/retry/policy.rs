//! Dual-budget retry execution with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::errors::SdkError;
use crate::transport::HttpResponse;

pub const HTTP_TOO_MANY_REQUESTS: u16 = 429;
pub const DEFAULT_RATE_LIMIT_RETRIES: u32 = 2;
pub const DEFAULT_TRANSIENT_RETRIES: u32 = 2;

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);
const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryReason {
    RateLimited,
    Transient,
}

/// Executable retry policy.
///
/// Retries on HTTP 429 up to `rate_limit_retries`, or on a transient status /
/// retryable transport fault up to `transient_retries`, whichever condition
/// matches the observed outcome. Once either budget is exhausted the last
/// response or error is returned as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub rate_limit_retries: u32,
    pub transient_retries: u32,
    /// Non-429 statuses treated as recoverable.
    pub transient_statuses: Vec<u16>,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_retries: DEFAULT_RATE_LIMIT_RETRIES,
            transient_retries: DEFAULT_TRANSIENT_RETRIES,
            transient_statuses: vec![409],
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    pub fn with_rate_limit_retries(mut self, retries: u32) -> Self {
        self.rate_limit_retries = retries;
        self
    }

    pub fn with_transient_retries(mut self, retries: u32) -> Self {
        self.transient_retries = retries;
        self
    }

    pub fn with_transient_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.transient_statuses = statuses;
        self
    }

    /// Policy with default budgets and zero backoff delay.
    pub fn no_delay() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        Duration::from_millis(base.min(self.max_delay.as_millis() as f64) as u64)
    }

    /// Classify an attempt outcome. `None` means the outcome is terminal.
    fn retry_reason(&self, outcome: &Result<HttpResponse, SdkError>) -> Option<RetryReason> {
        match outcome {
            Ok(response) if response.status == HTTP_TOO_MANY_REQUESTS => {
                Some(RetryReason::RateLimited)
            }
            Ok(response) if self.transient_statuses.contains(&response.status) => {
                Some(RetryReason::Transient)
            }
            Ok(_) => None,
            Err(SdkError::Transport(e)) if e.is_retryable() => Some(RetryReason::Transient),
            Err(_) => None,
        }
    }

    fn consume_budget(
        &self,
        reason: RetryReason,
        rate_limit_left: &mut u32,
        transient_left: &mut u32,
    ) -> bool {
        let budget = match reason {
            RetryReason::RateLimited => rate_limit_left,
            RetryReason::Transient => transient_left,
        };
        if *budget == 0 {
            return false;
        }
        *budget -= 1;
        true
    }

    /// Drive `operation` until a terminal outcome, suspending between
    /// attempts. Dropping the returned future aborts the in-flight attempt
    /// and any pending delay.
    pub async fn run_async<F, Fut>(&self, mut operation: F) -> Result<HttpResponse, SdkError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<HttpResponse, SdkError>>,
    {
        let mut rate_limit_left = self.rate_limit_retries;
        let mut transient_left = self.transient_retries;
        let mut attempt = 0u32;

        loop {
            let outcome = operation().await;
            let Some(reason) = self.retry_reason(&outcome) else {
                return outcome;
            };
            if !self.consume_budget(reason, &mut rate_limit_left, &mut transient_left) {
                return outcome;
            }

            let delay = self.backoff_delay(attempt);
            attempt += 1;
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                reason = ?reason,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Blocking twin of [`run_async`](Self::run_async): identical
    /// classification, the calling thread sleeps through each delay.
    pub fn run_blocking<F>(&self, mut operation: F) -> Result<HttpResponse, SdkError>
    where
        F: FnMut() -> Result<HttpResponse, SdkError>,
    {
        let mut rate_limit_left = self.rate_limit_retries;
        let mut transient_left = self.transient_retries;
        let mut attempt = 0u32;

        loop {
            let outcome = operation();
            let Some(reason) = self.retry_reason(&outcome) else {
                return outcome;
            };
            if !self.consume_budget(reason, &mut rate_limit_left, &mut transient_left) {
                return outcome;
            }

            let delay = self.backoff_delay(attempt);
            attempt += 1;
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                reason = ?reason,
                "retrying request"
            );
            std::thread::sleep(delay);
        }
    }
}
