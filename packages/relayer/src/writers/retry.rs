//! Retry policy for redeem submission.
//!
//! Redemption is idempotent on the destination, so redelivery is always
//! safe; the only question is whether it is useful. Transport failures are
//! retried with exponential backoff. Protocol rejections are not: a
//! duplicate settlement is success, and anything else means the relayer is
//! misconfigured, which no amount of resubmission fixes.

use std::time::Duration;

use a721_chain::{ContractError, SubmitError};

/// Transaction retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential growth.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Calculate backoff duration for a given attempt (0-indexed).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_secs =
            self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped = backoff_secs.min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Check if we should retry based on attempt count.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

/// Classification of a submission failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Temporary transport failure - retry with backoff.
    Transient,
    /// The message hash was already settled - the transfer is done,
    /// treat as success.
    AlreadySettled,
    /// The destination rejected the redemption - configuration error,
    /// do not retry.
    Fatal,
}

/// Classify a submission error for retry decisions.
pub fn classify(error: &SubmitError) -> ErrorClass {
    match error {
        SubmitError::Transport(_) => ErrorClass::Transient,
        SubmitError::Rejected(ContractError::AlreadyRedeemed) => ErrorClass::AlreadySettled,
        SubmitError::Rejected(_) => ErrorClass::Fatal,
    }
}
