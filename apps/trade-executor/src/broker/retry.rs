//! Retry with exponential backoff for read-only broker calls.
//!
//! Only calls that do not change broker state go through [`retry_read`]:
//! quotes, account snapshots and position queries. Trade requests are never
//! repeated here, since a lost reply may hide a live fill.
//!
//! # Example
//!
//! ```rust,ignore
//! use trade_executor::broker::{RetryPolicy, retry_read};
//!
//! let policy = RetryPolicy::default();
//! let tick = retry_read(&policy, "tick", || broker.tick("EURUSD"))?;
//! ```

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::TransportFault;
use crate::observability::record_read_retry;

/// How often and how patiently a read-only call is repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first call. Zero disables retrying.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay, jitter included.
    pub max_backoff: Duration,
    /// Growth of the delay per retry.
    pub backoff_multiplier: f64,
    /// Relative spread applied to each delay, 0.2 = ±20%.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Build a policy from all of its parts.
    #[must_use]
    pub const fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        backoff_multiplier: f64,
        jitter_factor: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
            backoff_multiplier,
            jitter_factor,
        }
    }

    /// Policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self::immediate(0)
    }

    /// Retry `max_attempts` times without sleeping.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO, 1.0, 0.0)
    }
}

/// Delays for the successive retries of one call.
///
/// The n-th delay is `initial_backoff * backoff_multiplier^n`, spread by the
/// jitter factor and capped at `max_backoff`. Delays are whole milliseconds.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    policy: RetryPolicy,
    retries: u32,
}

impl ExponentialBackoff {
    /// Start a fresh delay sequence.
    #[must_use]
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            policy: policy.clone(),
            retries: 0,
        }
    }

    /// Next delay, or `None` once the retries are used up.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if !self.has_remaining_attempts() {
            return None;
        }

        let delay = self.jittered(self.nominal_delay());
        self.retries += 1;

        Some(delay.min(self.policy.max_backoff))
    }

    /// Retries handed out so far.
    #[must_use]
    pub const fn current_attempt(&self) -> u32 {
        self.retries
    }

    /// Whether another retry is allowed.
    #[must_use]
    pub const fn has_remaining_attempts(&self) -> bool {
        self.retries < self.policy.max_attempts
    }

    fn nominal_delay(&self) -> Duration {
        let cap = self.policy.max_backoff;
        let exponent = i32::try_from(self.retries).unwrap_or(i32::MAX);
        let millis = (self.policy.initial_backoff.as_millis() as f64
            * self.policy.backoff_multiplier.powi(exponent))
        .round();

        if !millis.is_finite() || millis >= cap.as_millis() as f64 {
            return cap;
        }
        Duration::from_millis(millis as u64)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let spread = self.policy.jitter_factor;
        if spread <= 0.0 || delay.is_zero() {
            return delay;
        }

        let factor = rand::rng().random_range((1.0 - spread).max(0.0)..=1.0 + spread);
        Duration::from_millis((delay.as_millis() as f64 * factor).round() as u64)
    }
}

/// Run a read-only broker call, retrying transport faults with backoff.
///
/// Returns the last fault once the policy is exhausted.
pub fn retry_read<T, F>(policy: &RetryPolicy, operation: &str, mut call: F) -> Result<T, TransportFault>
where
    F: FnMut() -> Result<T, TransportFault>,
{
    let mut backoff = ExponentialBackoff::new(policy);

    loop {
        match call() {
            Ok(value) => return Ok(value),
            Err(fault) => {
                let Some(delay) = backoff.next_backoff() else {
                    tracing::error!(
                        operation,
                        attempts = backoff.current_attempt() + 1,
                        error = %fault,
                        "Broker read failed, retries exhausted"
                    );
                    return Err(fault);
                };

                tracing::warn!(
                    operation,
                    attempt = backoff.current_attempt(),
                    delay_ms = delay.as_millis() as u64,
                    error = %fault,
                    "Broker read failed, retrying"
                );
                record_read_retry(operation);

                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
        }
    }
}
