#![forbid(unsafe_code)]

//! Retry policies for transient faults.
//!
//! [`RetryPolicy`] re-invokes a fallible operation until it succeeds, its
//! error is judged permanent, or the policy gives up. [`BoundedRetry`] is the
//! stock policy: a retry budget plus a [`BackoffStrategy`] deciding how long
//! to pause before each retry.
//!
//! Retrying is unrelated to undo. A retried operation is simply called again
//! and nothing is reverted between attempts.
//!
//! ```text
//! attempt 0 ──✗──► pause(0) ──► attempt 1 ──✗──► pause(1) ──► ... attempt N
//!                                                              N = max_retries
//! ```
//!
//! Pauses are computed, never randomized, so a test can assert the exact
//! schedule a policy will follow.
//!
//! # Example
//!
//! ```
//! use rewind_retry::{BackoffStrategy, BoundedRetry, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = BoundedRetry::new(3, BackoffStrategy::Exponential {
//!     initial: Duration::from_millis(100),
//!     cap: Duration::from_millis(300),
//! });
//! let schedule: Vec<_> = policy.schedule().collect();
//! assert_eq!(schedule, [100, 200, 300].map(Duration::from_millis));
//!
//! let mut calls = 0;
//! let result: Result<u32, &str> = BoundedRetry::immediate(2).run(|| {
//!     calls += 1;
//!     if calls < 3 { Err("busy") } else { Ok(calls) }
//! });
//! assert_eq!(result, Ok(3));
//! ```

use std::time::Duration;

const LOG_TARGET: &str = "rewind.retry";

/// Something that can re-invoke a fallible operation.
pub trait RetryPolicy {
    /// Call `op` until it succeeds, `is_transient` rejects its error, or the
    /// policy gives up. The last error is returned unchanged.
    fn run_when<T, E, F, P>(&self, op: F, is_transient: P) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: FnMut(&E) -> bool;

    /// Call `op` until it succeeds or the policy gives up, treating every
    /// error as transient.
    fn run<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.run_when(op, |_| true)
    }
}

/// How long to pause before each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackoffStrategy {
    /// The same pause before every retry.
    Fixed(Duration),
    /// Starts at `initial` and doubles per retry, never above `cap`.
    Exponential { initial: Duration, cap: Duration },
    /// Grows by `step` per retry, never above `cap`.
    Linear { step: Duration, cap: Duration },
}

impl BackoffStrategy {
    /// Pause before retry number `retry` (0 = first retry).
    ///
    /// Saturates instead of overflowing.
    #[must_use]
    pub fn pause(&self, retry: u32) -> Duration {
        match *self {
            Self::Fixed(pause) => pause,
            Self::Exponential { initial, cap } => {
                let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
                initial.saturating_mul(factor).min(cap)
            }
            Self::Linear { step, cap } => step.saturating_mul(retry.saturating_add(1)).min(cap),
        }
    }
}

/// A retry budget plus a backoff strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundedRetry {
    /// Retries after the first attempt; 0 means the operation runs once.
    pub max_retries: u32,
    /// Pause schedule between attempts.
    pub backoff: BackoffStrategy,
}

impl Default for BoundedRetry {
    fn default() -> Self {
        Self::new(
            3,
            BackoffStrategy::Exponential {
                initial: Duration::from_millis(50),
                cap: Duration::from_secs(1),
            },
        )
    }
}

impl BoundedRetry {
    #[must_use]
    pub fn new(max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Retry up to `max_retries` times without pausing.
    #[must_use]
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, BackoffStrategy::Fixed(Duration::ZERO))
    }

    /// Run the operation once and never retry.
    #[must_use]
    pub fn single_attempt() -> Self {
        Self::immediate(0)
    }

    /// Pause before retry number `attempt` (0-indexed).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.pause(attempt)
    }

    /// Every pause this policy can take, in order.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(|retry| self.delay(retry))
    }

    /// Longest total time spent pausing if every attempt fails.
    #[must_use]
    pub fn total_max_delay(&self) -> Duration {
        self.schedule().fold(Duration::ZERO, |total, pause| total.saturating_add(pause))
    }

    /// [`RetryPolicy::run_when`] with a caller-supplied sleep.
    ///
    /// `sleep` receives each pause in [`schedule`](Self::schedule) order.
    pub fn run_with_sleeper<T, E, F, P, S>(
        &self,
        mut op: F,
        mut is_transient: P,
        mut sleep: S,
    ) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: FnMut(&E) -> bool,
        S: FnMut(Duration),
    {
        let mut retry = 0;
        loop {
            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_transient(&err) {
                tracing::debug!(target: LOG_TARGET, retry, "permanent failure; not retrying");
                return Err(err);
            }
            if retry >= self.max_retries {
                tracing::warn!(
                    target: LOG_TARGET,
                    attempts = retry + 1,
                    "retry budget exhausted"
                );
                return Err(err);
            }

            let pause = self.delay(retry);
            tracing::debug!(
                target: LOG_TARGET,
                retry,
                pause = ?pause,
                "transient failure; retrying"
            );
            sleep(pause);
            retry += 1;
        }
    }
}

impl RetryPolicy for BoundedRetry {
    fn run_when<T, E, F, P>(&self, op: F, is_transient: P) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: FnMut(&E) -> bool,
    {
        self.run_with_sleeper(op, is_transient, std::thread::sleep)
    }
}
