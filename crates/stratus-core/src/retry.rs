//! Retry policy with exponential backoff and an explicit exemption list.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ResolveError, ResolveErrorKind};

/// Default number of total attempts for a provider call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed {
        delay: Duration,
    },
    /// `base * factor^retry`, capped at `max`.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        /// Add up to 50% of the capped delay at random, never exceeding
        /// `max`. With `factor >= 1.5` waits still never shrink.
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(10),
            jitter: false,
        }
    }
}

impl Backoff {
    /// No wait between attempts.
    pub const fn none() -> Self {
        Self::Fixed {
            delay: Duration::ZERO,
        }
    }

    /// Delay before the retry that follows failed attempt `retry` (0-based).
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
                let seconds = base.as_secs_f64() * factor.powi(exponent);
                let capped = Duration::from_secs_f64(seconds.min(max.as_secs_f64()));

                if !jitter {
                    return capped;
                }

                let millis = u64::try_from(capped.as_millis()).unwrap_or(u64::MAX);
                let offset = fastrand::u64(0..=millis / 2);
                Duration::from_millis(millis.saturating_add(offset)).min(max)
            }
        }
    }
}

/// Bounded retry around a fallible provider call.
///
/// Errors whose kind is in the exemption list are returned on first
/// occurrence. Every other error counts toward `max_attempts`; once the limit
/// is reached the last error is returned as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    exempt: Vec<ResolveErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Backoff::default())
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            exempt: Vec::new(),
        }
    }

    /// Disable retries: a single attempt.
    pub fn no_retry() -> Self {
        Self::new(1, Backoff::none())
    }

    /// Replace the exemption list.
    pub fn with_exemptions(mut self, kinds: &[ResolveErrorKind]) -> Self {
        self.exempt = kinds.to_vec();
        self
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub const fn backoff(&self) -> Backoff {
        self.backoff
    }

    pub fn exemptions(&self) -> &[ResolveErrorKind] {
        &self.exempt
    }

    pub fn is_exempt(&self, error: &ResolveError) -> bool {
        self.exempt.contains(&error.kind())
    }

    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }

    /// Run `call` until it succeeds, fails with an exempt error, or the
    /// attempt limit is reached.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ResolveError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResolveError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match call().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if self.is_exempt(&error) {
                debug!(operation, attempt, code = error.code(), "exempt error; not retrying");
                return Err(error);
            }

            if attempt >= self.max_attempts {
                warn!(
                    operation,
                    attempts = attempt,
                    error = %error,
                    "retry attempts exhausted"
                );
                return Err(error);
            }

            let delay = self.delay_for_retry(attempt - 1);
            warn!(
                operation,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "provider call failed; retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
