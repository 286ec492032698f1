//! Retry bookkeeping decoupled from I/O.
//!
//! `RetryState` only counts attempts and computes waits; callers perform the
//! request, report transient failures, and sleep for the returned duration.

use std::time::Duration;

/// A failure worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientFailure {
    /// Retryable HTTP status (429, 5xx gateway errors)
    Status(u16),
    Timeout,
}

/// Bounds and backoff of a retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one
    pub max_retries: u32,
    /// Wait before retry `n` is `base_delay * 2^n`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that gives up on the first failure.
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// What to do after a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep `wait`, then issue attempt number `retry + 1`.
    Retry { retry: u32, wait: Duration },
    /// Budget exhausted after `attempts` attempts.
    GiveUp {
        attempts: u32,
        last: TransientFailure,
    },
}

#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    retries: u32,
    last_failure: Option<TransientFailure>,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            retries: 0,
            last_failure: None,
        }
    }

    /// Attempts issued so far, counting the one in flight.
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }

    pub fn last_failure(&self) -> Option<TransientFailure> {
        self.last_failure
    }

    pub fn on_failure(&mut self, failure: TransientFailure) -> RetryDecision {
        self.last_failure = Some(failure);
        if self.retries < self.policy.max_retries {
            self.retries += 1;
            RetryDecision::Retry {
                retry: self.retries,
                wait: self.policy.delay_for(self.retries),
            }
        } else {
            RetryDecision::GiveUp {
                attempts: self.attempts(),
                last: failure,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_from_first_retry() {
        let policy = RetryPolicy::new(2, Duration::from_secs(5));
        let mut state = RetryState::new(policy);

        assert_eq!(
            state.on_failure(TransientFailure::Status(503)),
            RetryDecision::Retry {
                retry: 1,
                wait: Duration::from_secs(10)
            }
        );
        assert_eq!(
            state.on_failure(TransientFailure::Timeout),
            RetryDecision::Retry {
                retry: 2,
                wait: Duration::from_secs(20)
            }
        );
        assert_eq!(
            state.on_failure(TransientFailure::Timeout),
            RetryDecision::GiveUp {
                attempts: 3,
                last: TransientFailure::Timeout
            }
        );
        assert_eq!(state.attempts(), policy.max_attempts());
    }

    #[test]
    fn test_no_retries_gives_up_immediately() {
        let mut state = RetryState::new(RetryPolicy::none());
        assert_eq!(
            state.on_failure(TransientFailure::Status(429)),
            RetryDecision::GiveUp {
                attempts: 1,
                last: TransientFailure::Status(429)
            }
        );
        assert_eq!(state.last_failure(), Some(TransientFailure::Status(429)));
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(u64::MAX / 2));
        assert_eq!(policy.delay_for(40), Duration::MAX);
    }
}
