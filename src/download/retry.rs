//! Bounded attempt policy for verified downloads.
//!
//! A file is fetched from byte 0 on every attempt, with no delay between
//! attempts.
//!
//! # Example
//!
//! ```
//! use gofile_dl::download::{AttemptPolicy, RetryDecision};
//!
//! let policy = AttemptPolicy::default();
//! assert_eq!(policy.should_retry(1), RetryDecision::Retry { next_attempt: 2 });
//! assert!(matches!(policy.should_retry(3), RetryDecision::GiveUp { .. }));
//! ```

use tracing::debug;

/// Default number of download attempts per file.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound accepted for configured attempt counts.
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Decision after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Fetch the file again.
    Retry {
        /// 1-indexed number of the next attempt.
        next_attempt: u32,
    },

    /// Stop; the file is reported as failed.
    GiveUp {
        /// Human-readable reason.
        reason: String,
    },
}

/// How many times a file may be fetched before it is given up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    max_attempts: u32,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl AttemptPolicy {
    /// Creates a policy, clamping `max_attempts` into `1..=MAX_ATTEMPTS_LIMIT`.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, MAX_ATTEMPTS_LIMIT),
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides what to do after `attempt` (1-indexed) failed.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::GiveUp {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            next_attempt: attempt + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_policy_default_is_three() {
        assert_eq!(AttemptPolicy::default().max_attempts(), 3);
    }

    #[test]
    fn test_attempt_policy_clamps_bounds() {
        assert_eq!(AttemptPolicy::with_max_attempts(0).max_attempts(), 1);
        assert_eq!(AttemptPolicy::with_max_attempts(50).max_attempts(), MAX_ATTEMPTS_LIMIT);
        assert_eq!(AttemptPolicy::with_max_attempts(5).max_attempts(), 5);
    }

    #[test]
    fn test_should_retry_until_exhausted() {
        let policy = AttemptPolicy::default();
        assert_eq!(policy.should_retry(1), RetryDecision::Retry { next_attempt: 2 });
        assert_eq!(policy.should_retry(2), RetryDecision::Retry { next_attempt: 3 });
        match policy.should_retry(3) {
            RetryDecision::GiveUp { reason } => assert!(reason.contains("3")),
            other => panic!("Expected GiveUp, got: {other:?}"),
        }
    }

    #[test]
    fn test_single_attempt_policy_never_retries() {
        let policy = AttemptPolicy::with_max_attempts(1);
        assert!(matches!(policy.should_retry(1), RetryDecision::GiveUp { .. }));
    }
}
