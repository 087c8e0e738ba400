//! Retry schedule for outbound HTTP calls

use std::time::Duration;

/// Retry policy for remote service calls
///
/// Each attempt gets a longer deadline than the one before it, and a
/// rate-limited response waits with exponential backoff before the next
/// attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Deadline of the first attempt (grows linearly)
    pub base_timeout: Duration,
    /// Wait after the first rate-limited attempt (doubles each attempt)
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_timeout: Duration::from_secs(5),
            base_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Deadline for a zero-based attempt: `base_timeout * (attempt + 1)`
    #[must_use]
    pub fn timeout_for_attempt(&self, attempt: u32) -> Duration {
        self.base_timeout.saturating_mul(attempt.saturating_add(1))
    }

    /// Wait after a rate-limited attempt: `base_backoff * 2^attempt`
    #[must_use]
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Whether another attempt follows the given zero-based attempt
    #[must_use]
    pub const fn has_attempt_after(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts
    }
}

/// Whether an HTTP status signals rate limiting
#[must_use]
pub const fn is_rate_limited(status: u16) -> bool {
    status == 429
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_timeout, Duration::from_secs(5));
        assert_eq!(policy.base_backoff, Duration::from_secs(1));
    }

    #[test]
    fn timeouts_grow_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.timeout_for_attempt(0), Duration::from_secs(5));
        assert_eq!(policy.timeout_for_attempt(1), Duration::from_secs(10));
        assert_eq!(policy.timeout_for_attempt(2), Duration::from_secs(15));
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_secs(4));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::default();
        assert!(policy.backoff_for_attempt(64) >= Duration::from_secs(1));
    }

    #[test]
    fn last_attempt_has_no_successor() {
        let policy = RetryPolicy::default();
        assert!(policy.has_attempt_after(0));
        assert!(policy.has_attempt_after(1));
        assert!(!policy.has_attempt_after(2));
    }

    #[test]
    fn rate_limit_status() {
        assert!(is_rate_limited(429));
        assert!(!is_rate_limited(200));
        assert!(!is_rate_limited(503));
    }
}
