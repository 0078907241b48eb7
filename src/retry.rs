//! Bounded retry policy for read-after-write verification.

use std::time::Duration;

/// A fixed-delay retry budget.
///
/// `max_attempts` counts *re*-attempts after the initial try, so a policy with
/// `max_attempts = 2` performs at most three reads in total. The delay is paid
/// before each re-attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A policy that never re-attempts.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delays to pay before each re-attempt, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let delay = self.delay;

        (0..self.max_attempts).map(move |_| delay)
    }

    /// Sleep for one re-attempt slot.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for RetryPolicy {
    /// The verification budget: the initial read plus at most two delayed
    /// re-reads, the ceiling the reconciler's verification step is allowed.
    fn default() -> Self {
        Self::new(2, Duration::from_millis(250))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_allows_two_reattempts() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_attempts(), 2);
        assert_eq!(policy.delays().count(), 2);
    }

    #[test]
    fn none_policy_yields_no_delays() {
        let policy = RetryPolicy::none();

        assert_eq!(policy.max_attempts(), 0);
        assert_eq!(policy.delays().count(), 0);
    }

    #[test]
    fn delays_are_uniform() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));

        assert!(
            policy.delays().all(|d| d == Duration::from_millis(10)),
            "every slot should pay the configured delay"
        );
    }

    #[tokio::test]
    async fn pause_with_zero_delay_returns_immediately() {
        let policy = RetryPolicy::new(1, Duration::ZERO);

        policy.pause().await;
    }
}
