//! # Retry policy for failed tasks.
//!
//! [`RetryPolicy`] determines whether a failed task is put back at the front of the queue.
//!
//! - [`RetryPolicy::Never`] the task is dropped after its first failure (default).
//! - [`RetryPolicy::OnFailure`] the task is re-enqueued while its budget lasts.
//!
//! ## Budget accounting
//! ```text
//! OnFailure { remaining: 2 } ── fail ──► retry, next record has remaining = 1
//! OnFailure { remaining: 1 } ── fail ──► retry, next record has remaining = 0
//! OnFailure { remaining: 0 } ── fail ──► dropped (retry-exhausted)
//! ```
//!
//! A task configured with `remaining = N` that always fails is retried exactly `N` times.

/// Policy controlling whether a failed task is retried.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Never retry: the task is dropped after a failure (default).
    #[default]
    Never,
    /// Retry on failure while `remaining > 0`.
    OnFailure {
        /// Retries left for this task.
        remaining: u32,
    },
}

impl RetryPolicy {
    /// Returns `true` when retries are enabled (`retry_on_fail`), even with an exhausted budget.
    pub fn is_enabled(&self) -> bool {
        matches!(self, RetryPolicy::OnFailure { .. })
    }

    /// Remaining retry budget, if retries are enabled.
    pub fn remaining(&self) -> Option<u32> {
        match self {
            RetryPolicy::Never => None,
            RetryPolicy::OnFailure { remaining } => Some(*remaining),
        }
    }

    /// Policy for the record that replaces a failed one.
    ///
    /// Returns `None` when the failure must not be retried
    /// (retries disabled or budget exhausted).
    pub fn next(&self) -> Option<RetryPolicy> {
        match self {
            RetryPolicy::OnFailure { remaining } if *remaining > 0 => {
                Some(RetryPolicy::OnFailure {
                    remaining: remaining - 1,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_does_not_retry() {
        assert_eq!(RetryPolicy::default(), RetryPolicy::Never);
        assert!(!RetryPolicy::Never.is_enabled());
        assert_eq!(RetryPolicy::Never.next(), None);
    }

    #[test]
    fn test_budget_decrements_until_exhausted() {
        let mut policy = RetryPolicy::OnFailure { remaining: 3 };
        let mut retries = 0;
        while let Some(next) = policy.next() {
            retries += 1;
            policy = next;
        }
        assert_eq!(retries, 3);
        assert_eq!(policy, RetryPolicy::OnFailure { remaining: 0 });
        assert!(policy.is_enabled());
        assert_eq!(policy.remaining(), Some(0));
    }
}
