//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`] centralized settings for a [`Scheduler`](crate::Scheduler).
//!
//! ## Sentinel values
//! - `concurrency_limit = 0` → treated as `1` (the ceiling is never below one slot)

/// What happens when a task fails **inside** its deferred callback.
///
/// Failures on the synchronous path (and refusals by the deferred-execution host)
/// always go through `TaskFailed` / `on_error` / retry. Failures raised after the
/// deferral boundary are outside the dispatch call, so by default they are not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeferredFailure {
    /// Hand the error to the deferred-execution host; no `TaskFailed`, no `on_error`,
    /// no retry. The slot is released and one run attempt follows (default).
    #[default]
    Escalate,
    /// Treat it like a synchronous failure: `TaskFailed`, `on_error`, retry.
    Retry,
}

/// Global configuration for the scheduler.
///
/// ## Field semantics
/// - `concurrency_limit`: maximum in-flight tasks (min 1; clamped)
/// - `deferred_failures`: routing of failures raised inside deferred callbacks
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Maximum number of tasks dispatched and not yet completed.
    ///
    /// A deferred task holds its slot from dequeue until its callback finishes,
    /// including the time spent waiting for the timer.
    pub concurrency_limit: usize,

    /// Routing of failures raised inside deferred callbacks.
    pub deferred_failures: DeferredFailure,
}

impl SchedulerConfig {
    /// Config with the given ceiling and defaults elsewhere.
    pub fn with_limit(concurrency_limit: usize) -> Self {
        Self {
            concurrency_limit,
            ..Self::default()
        }
    }

    /// Returns the concurrency ceiling clamped to a minimum of 1.
    #[inline]
    pub fn concurrency_limit_clamped(&self) -> usize {
        self.concurrency_limit.max(1)
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `concurrency_limit = 1` (strictly sequential)
    /// - `deferred_failures = DeferredFailure::Escalate`
    fn default() -> Self {
        Self {
            concurrency_limit: 1,
            deferred_failures: DeferredFailure::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.concurrency_limit, 1);
        assert_eq!(cfg.deferred_failures, DeferredFailure::Escalate);
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        assert_eq!(SchedulerConfig::with_limit(0).concurrency_limit_clamped(), 1);
        assert_eq!(SchedulerConfig::with_limit(4).concurrency_limit_clamped(), 4);
    }
}
