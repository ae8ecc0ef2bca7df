//! Error types used by the queuevisor scheduler and tasks.
//!
//! This module defines three enums:
//!
//! - [`TaskError`]: failures raised by individual task executions.
//! - [`ConfigError`]: invalid per-task configuration, rejected at `add_task` time.
//! - [`DeferError`]: the deferred-execution host refused to schedule a callback.
//!
//! All of them provide `as_label` for logging/metrics.
//! Queue-state conditions (run on an empty or full queue, remove on an empty queue)
//! are never errors; they are reported through events only.

use thiserror::Error;

/// # Errors produced by task execution.
///
/// A `TaskError` returned (or a panic raised) by a callable on the synchronous
/// path is caught by the scheduler and routed through `TaskFailed`, `on_error`
/// and the retry machinery.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The callable panicked; the panic was caught by the scheduler.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The deferred-execution host refused to schedule the task.
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DeferError),
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use queuevisor::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "execution failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Dispatch(_) => "task_dispatch_failed",
        }
    }

    /// Converts a caught panic payload into [`TaskError::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        TaskError::Panicked {
            info: panic_message(payload.as_ref()),
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// # Invalid task configuration.
///
/// Returned by [`TaskOptions::resolve`](crate::TaskOptions::resolve) and
/// therefore by [`Scheduler::add_task`](crate::Scheduler::add_task) before
/// anything is enqueued.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `sync = false` without an `execute_in` mode.
    #[error("sync = false requires execute_in (micro_tasks or callback)")]
    ExecuteInRequired,

    /// `execute_in` given while the task is dispatched synchronously.
    #[error("execute_in is only valid with sync = false")]
    ExecuteInWithSync,

    /// `execute_in = callback` without a timeout.
    #[error("execute_in = callback requires a timeout")]
    TimeoutRequired,

    /// `timeout` given for a dispatch mode that does not use one.
    #[error("timeout is only valid with execute_in = callback")]
    TimeoutForbidden,

    /// `retry_on_fail = true` without a retry budget.
    #[error("retry_on_fail = true requires retry_count")]
    RetryCountRequired,

    /// `retry_on_fail = true` with a zero retry budget.
    #[error("retry_count must be a positive integer")]
    RetryCountNotPositive,

    /// `retry_count` given while retries are disabled.
    #[error("retry_count is only valid with retry_on_fail = true")]
    RetryCountWithoutRetry,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ExecuteInRequired => "config_execute_in_required",
            ConfigError::ExecuteInWithSync => "config_execute_in_with_sync",
            ConfigError::TimeoutRequired => "config_timeout_required",
            ConfigError::TimeoutForbidden => "config_timeout_forbidden",
            ConfigError::RetryCountRequired => "config_retry_count_required",
            ConfigError::RetryCountNotPositive => "config_retry_count_not_positive",
            ConfigError::RetryCountWithoutRetry => "config_retry_count_without_retry",
        }
    }
}

/// # Errors produced by a deferred-execution host.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeferError {
    /// No async runtime is available on the calling thread.
    #[error("no async runtime available to defer execution")]
    NoRuntime,

    /// The host is shutting down or otherwise refused the job.
    #[error("deferral rejected: {reason}")]
    Rejected {
        /// Why the host refused the job.
        reason: String,
    },
}

impl DeferError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DeferError::NoRuntime => "defer_no_runtime",
            DeferError::Rejected { .. } => "defer_rejected",
        }
    }
}
