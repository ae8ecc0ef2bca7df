//! # Per-task configuration.
//!
//! [`TaskOptions`] is the partial, caller-facing configuration passed to
//! [`Scheduler::add_task`](crate::Scheduler::add_task). Every field is optional and
//! falls back to a documented default. [`TaskOptions::resolve`] validates the
//! conditional fields and produces an immutable [`TaskConfig`].
//!
//! ## Defaults
//! | Field           | Default  |
//! |-----------------|----------|
//! | `sync`          | `true`   |
//! | `execute_in`    | none     |
//! | `timeout`       | none     |
//! | `context`       | none     |
//! | `args`          | `[]`     |
//! | `execute`       | `true`   |
//! | `retry_on_fail` | `false`  |
//! | `retry_count`   | none     |
//!
//! ## Rules
//! - `sync = false` requires `execute_in`; `execute_in` requires `sync = false`.
//! - `execute_in = Callback` requires `timeout`; `timeout` is rejected otherwise.
//! - `retry_on_fail = true` requires a positive `retry_count`; `retry_count` is rejected otherwise.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use queuevisor::{ExecuteIn, TaskOptions};
//!
//! let cfg = TaskOptions::new()
//!     .sync(false)
//!     .execute_in(ExecuteIn::Callback)
//!     .timeout(Duration::from_millis(100))
//!     .retry(3)
//!     .resolve()
//!     .unwrap();
//!
//! assert!(!cfg.is_sync());
//! assert_eq!(cfg.timeout(), Some(Duration::from_millis(100)));
//! assert_eq!(cfg.retry_count(), Some(3));
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::{ConfigError, TaskError};
use crate::policies::{Deferral, Dispatch, ExecuteIn, RetryPolicy};
use crate::tasks::task::{Context, Invocation};

type SuccessHook = Arc<dyn Fn(&Value) + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&TaskError) + Send + Sync>;
type RetryHook = Arc<dyn Fn(&TaskError, u32) + Send + Sync>;
type FinallyHook = Arc<dyn Fn() + Send + Sync>;

/// Caller hooks fired at task transitions, independent of the event channel.
#[derive(Clone, Default)]
pub struct Hooks {
    on_success: Option<SuccessHook>,
    on_error: Option<ErrorHook>,
    on_retry: Option<RetryHook>,
    on_finally: Option<FinallyHook>,
}

impl Hooks {
    pub(crate) fn success(&self, value: &Value) {
        if let Some(h) = &self.on_success {
            guard("on_success", || h(value));
        }
    }

    pub(crate) fn error(&self, error: &TaskError) {
        if let Some(h) = &self.on_error {
            guard("on_error", || h(error));
        }
    }

    pub(crate) fn retry(&self, error: &TaskError, remaining: u32) {
        if let Some(h) = &self.on_retry {
            guard("on_retry", || h(error, remaining));
        }
    }

    pub(crate) fn finally(&self) {
        if let Some(h) = &self.on_finally {
            guard("on_finally", || h());
        }
    }
}

/// Runs a caller hook, isolating panics so the run loop never unwinds.
fn guard(hook: &'static str, f: impl FnOnce()) {
    if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        tracing::warn!(
            hook,
            panic = %crate::error::panic_message(payload.as_ref()),
            "task hook panicked"
        );
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_retry", &self.on_retry.is_some())
            .field("on_finally", &self.on_finally.is_some())
            .finish()
    }
}

/// Partial task configuration; unset fields take their defaults on [`resolve`](Self::resolve).
#[derive(Clone, Default)]
pub struct TaskOptions {
    sync: Option<bool>,
    execute_in: Option<ExecuteIn>,
    timeout: Option<Duration>,
    context: Option<Context>,
    args: Option<Vec<Value>>,
    execute: Option<bool>,
    retry_on_fail: Option<bool>,
    retry_count: Option<u32>,
    hooks: Hooks,
}

impl TaskOptions {
    /// Empty options (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` = synchronous dispatch, `false` = deferred dispatch.
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = Some(sync);
        self
    }

    /// Deferral mechanism for `sync = false`.
    pub fn execute_in(mut self, mode: ExecuteIn) -> Self {
        self.execute_in = Some(mode);
        self
    }

    /// Delay before the deferred callback fires (`execute_in = Callback` only).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Receiver binding passed to the callable.
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Positional arguments passed to the callable.
    pub fn args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args = Some(args.into_iter().collect());
        self
    }

    /// Caller-side gating flag; stored but not interpreted by the scheduler.
    pub fn execute(mut self, execute: bool) -> Self {
        self.execute = Some(execute);
        self
    }

    /// Enables or disables retry on failure.
    pub fn retry_on_fail(mut self, enabled: bool) -> Self {
        self.retry_on_fail = Some(enabled);
        self
    }

    /// Retry budget (requires `retry_on_fail = true`).
    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = Some(count);
        self
    }

    /// Shorthand for `retry_on_fail(true).retry_count(count)`.
    pub fn retry(self, count: u32) -> Self {
        self.retry_on_fail(true).retry_count(count)
    }

    /// Called with the result of a deferred task.
    pub fn on_success(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.hooks.on_success = Some(Arc::new(f));
        self
    }

    /// Called when a failure is handled by the scheduler.
    pub fn on_error(mut self, f: impl Fn(&TaskError) + Send + Sync + 'static) -> Self {
        self.hooks.on_error = Some(Arc::new(f));
        self
    }

    /// Called before a failed task is re-enqueued, with the budget before decrement.
    pub fn on_retry(mut self, f: impl Fn(&TaskError, u32) + Send + Sync + 'static) -> Self {
        self.hooks.on_retry = Some(Arc::new(f));
        self
    }

    /// Called once per dispatch, after the success/failure branch.
    pub fn on_finally(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_finally = Some(Arc::new(f));
        self
    }

    /// Merges the options over the defaults and validates conditional fields.
    pub fn resolve(self) -> Result<TaskConfig, ConfigError> {
        let dispatch = match (self.sync.unwrap_or(true), self.execute_in, self.timeout) {
            (true, Some(_), _) => return Err(ConfigError::ExecuteInWithSync),
            (true, None, Some(_)) => return Err(ConfigError::TimeoutForbidden),
            (true, None, None) => Dispatch::Sync,
            (false, None, _) => return Err(ConfigError::ExecuteInRequired),
            (false, Some(ExecuteIn::MicroTasks), Some(_)) => {
                return Err(ConfigError::TimeoutForbidden);
            }
            (false, Some(ExecuteIn::MicroTasks), None) => Dispatch::Deferred(Deferral::Microtask),
            (false, Some(ExecuteIn::Callback), None) => return Err(ConfigError::TimeoutRequired),
            (false, Some(ExecuteIn::Callback), Some(d)) => Dispatch::Deferred(Deferral::After(d)),
        };

        let retry = match (self.retry_on_fail.unwrap_or(false), self.retry_count) {
            (true, None) => return Err(ConfigError::RetryCountRequired),
            (true, Some(0)) => return Err(ConfigError::RetryCountNotPositive),
            (true, Some(n)) => RetryPolicy::OnFailure { remaining: n },
            (false, Some(_)) => return Err(ConfigError::RetryCountWithoutRetry),
            (false, None) => RetryPolicy::Never,
        };

        Ok(TaskConfig {
            dispatch,
            retry,
            context: self.context,
            args: self.args.unwrap_or_default().into(),
            execute: self.execute.unwrap_or(true),
            hooks: self.hooks,
        })
    }
}

impl std::fmt::Debug for TaskOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskOptions")
            .field("sync", &self.sync)
            .field("execute_in", &self.execute_in)
            .field("timeout", &self.timeout)
            .field("context", &self.context.is_some())
            .field("args", &self.args)
            .field("execute", &self.execute)
            .field("retry_on_fail", &self.retry_on_fail)
            .field("retry_count", &self.retry_count)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Resolved, immutable task configuration.
///
/// Cheap to clone; a retry derives a new value via [`TaskConfig::with_retry`]
/// instead of mutating the current one.
#[derive(Clone)]
pub struct TaskConfig {
    dispatch: Dispatch,
    retry: RetryPolicy,
    context: Option<Context>,
    args: Arc<[Value]>,
    execute: bool,
    hooks: Hooks,
}

impl TaskConfig {
    /// Dispatch mode.
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch
    }

    /// `true` when dispatched synchronously.
    pub fn is_sync(&self) -> bool {
        self.dispatch.is_sync()
    }

    /// Deferral mechanism, for deferred dispatch.
    pub fn execute_in(&self) -> Option<ExecuteIn> {
        self.dispatch.deferral().map(|d| d.execute_in())
    }

    /// Timer delay, for `execute_in = Callback`.
    pub fn timeout(&self) -> Option<Duration> {
        self.dispatch.deferral().and_then(|d| d.timeout())
    }

    /// Retry policy.
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// `true` when retries are enabled.
    pub fn retry_on_fail(&self) -> bool {
        self.retry.is_enabled()
    }

    /// Remaining retry budget, when retries are enabled.
    pub fn retry_count(&self) -> Option<u32> {
        self.retry.remaining()
    }

    /// Receiver binding.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Positional arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Caller-side gating flag.
    pub fn execute(&self) -> bool {
        self.execute
    }

    pub(crate) fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Builds the call arguments for one dispatch.
    pub(crate) fn invocation(&self) -> Invocation {
        Invocation {
            context: self.context.clone(),
            args: Arc::clone(&self.args),
        }
    }

    /// Returns a copy with a different retry policy.
    pub(crate) fn with_retry(&self, retry: RetryPolicy) -> Self {
        Self {
            retry,
            ..self.clone()
        }
    }
}

impl Default for TaskConfig {
    /// Fully defaulted configuration (sync, no retries, no args).
    fn default() -> Self {
        Self {
            dispatch: Dispatch::Sync,
            retry: RetryPolicy::Never,
            context: None,
            args: Arc::from(Vec::new()),
            execute: true,
            hooks: Hooks::default(),
        }
    }
}

impl std::fmt::Debug for TaskConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskConfig")
            .field("dispatch", &self.dispatch)
            .field("retry", &self.retry)
            .field("context", &self.context.is_some())
            .field("args", &self.args)
            .field("execute", &self.execute)
            .field("hooks", &self.hooks)
            .finish()
    }
}
