//! # Invoke a task once.
//!
//! Helpers that call a [`TaskRecord`]'s callable and turn every outcome, panics
//! included, into a [`TaskResult`]. Event publishing and slot accounting stay in the
//! scheduler; this module only executes.
//!
//! ## Outcomes
//! ```text
//! Sync path:
//!   call() → Ready(Ok)    → Ok(None)            (value discarded)
//!   call() → Ready(Err e) → Err(e)
//!   call() → Pending(f)   → Ok(Some(f))         (complete now, f is detached)
//!   call() panics         → Err(Panicked)
//!
//! Deferred path:
//!   call() → Ready(r)     → r
//!   call() → Pending(f)   → f.await             (panics while polling → Err(Panicked))
//!   call() panics         → Err(Panicked)
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::TaskError;
use crate::tasks::{TaskOutput, TaskRecord, TaskResult};

/// Pending output of a synchronously dispatched task.
pub(crate) type Detached = BoxFuture<'static, TaskResult>;

/// Calls the task on the current stack without awaiting anything.
pub(crate) fn call_sync(record: &TaskRecord) -> Result<Option<Detached>, TaskError> {
    match invoke(record)? {
        TaskOutput::Ready(Ok(_)) => Ok(None),
        TaskOutput::Ready(Err(e)) => Err(e),
        TaskOutput::Pending(fut) => Ok(Some(fut)),
    }
}

/// Calls the task and awaits a pending output.
pub(crate) async fn call_deferred(record: &TaskRecord) -> TaskResult {
    match invoke(record)? {
        TaskOutput::Ready(res) => res,
        TaskOutput::Pending(fut) => settle(fut).await,
    }
}

/// Awaits a pending output, converting a panic into [`TaskError::Panicked`].
pub(crate) async fn settle(fut: Detached) -> TaskResult {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(TaskError::from_panic(payload)),
    }
}

fn invoke(record: &TaskRecord) -> Result<TaskOutput, TaskError> {
    let inv = record.config().invocation();
    catch_unwind(AssertUnwindSafe(|| record.task().call(inv))).map_err(TaskError::from_panic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{TaskConfig, TaskFn, TaskOptions};
    use serde_json::{Value, json};

    fn record(task: crate::tasks::TaskRef) -> TaskRecord {
        TaskRecord::new("t", task, TaskConfig::default())
    }

    #[test]
    fn test_sync_discards_value() {
        let rec = record(TaskFn::blocking(|_| Ok(json!(42))));
        assert!(matches!(call_sync(&rec), Ok(None)));
    }

    #[test]
    fn test_sync_error_and_panic() {
        let rec = record(TaskFn::blocking(|_| Err(TaskError::fail("nope"))));
        assert_eq!(call_sync(&rec).err(), Some(TaskError::fail("nope")));

        let rec = record(TaskFn::blocking(|_| panic!("kaboom")));
        assert_eq!(
            call_sync(&rec).err(),
            Some(TaskError::Panicked {
                info: "kaboom".into()
            })
        );
    }

    #[test]
    fn test_sync_returns_pending_without_polling() {
        let rec = record(TaskFn::future(|_| async { Ok(Value::Null) }));
        assert!(matches!(call_sync(&rec), Ok(Some(_))));
    }

    #[test]
    fn test_deferred_awaits_pending_and_passes_args() {
        let cfg = TaskOptions::new()
            .args([json!(2), json!(3)])
            .resolve()
            .unwrap();
        let task = TaskFn::future(|inv| async move {
            let a = inv.arg(0).and_then(Value::as_i64).unwrap_or(0);
            let b = inv.arg(1).and_then(Value::as_i64).unwrap_or(0);
            Ok(json!(a + b))
        });
        let rec = TaskRecord::new("sum", task, cfg);
        let res = futures::executor::block_on(call_deferred(&rec));
        assert_eq!(res, Ok(json!(5)));
    }

    #[test]
    fn test_deferred_panic_while_polling() {
        fn explode() -> TaskResult {
            panic!("late")
        }
        let rec = record(TaskFn::future(|_| async { explode() }));
        let res = futures::executor::block_on(call_deferred(&rec));
        assert_eq!(
            res,
            Err(TaskError::Panicked {
                info: "late".into()
            })
        );
    }
}
