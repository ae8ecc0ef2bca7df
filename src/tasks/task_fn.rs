//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(Invocation) -> TaskOutput`. Two constructors cover
//! the common shapes without spelling out [`TaskOutput`]:
//! - [`TaskFn::blocking`] for `Fn(Invocation) -> Result<Value, TaskError>`
//! - [`TaskFn::future`] for `Fn(Invocation) -> impl Future<Output = Result<Value, TaskError>>`
//!
//! Every call builds fresh state; shared state between retries goes through `Arc<...>`
//! captured explicitly by the closure.
//!
//! ## Example
//! ```rust
//! use queuevisor::{TaskError, TaskFn, TaskRef};
//! use serde_json::Value;
//!
//! let sync: TaskRef = TaskFn::blocking(|_inv| Ok::<_, TaskError>(Value::Null));
//! let deferred: TaskRef = TaskFn::future(|inv| async move {
//!     Ok::<_, TaskError>(inv.arg(0).cloned().unwrap_or(Value::Null))
//! });
//! # let _ = (sync, deferred);
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;

use crate::tasks::task::{Invocation, Task, TaskOutput, TaskRef, TaskResult};

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    f: F,
}

impl<F> TaskFn<F>
where
    F: Fn(Invocation) -> TaskOutput + Send + Sync + 'static,
{
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(f: F) -> TaskRef {
        Arc::new(Self::new(f))
    }
}

impl TaskFn<()> {
    /// Task from a closure that finishes within the call.
    pub fn blocking<G>(g: G) -> TaskRef
    where
        G: Fn(Invocation) -> TaskResult + Send + Sync + 'static,
    {
        TaskFn::arc(move |inv| TaskOutput::from(g(inv)))
    }

    /// Task from a closure that returns a future.
    pub fn future<G, Fut>(g: G) -> TaskRef
    where
        G: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        TaskFn::arc(move |inv| TaskOutput::Pending(g(inv).boxed()))
    }
}

impl<F> Task for TaskFn<F>
where
    F: Fn(Invocation) -> TaskOutput + Send + Sync + 'static, // Fn, not FnMut
{
    fn call(&self, inv: Invocation) -> TaskOutput {
        (self.f)(inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use serde_json::{Value, json};

    #[test]
    fn test_blocking_returns_ready() {
        let t = TaskFn::blocking(|inv| Ok(json!(inv.args.len())));
        let inv = Invocation {
            context: None,
            args: vec![json!(1), json!(2)].into(),
        };
        match t.call(inv) {
            TaskOutput::Ready(Ok(v)) => assert_eq!(v, json!(2)),
            _ => panic!("expected ready output"),
        }
    }

    #[test]
    fn test_future_returns_pending() {
        let t = TaskFn::future(|_inv| async { Err::<Value, _>(TaskError::fail("later")) });
        let out = t.call(Invocation::default());
        assert!(out.is_pending());
        let TaskOutput::Pending(fut) = out else {
            unreachable!()
        };
        let res = futures::executor::block_on(fut);
        assert_eq!(res, Err(TaskError::fail("later")));
    }

    #[test]
    fn test_context_downcast() {
        let t = TaskFn::blocking(|inv| {
            let name = inv.context::<String>().cloned().unwrap_or_default();
            Ok(json!(name))
        });
        let inv = Invocation {
            context: Some(Arc::new(String::from("receiver"))),
            args: Arc::from(Vec::new()),
        };
        match t.call(inv) {
            TaskOutput::Ready(Ok(v)) => assert_eq!(v, json!("receiver")),
            _ => panic!("expected ready output"),
        }
    }
}
