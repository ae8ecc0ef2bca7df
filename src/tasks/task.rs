//! # Task abstraction.
//!
//! This module defines the [`Task`] trait: a callable that receives an [`Invocation`]
//! (receiver context + positional arguments) and returns a [`TaskOutput`], which is
//! either a ready result or a pending future.
//! The common handle type is [`TaskRef`], an `Arc<dyn Task>` suitable for sharing
//! between the queue, retries and deferred callbacks.

use std::any::Any;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::TaskError;

/// Receiver ("this") binding handed to a callable.
pub type Context = Arc<dyn Any + Send + Sync>;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// Result type produced by a callable.
pub type TaskResult = Result<Value, TaskError>;

/// Arguments of a single call.
#[derive(Clone, Default)]
pub struct Invocation {
    /// Receiver binding from the task configuration.
    pub context: Option<Context>,
    /// Positional arguments, in configuration order.
    pub args: Arc<[Value]>,
}

impl Invocation {
    /// Positional argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Downcasts the receiver to `T`.
    pub fn context<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.context.as_deref().and_then(|c| c.downcast_ref::<T>())
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("context", &self.context.is_some())
            .field("args", &self.args)
            .finish()
    }
}

/// Value returned by a callable.
pub enum TaskOutput {
    /// The call finished; this is its result.
    Ready(TaskResult),
    /// The call produced a value that settles later.
    Pending(BoxFuture<'static, TaskResult>),
}

impl TaskOutput {
    /// Successful ready output.
    pub fn ok(value: impl Into<Value>) -> Self {
        TaskOutput::Ready(Ok(value.into()))
    }

    /// Failed ready output.
    pub fn err(error: TaskError) -> Self {
        TaskOutput::Ready(Err(error))
    }

    /// Returns `true` for [`TaskOutput::Pending`].
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskOutput::Pending(_))
    }
}

impl From<TaskResult> for TaskOutput {
    fn from(res: TaskResult) -> Self {
        TaskOutput::Ready(res)
    }
}

/// # Unit of work.
///
/// `call` is invoked once per dispatch. For synchronously dispatched tasks the scheduler
/// treats the task as complete as soon as `call` returns, without awaiting a
/// [`TaskOutput::Pending`]. For deferred tasks the pending value is awaited before
/// `on_success` fires.
///
/// Returning `Err` (or panicking) from `call` on the synchronous path is a task failure.
///
/// # Example
/// ```
/// use queuevisor::{Invocation, Task, TaskOutput};
///
/// struct Double;
///
/// impl Task for Double {
///     fn call(&self, inv: Invocation) -> TaskOutput {
///         let n = inv.arg(0).and_then(|v| v.as_i64()).unwrap_or(0);
///         TaskOutput::ok(n * 2)
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Invokes the task once.
    fn call(&self, inv: Invocation) -> TaskOutput;
}
