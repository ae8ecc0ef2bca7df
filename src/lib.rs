//! # queuevisor
//!
//! **Queuevisor** is an in-process task queue with a concurrency ceiling.
//!
//! Callers enqueue tasks (callable + id + configuration), then drive execution
//! with [`Scheduler::run`]. At most `concurrency_limit` tasks are in flight at any
//! moment. Tasks are dispatched either inline or deferred (next turn of the
//! runtime, or after a timer). Failures can be retried with a bounded budget, and
//! every state change is published as a typed [`Event`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   add_task(task, id, TaskOptions, priority)
//!            │ resolve() ─► TaskConfig (validated, immutable)
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler                                                        │
//! │  - TaskQueue (FIFO, priority = front)                             │
//! │  - active counter (≤ concurrency_limit)                           │
//! │  - Notifier (per-kind ordered subscriber lists)                   │
//! │  - Defer host (TokioDefer by default)                             │
//! └──────┬─────────────────────────────┬──────────────────────────────┘
//!        │ run()                       │ emit(Event)
//!        ▼                             ▼
//!   Dispatch::Sync ── inline call   ┌─────────────┐
//!   Dispatch::Deferred ─► Defer ──► │  Notifier   │──► sub1.on_event()
//!        (microtask / timer)        └─────────────┘──► sub2.on_event() ...
//! ```
//!
//! ### Lifecycle
//! ```text
//! add_task ──► TaskAdded
//!
//! run():
//!   ├─ empty queue        ─► QueueEmpty
//!   ├─ all slots taken    ─► QueueFull
//!   └─ take slot, pop     ─► TaskStarted
//!        ├─ Ok  ─► TaskCompleted ─► release slot ─► run again
//!        └─ Err ─► TaskFailed ─► on_error
//!                  ├─ retry budget left ─► on_retry, TaskRetrying, re-add at front (TaskAdded)
//!                  └─ otherwise         ─► dropped
//!                  ─► release slot ─► run again
//!
//! remove_task ──► TaskRemoved (head dropped, never run)
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                          |
//! |-------------------|------------------------------------------------------------------|---------------------------------------------|
//! | **Scheduling**    | Bounded-concurrency queue with priority insertion.               | [`Scheduler`], [`SchedulerBuilder`]         |
//! | **Tasks**         | Blocking or future-returning callables with context and args.    | [`Task`], [`TaskFn`], [`TaskRef`]           |
//! | **Configuration** | Per-task options validated once; scheduler-wide settings.        | [`TaskOptions`], [`TaskConfig`], [`SchedulerConfig`] |
//! | **Policies**      | Sync vs deferred dispatch, bounded retries.                      | [`Dispatch`], [`ExecuteIn`], [`RetryPolicy`] |
//! | **Events**        | Eight typed lifecycle channels with metadata snapshots.          | [`Event`], [`EventKind`], [`Subscribe`]     |
//! | **Errors**        | Typed errors for task failures, configuration and deferral.      | [`TaskError`], [`ConfigError`], [`DeferError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use queuevisor::{EventKind, ExecuteIn, Scheduler, TaskError, TaskFn, TaskOptions};
//! use serde_json::{Value, json};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sched = Scheduler::new(2);
//!
//!     let done = Arc::new(Mutex::new(Vec::new()));
//!     let d = done.clone();
//!     sched.listen(EventKind::TaskCompleted, move |ev| {
//!         d.lock().unwrap().push(ev.task_id().unwrap_or_default().to_string());
//!     });
//!
//!     // Inline task: runs as soon as run() admits it.
//!     sched.add_task(TaskFn::blocking(|_| Ok(Value::Null)), "inline", TaskOptions::new(), false)?;
//!
//!     // Timer task with positional args and a retry budget.
//!     let sum = TaskFn::future(|inv| async move {
//!         let a = inv.arg(0).and_then(Value::as_i64).ok_or(TaskError::fail("missing arg"))?;
//!         Ok(json!(a + 1))
//!     });
//!     let opts = TaskOptions::new()
//!         .sync(false)
//!         .execute_in(ExecuteIn::Callback)
//!         .timeout(Duration::from_millis(10))
//!         .args([json!(41)])
//!         .retry(2)
//!         .on_success(|v| println!("sum = {v}"));
//!     sched.add_task(sum, "sum", opts, false)?;
//!
//!     sched.run();
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!
//!     assert_eq!(*done.lock().unwrap(), ["inline", "sum"]);
//!     assert_eq!(sched.active_tasks(), 0);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
pub mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    Defer, DeferredFailure, DeferredJob, Scheduler, SchedulerBuilder, SchedulerConfig,
    TaskQueue, TokioDefer,
};
pub use error::{ConfigError, DeferError, TaskError};
pub use events::{Event, EventKind, EventMetadata, EventPayload, Notifier, payload};
pub use policies::{Deferral, Dispatch, ExecuteIn, RetryPolicy};
pub use subscribers::{FnSubscriber, Subscribe};
pub use tasks::{
    Context, Hooks, Invocation, Task, TaskConfig, TaskFn, TaskOptions, TaskOutput, TaskRecord,
    TaskRef, TaskResult,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
