//! # Example: retry_on_fail
//!
//! A task that fails twice before succeeding, with a retry budget of three.
//! Events are printed by the built-in [`LogWriter`].
//!
//! ## Flow
//! ```text
//! run()
//!   ├─► TaskStarted ─► Err("attempt 1")
//!   │     ├─► TaskFailed, on_error
//!   │     ├─► on_retry(count=3), TaskRetrying{count=3}
//!   │     └─► TaskAdded{priority} (budget 2)
//!   ├─► TaskStarted ─► Err("attempt 2")
//!   │     ├─► TaskFailed, on_error
//!   │     ├─► on_retry(count=2), TaskRetrying{count=2}
//!   │     └─► TaskAdded{priority} (budget 1)
//!   ├─► TaskStarted ─► Ok
//!   │     └─► TaskCompleted
//!   └─► QueueEmpty
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_on_fail --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use queuevisor::{LogWriter, Scheduler, SchedulerConfig, Subscribe, TaskError, TaskFn, TaskOptions};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sched = Scheduler::builder(SchedulerConfig::default())
        .with_subscribers(subs)
        .build();

    let attempts = Arc::new(AtomicU32::new(0));
    let a = attempts.clone();
    let flaky = TaskFn::blocking(move |_| {
        let n = a.fetch_add(1, Ordering::SeqCst) + 1;
        if n < 3 {
            return Err(TaskError::fail(format!("attempt {n}")));
        }
        Ok(json!({ "attempts": n }))
    });

    let opts = TaskOptions::new()
        .retry(3)
        .on_error(|e| println!("  on_error: {e}"))
        .on_retry(|e, left| println!("  on_retry: {e} ({left} left)"))
        .on_finally(|| println!("  on_finally"));
    sched.add_task(flaky, "flaky", opts, false)?;

    // Inline tasks need no runtime: everything happens inside run().
    sched.run();

    println!("attempts: {}", attempts.load(Ordering::SeqCst));
    Ok(())
}
