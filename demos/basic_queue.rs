//! # Example: basic_queue
//!
//! Three tasks on a scheduler with two slots: one inline, two on timers.
//!
//! Demonstrates how to:
//! - Define tasks with [`TaskFn::blocking`] and [`TaskFn::future`].
//! - Pick a dispatch mode per task with [`TaskOptions`].
//! - Observe the lifecycle with a closure listener.
//!
//! ## Flow
//! ```text
//! add_task ×3 ──► TaskAdded ×3
//! run()
//!   ├─► TaskStarted(inline) ─► TaskCompleted(inline)
//!   └─► TaskStarted(slow)   ─► deferred 300ms, loop stops
//! run()
//!   └─► TaskStarted(fast)   ─► deferred 100ms
//! timers fire:
//!   fast ─► TaskCompleted ─► run() ─► QueueEmpty
//!   slow ─► TaskCompleted ─► run() ─► QueueEmpty
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_queue
//! ```

use std::sync::Arc;
use std::time::Duration;

use queuevisor::{EventKind, ExecuteIn, FnSubscriber, Scheduler, TaskFn, TaskOptions};
use serde_json::{Value, json};

fn on_timer(ms: u64) -> TaskOptions {
    TaskOptions::new()
        .sync(false)
        .execute_in(ExecuteIn::Callback)
        .timeout(Duration::from_millis(ms))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Scheduler with two slots
    let sched = Scheduler::new(2);

    // 2. Print every event
    sched.subscribe_all(Arc::new(FnSubscriber::new(|ev: &queuevisor::Event| {
        let meta = ev.metadata.unwrap_or_default();
        println!(
            "{:<14} task={:<8} queue={} active={}",
            ev.kind(),
            ev.task_id().unwrap_or("-"),
            meta.queue_length,
            meta.active_tasks
        );
    })));

    // 3. Enqueue
    let inline = TaskFn::blocking(|_| {
        println!("  inline task ran");
        Ok(Value::Null)
    });
    sched.add_task(inline, "inline", TaskOptions::new(), false)?;

    let slow = TaskFn::future(|inv| async move {
        let n = inv.arg(0).and_then(Value::as_u64).unwrap_or(0);
        Ok(json!(n * 2))
    });
    let opts = on_timer(300)
        .args([json!(21)])
        .on_success(|v| println!("  slow task result: {v}"));
    sched.add_task(slow, "slow", opts, false)?;

    let fast = TaskFn::blocking(|_| Ok(json!("fast")));
    sched.add_task(fast, "fast", on_timer(100), false)?;

    // 4. Drive: each run() admits until a deferred dispatch or a full queue
    sched.run();
    sched.run();

    let done = sched.listen(EventKind::QueueEmpty, |_| println!("  (queue drained)"));
    tokio::time::sleep(Duration::from_millis(400)).await;
    sched.off(EventKind::QueueEmpty, &done);

    println!("final: {:?}", sched);
    Ok(())
}
