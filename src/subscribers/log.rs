//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo; register it with
//! [`Scheduler::subscribe_all`](crate::Scheduler::subscribe_all).
//!
//! ## Example output
//! ```text
//! [added] task="fetch" priority=false queue=1 active=0
//! [started] task="fetch" queue=0 active=1
//! [failed] task="fetch" err="execution failed: refused" queue=0 active=1
//! [retrying] task="fetch" count=2 err="execution failed: refused"
//! [completed] task="fetch" queue=0 active=1
//! [removed] task=None queue=0 active=0
//! [queue-empty]
//! [queue-full]
//! ```

use crate::events::{Event, EventMetadata, EventPayload};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let meta = e.metadata.unwrap_or_default();
        match &e.payload {
            EventPayload::TaskAdded(p) => {
                println!(
                    "[added] task={:?} priority={} {}",
                    p.id,
                    p.priority,
                    counts(&meta)
                );
            }
            EventPayload::TaskStarted(p) => {
                println!("[started] task={:?} {}", p.id, counts(&meta));
            }
            EventPayload::TaskCompleted(p) => {
                println!("[completed] task={:?} {}", p.id, counts(&meta));
            }
            EventPayload::TaskFailed(p) => {
                println!(
                    "[failed] task={:?} err={:?} {}",
                    p.id,
                    p.error.to_string(),
                    counts(&meta)
                );
            }
            EventPayload::TaskRetrying(p) => {
                println!(
                    "[retrying] task={:?} count={} err={:?}",
                    p.id,
                    p.count,
                    p.error.to_string()
                );
            }
            EventPayload::TaskRemoved(p) => {
                println!("[removed] task={:?} {}", p.id, counts(&meta));
            }
            EventPayload::QueueEmpty(_) => {
                println!("[queue-empty]");
            }
            EventPayload::QueueFull(_) => {
                println!("[queue-full]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

fn counts(meta: &EventMetadata) -> String {
    format!("queue={} active={}", meta.queue_length, meta.active_tasks)
}
