//! Per-event payload structs.
//!
//! One struct per [`EventKind`](super::EventKind); wrapped by
//! [`EventPayload`](super::EventPayload).

use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::TaskConfig;

/// A record was inserted into the queue.
#[derive(Clone, Debug)]
pub struct TaskAdded {
    pub id: Arc<str>,
    pub config: TaskConfig,
    /// Inserted at the front instead of the back.
    pub priority: bool,
}

/// A record was dequeued and is about to be dispatched.
#[derive(Clone, Debug)]
pub struct TaskStarted {
    pub id: Arc<str>,
    pub config: TaskConfig,
}

/// A dispatched task finished; its slot is released right after this event.
#[derive(Clone, Debug)]
pub struct TaskCompleted {
    pub id: Arc<str>,
    pub config: TaskConfig,
}

/// A dispatched task failed and the failure was handled by the scheduler.
#[derive(Clone, Debug)]
pub struct TaskFailed {
    pub id: Arc<str>,
    pub config: TaskConfig,
    pub error: TaskError,
}

/// A failed task is being put back at the front of the queue.
#[derive(Clone, Debug)]
pub struct TaskRetrying {
    pub id: Arc<str>,
    pub config: TaskConfig,
    /// Retry budget before the decrement.
    pub count: u32,
    pub error: TaskError,
}

/// The head of the queue was dropped without running.
#[derive(Clone, Debug, Default)]
pub struct TaskRemoved {
    /// Id of the dropped record; `None` when the queue was already empty.
    pub id: Option<Arc<str>>,
}

/// `run()` found nothing to dequeue.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueueEmpty;

/// `run()` found every slot occupied.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueueFull;
