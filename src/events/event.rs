//! # Lifecycle events emitted by the scheduler.
//!
//! The [`EventKind`] enum names the eight fixed channels:
//! - **Task events**: added, started, completed, failed, retrying, removed
//! - **Queue events**: empty, full
//!
//! The [`Event`] envelope carries a sequence number, a timestamp, an optional
//! [`EventMetadata`] snapshot and the typed [`EventPayload`].
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Metadata is captured after the queue/counter mutation that produced the event
//! (`TaskCompleted` is the exception: it is captured before the slot is released).
//!
//! ## Example
//! ```rust
//! use queuevisor::{Event, EventKind, EventMetadata, EventPayload, payload};
//!
//! let ev = Event::new(EventPayload::TaskRemoved(payload::TaskRemoved { id: Some("a".into()) }))
//!     .with_metadata(EventMetadata { queue_length: 0, active_tasks: 1 });
//!
//! assert_eq!(ev.kind(), EventKind::TaskRemoved);
//! assert_eq!(ev.task_id(), Some("a"));
//! assert_eq!(ev.metadata.map(|m| m.active_tasks), Some(1));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use super::payload::{
    QueueEmpty, QueueFull, TaskAdded, TaskCompleted, TaskFailed, TaskRemoved, TaskRetrying,
    TaskStarted,
};
use crate::tasks::TaskConfig;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of scheduler events; also the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Record inserted into the queue.
    TaskAdded,
    /// Record dequeued; slot taken.
    TaskStarted,
    /// Task finished; slot about to be released.
    TaskCompleted,
    /// Task failed; failure handled by the scheduler.
    TaskFailed,
    /// Failed task re-enqueued at the front.
    TaskRetrying,
    /// Queue head dropped by `remove_task`.
    TaskRemoved,
    /// `run()` on an empty queue.
    QueueEmpty,
    /// `run()` with every slot occupied.
    QueueFull,
}

impl EventKind {
    /// All channels, in declaration order.
    pub const ALL: [EventKind; 8] = [
        EventKind::TaskAdded,
        EventKind::TaskStarted,
        EventKind::TaskCompleted,
        EventKind::TaskFailed,
        EventKind::TaskRetrying,
        EventKind::TaskRemoved,
        EventKind::QueueEmpty,
        EventKind::QueueFull,
    ];

    /// Channel name (camelCase, stable).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TaskAdded => "taskAdded",
            EventKind::TaskStarted => "taskStarted",
            EventKind::TaskCompleted => "taskCompleted",
            EventKind::TaskFailed => "taskFailed",
            EventKind::TaskRetrying => "taskRetrying",
            EventKind::TaskRemoved => "taskRemoved",
            EventKind::QueueEmpty => "queueEmpty",
            EventKind::QueueFull => "queueFull",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of queue size and in-flight count at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventMetadata {
    pub queue_length: usize,
    pub active_tasks: usize,
}

/// Typed payload, one variant per [`EventKind`].
#[derive(Clone, Debug)]
pub enum EventPayload {
    TaskAdded(TaskAdded),
    TaskStarted(TaskStarted),
    TaskCompleted(TaskCompleted),
    TaskFailed(TaskFailed),
    TaskRetrying(TaskRetrying),
    TaskRemoved(TaskRemoved),
    QueueEmpty(QueueEmpty),
    QueueFull(QueueFull),
}

impl EventPayload {
    /// Channel this payload is published on.
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::TaskAdded(_) => EventKind::TaskAdded,
            EventPayload::TaskStarted(_) => EventKind::TaskStarted,
            EventPayload::TaskCompleted(_) => EventKind::TaskCompleted,
            EventPayload::TaskFailed(_) => EventKind::TaskFailed,
            EventPayload::TaskRetrying(_) => EventKind::TaskRetrying,
            EventPayload::TaskRemoved(_) => EventKind::TaskRemoved,
            EventPayload::QueueEmpty(_) => EventKind::QueueEmpty,
            EventPayload::QueueFull(_) => EventKind::QueueFull,
        }
    }
}

/// Scheduler event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `metadata`: set for every task event, absent for queue events
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Queue/counter snapshot.
    pub metadata: Option<EventMetadata>,
    /// Typed payload.
    pub payload: EventPayload,
}

impl Event {
    /// Creates a new event with current timestamp and next sequence number.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            metadata: None,
            payload,
        }
    }

    /// Attaches a metadata snapshot.
    #[inline]
    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Channel of this event.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Task id carried by the payload, if any.
    pub fn task_id(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::TaskAdded(p) => Some(&p.id),
            EventPayload::TaskStarted(p) => Some(&p.id),
            EventPayload::TaskCompleted(p) => Some(&p.id),
            EventPayload::TaskFailed(p) => Some(&p.id),
            EventPayload::TaskRetrying(p) => Some(&p.id),
            EventPayload::TaskRemoved(p) => p.id.as_deref(),
            EventPayload::QueueEmpty(_) | EventPayload::QueueFull(_) => None,
        }
    }

    /// Task configuration carried by the payload, if any.
    pub fn config(&self) -> Option<&TaskConfig> {
        match &self.payload {
            EventPayload::TaskAdded(p) => Some(&p.config),
            EventPayload::TaskStarted(p) => Some(&p.config),
            EventPayload::TaskCompleted(p) => Some(&p.config),
            EventPayload::TaskFailed(p) => Some(&p.config),
            EventPayload::TaskRetrying(p) => Some(&p.config),
            EventPayload::TaskRemoved(_)
            | EventPayload::QueueEmpty(_)
            | EventPayload::QueueFull(_) => None,
        }
    }

    #[inline]
    pub(crate) fn queue_empty() -> Self {
        Event::new(EventPayload::QueueEmpty(QueueEmpty))
    }

    #[inline]
    pub(crate) fn queue_full() -> Self {
        Event::new(EventPayload::QueueFull(QueueFull))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::queue_empty();
        let b = Event::queue_full();
        assert!(b.seq > a.seq);
        assert!(a.metadata.is_none());
    }

    #[test]
    fn test_kind_and_accessors() {
        let ev = Event::new(EventPayload::TaskRetrying(TaskRetrying {
            id: "r".into(),
            config: TaskConfig::default(),
            count: 2,
            error: TaskError::fail("x"),
        }));
        assert_eq!(ev.kind(), EventKind::TaskRetrying);
        assert_eq!(ev.task_id(), Some("r"));
        assert!(ev.config().is_some());

        let ev = Event::new(EventPayload::TaskRemoved(TaskRemoved::default()));
        assert_eq!(ev.task_id(), None);
        assert!(ev.config().is_none());
    }

    #[test]
    fn test_kind_names() {
        let names: Vec<_> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            [
                "taskAdded",
                "taskStarted",
                "taskCompleted",
                "taskFailed",
                "taskRetrying",
                "taskRemoved",
                "queueEmpty",
                "queueFull"
            ]
        );
    }
}
