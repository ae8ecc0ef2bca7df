//! # Queue store.
//!
//! [`TaskQueue`] is the ordered sequence of pending [`TaskRecord`]s.
//! FIFO by default; priority insertion puts a record at the front.
//!
//! ## Rules
//! - Records are moved in and out, never mutated in place.
//! - Ids are not inspected; duplicates are allowed.
//! - Owned by the scheduler state and only touched under its lock.

use std::collections::VecDeque;

use crate::tasks::TaskRecord;

/// Ordered pending tasks.
#[derive(Debug, Default)]
pub struct TaskQueue {
    items: VecDeque<TaskRecord>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the back (normal submission).
    pub fn push_back(&mut self, record: TaskRecord) {
        self.items.push_back(record);
    }

    /// Prepends at the front (priority submission, retries).
    pub fn push_front(&mut self, record: TaskRecord) {
        self.items.push_front(record);
    }

    /// Removes and returns the earliest-ordered record.
    pub fn pop_front(&mut self) -> Option<TaskRecord> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids in dequeue order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|r| r.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{TaskConfig, TaskFn};
    use serde_json::Value;

    fn rec(id: &str) -> TaskRecord {
        TaskRecord::new(
            id,
            TaskFn::blocking(|_| Ok(Value::Null)),
            TaskConfig::default(),
        )
    }

    #[test]
    fn test_fifo_with_front_insertion() {
        let mut q = TaskQueue::new();
        q.push_back(rec("a"));
        q.push_back(rec("b"));
        q.push_front(rec("p"));
        assert_eq!(q.len(), 3);
        assert_eq!(q.ids().collect::<Vec<_>>(), ["p", "a", "b"]);

        assert_eq!(q.pop_front().map(|r| r.id().to_string()), Some("p".into()));
        assert_eq!(q.pop_front().map(|r| r.id().to_string()), Some("a".into()));
        assert_eq!(q.pop_front().map(|r| r.id().to_string()), Some("b".into()));
        assert!(q.pop_front().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let mut q = TaskQueue::new();
        q.push_back(rec("same"));
        q.push_back(rec("same"));
        assert_eq!(q.len(), 2);
    }
}
