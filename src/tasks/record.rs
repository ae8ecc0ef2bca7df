//! # Queued task record.
//!
//! A [`TaskRecord`] bundles the callable, its caller-supplied id and its resolved
//! [`TaskConfig`]. Records are never mutated once built: a retry derives a new record
//! with a decremented budget via [`TaskRecord::retried`].

use std::sync::Arc;

use crate::tasks::config::TaskConfig;
use crate::tasks::task::TaskRef;

/// Pending unit of work held by the queue.
#[derive(Clone)]
pub struct TaskRecord {
    id: Arc<str>,
    task: TaskRef,
    config: TaskConfig,
}

impl TaskRecord {
    /// Builds a record. Ids are opaque and not checked for uniqueness.
    pub fn new(id: impl Into<Arc<str>>, task: TaskRef, config: TaskConfig) -> Self {
        Self {
            id: id.into(),
            task,
            config,
        }
    }

    /// Caller-supplied identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn shared_id(&self) -> Arc<str> {
        Arc::clone(&self.id)
    }

    /// The callable.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }

    /// Resolved configuration.
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Replacement record for a failed attempt, or `None` when the failure is final.
    pub fn retried(&self) -> Option<TaskRecord> {
        let retry = self.config.retry().next()?;
        Some(Self {
            id: Arc::clone(&self.id),
            task: Arc::clone(&self.task),
            config: self.config.with_retry(retry),
        })
    }
}

impl std::fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{TaskFn, TaskOptions};
    use serde_json::Value;

    fn noop() -> TaskRef {
        TaskFn::blocking(|_| Ok(Value::Null))
    }

    #[test]
    fn test_retried_decrements_budget_and_keeps_identity() {
        let cfg = TaskOptions::new().retry(2).resolve().unwrap();
        let rec = TaskRecord::new("job", noop(), cfg);

        let next = rec.retried().expect("budget left");
        assert_eq!(next.id(), "job");
        assert!(Arc::ptr_eq(next.task(), rec.task()));
        assert_eq!(next.config().retry_count(), Some(1));
        assert_eq!(rec.config().retry_count(), Some(2));

        let last = next.retried().expect("budget left");
        assert_eq!(last.config().retry_count(), Some(0));
        assert!(last.retried().is_none());
    }

    #[test]
    fn test_no_retry_without_policy() {
        let rec = TaskRecord::new("job", noop(), TaskConfig::default());
        assert!(rec.retried().is_none());
    }
}
