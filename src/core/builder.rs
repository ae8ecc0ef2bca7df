use std::sync::Arc;

use super::{
    config::SchedulerConfig,
    defer::{Defer, TokioDefer},
    scheduler::Scheduler,
};
use crate::{events::Notifier, subscribers::Subscribe};

/// Builder for constructing a [`Scheduler`] with optional parts.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    defer: Option<Arc<dyn Defer>>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            defer: None,
        }
    }

    /// Sets subscribers registered on every channel before the first event.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the deferred-execution host.
    ///
    /// Defaults to [`TokioDefer::new`], which spawns onto the runtime current at
    /// dispatch time.
    pub fn with_defer(mut self, defer: Arc<dyn Defer>) -> Self {
        self.defer = Some(defer);
        self
    }

    /// Builds and returns the Scheduler instance.
    pub fn build(self) -> Scheduler {
        let notifier = Notifier::new();
        for sub in self.subscribers {
            notifier.subscribe_all(sub);
        }
        let defer: Arc<dyn Defer> = match self.defer {
            Some(defer) => defer,
            None => Arc::new(TokioDefer::new()),
        };
        Scheduler::from_parts(self.cfg, notifier, defer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::defer::DeferredJob;
    use crate::error::{DeferError, TaskError};
    use crate::events::{Event, EventPayload};
    use crate::policies::{Deferral, ExecuteIn};
    use crate::subscribers::FnSubscriber;
    use crate::tasks::{TaskFn, TaskOptions};
    use serde_json::Value;
    use std::sync::Mutex;

    struct Refuse;

    impl Defer for Refuse {
        fn defer(&self, _when: Deferral, _job: DeferredJob) -> Result<(), DeferError> {
            Err(DeferError::Rejected {
                reason: "closed".into(),
            })
        }
    }

    #[test]
    fn test_build_wires_subscribers_and_defer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let sub: Arc<dyn Subscribe> = Arc::new(FnSubscriber::new(move |e: &Event| {
            if let EventPayload::TaskFailed(p) = &e.payload {
                s.lock().unwrap().push(p.error.clone());
            }
        }));

        let sched = SchedulerBuilder::new(SchedulerConfig::with_limit(0))
            .with_subscribers(vec![sub])
            .with_defer(Arc::new(Refuse))
            .build();
        assert_eq!(sched.concurrency_limit(), 1);

        let opts = TaskOptions::new()
            .sync(false)
            .execute_in(ExecuteIn::MicroTasks);
        sched
            .add_task(TaskFn::blocking(|_| Ok(Value::Null)), "x", opts, false)
            .unwrap();
        sched.run();

        assert_eq!(
            *seen.lock().unwrap(),
            [TaskError::Dispatch(DeferError::Rejected {
                reason: "closed".into()
            })]
        );
        assert_eq!(sched.active_tasks(), 0);
        assert_eq!(sched.metadata().queue_length, 0);
    }
}
