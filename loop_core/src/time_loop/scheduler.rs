//! Deferred work applied in the late phase of a frame.

use std::cell::RefCell;
use std::collections::VecDeque;

use tracing::debug;

type DeferredTask = Box<dyn FnOnce()>;

/// Queue of callbacks drained once per frame, after actions settle.
#[derive(Default)]
pub struct Scheduler {
    queue: RefCell<VecDeque<(String, DeferredTask)>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task for the next late phase.
    pub fn defer(&self, label: impl Into<String>, task: impl FnOnce() + 'static) {
        let label = label.into();
        debug!(task = %label, "deferred");
        self.queue.borrow_mut().push_back((label, Box::new(task)));
    }

    /// Number of tasks waiting.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run every task queued before this call. Tasks deferred while running
    /// wait for the next frame. Returns how many ran.
    pub fn run_deferred(&self) -> usize {
        let batch: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = batch.len();
        for (label, task) in batch {
            debug!(task = %label, "running deferred task");
            task();
        }
        count
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
