use std::cell::Cell;
use std::rc::Rc;

use super::ports::{Scheduler, TaskId};

/// Trailing-edge debounce on top of a [`Scheduler`]: only the last call
/// within `delay_ms` of quiet time runs.
pub struct Debouncer {
    scheduler: Rc<dyn Scheduler>,
    delay_ms: u32,
    pending: Rc<Cell<Option<TaskId>>>,
}

impl Debouncer {
    pub fn new(scheduler: Rc<dyn Scheduler>, delay_ms: u32) -> Self {
        Self {
            scheduler,
            delay_ms,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Schedule `task`, superseding whatever was pending
    pub fn call(&self, task: impl FnOnce() + 'static) {
        self.cancel();
        let pending = Rc::clone(&self.pending);
        let id = self.scheduler.schedule(
            self.delay_ms,
            Box::new(move || {
                pending.set(None);
                task();
            }),
        );
        self.pending.set(Some(id));
    }

    /// Drop the pending task, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match self.pending.take() {
            Some(id) => {
                self.scheduler.cancel(id);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}
