//! Microtask queue: "run this after the current synchronous turn".
//!
//! Elements never flush inline. They hand a task to a [`Schedule`]
//! implementation and the host decides when the turn ends. The
//! [`MicrotaskQueue`] is the host-agnostic implementation: a FIFO that the
//! host drains with [`MicrotaskQueue::run_until_idle`]. Each thread also has a
//! default queue used by elements built without an explicit scheduler.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Something that can run a task after the current synchronous turn.
pub trait Schedule {
    /// Queue `task`. Must not run it before returning.
    fn schedule(&self, task: Task);
}

// ---------------------------------------------------------------------------
// MicrotaskQueue
// ---------------------------------------------------------------------------

/// Single-threaded FIFO task queue. Cloning yields another handle to the same
/// queue.
#[derive(Clone, Default)]
pub struct MicrotaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl MicrotaskQueue {
    /// Create a new, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Whether no task is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run the oldest task, if any. Returns whether a task ran.
    pub fn run_one(&self) -> bool {
        // Pop before running so the task may queue more work.
        let next = self.tasks.borrow_mut().pop_front();
        match next {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run tasks, including ones queued while running, until the queue is
    /// empty. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(target: "reactive_element::runtime", ran, "microtask queue idle");
        }
        ran
    }

    /// Drop every queued task without running it.
    pub fn clear(&self) {
        // Dropped tasks may run their own cleanup; do it outside the borrow.
        let dropped = std::mem::take(&mut *self.tasks.borrow_mut());
        drop(dropped);
    }
}

impl Schedule for MicrotaskQueue {
    fn schedule(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for MicrotaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicrotaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Thread-local default queue
// ---------------------------------------------------------------------------

thread_local! {
    static CURRENT: MicrotaskQueue = MicrotaskQueue::new();
}

/// Handle to this thread's default queue.
pub fn current_queue() -> MicrotaskQueue {
    CURRENT.with(Clone::clone)
}

/// Queue `f` on this thread's default queue.
pub fn queue_microtask(f: impl FnOnce() + 'static) {
    CURRENT.with(|q| q.schedule(Box::new(f)));
}

/// Drain this thread's default queue. Returns how many tasks ran.
pub fn run_microtasks() -> usize {
    current_queue().run_until_idle()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn schedule_does_not_run_inline() {
        let q = MicrotaskQueue::new();
        let ran = Rc::new(Cell::new(false));
        let ran_c = ran.clone();
        q.schedule(Box::new(move || ran_c.set(true)));
        assert!(!ran.get());
        assert_eq!(q.len(), 1);
        assert_eq!(q.run_until_idle(), 1);
        assert!(ran.get());
        assert!(q.is_empty());
    }

    #[test]
    fn tasks_run_in_fifo_order() {
        let q = MicrotaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log_c = log.clone();
            q.schedule(Box::new(move || log_c.borrow_mut().push(i)));
        }
        q.run_until_idle();
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn tasks_queued_while_running_also_run() {
        let q = MicrotaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let q_c = q.clone();
        let log_c = log.clone();
        q.schedule(Box::new(move || {
            log_c.borrow_mut().push("outer");
            let log_cc = log_c.clone();
            q_c.schedule(Box::new(move || log_cc.borrow_mut().push("inner")));
        }));
        assert_eq!(q.run_until_idle(), 2);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn clear_drops_tasks() {
        let q = MicrotaskQueue::new();
        q.schedule(Box::new(|| {}));
        q.clear();
        assert_eq!(q.run_until_idle(), 0);
    }

    #[test]
    fn clones_share_the_queue() {
        let a = MicrotaskQueue::new();
        let b = a.clone();
        b.schedule(Box::new(|| {}));
        assert_eq!(a.len(), 1);
        assert!(MicrotaskQueue::new().is_empty());
    }

    #[test]
    fn thread_local_queue() {
        let hits = Rc::new(Cell::new(0));
        let hits_c = hits.clone();
        queue_microtask(move || hits_c.set(hits_c.get() + 1));
        assert_eq!(hits.get(), 0);
        assert!(run_microtasks() >= 1);
        assert_eq!(hits.get(), 1);
    }
}
