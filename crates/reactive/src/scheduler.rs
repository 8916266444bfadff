//! Timers for batch and union debouncing.
//!
//! Streams never read a clock themselves. They ask an injected `Scheduler` to
//! run a task after a delay and cancel it when the debounce window restarts.
//! `ManualScheduler` drives virtual time so tests can step through batching
//! deterministically.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::cell::RefCell;
use core::time::Duration;
use hashbrown::HashMap;

/// Identifier of a scheduled task.
pub type TimerId = u64;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Runs tasks after a delay on the caller's event loop.
pub trait Scheduler {
    /// Schedules `task` to run once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task) -> TimerId;

    /// Cancels a scheduled task. Returns false if it already ran or was
    /// cancelled.
    fn cancel(&self, id: TimerId) -> bool;

    /// Returns the current time of this scheduler.
    fn now(&self) -> Duration;
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: TimerId,
    /// Ordered by deadline, then by scheduling order
    tasks: BTreeMap<(Duration, TimerId), Task>,
    deadlines: HashMap<TimerId, Duration>,
}

impl ManualState {
    fn pop_due(&mut self, until: Option<Duration>) -> Option<Task> {
        let (&(deadline, id), _) = self.tasks.iter().next()?;
        if until.is_some_and(|until| deadline > until) {
            return None;
        }
        self.deadlines.remove(&id);
        if deadline > self.now {
            self.now = deadline;
        }
        self.tasks.remove(&(deadline, id))
    }
}

/// A scheduler over virtual time.
///
/// Nothing runs until the owner calls `advance` or `run_until_idle`. Tasks run
/// one at a time in deadline order; a task may schedule or cancel others.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<ManualState>,
}

impl ManualScheduler {
    /// Creates a scheduler at time zero with no pending tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `by`, running every task that comes due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let until = self.state.borrow().now + by;
        let mut ran = 0;
        loop {
            // The borrow ends before the task runs.
            let task = self.state.borrow_mut().pop_due(Some(until));
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        self.state.borrow_mut().now = until;
        ran
    }

    /// Runs tasks until none are pending, moving time to each deadline.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.state.borrow_mut().pop_due(None);
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }

    /// Returns the number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        let deadline = state.now + delay;
        state.tasks.insert((deadline, id), task);
        state.deadlines.insert(id, deadline);
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut state = self.state.borrow_mut();
        match state.deadlines.remove(&id) {
            Some(deadline) => state.tasks.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    fn now(&self) -> Duration {
        self.state.borrow().now
    }
}
