#![forbid(unsafe_code)]

//! Host-driven deferred work.
//!
//! Follow-up work (scroll restoration after a resume, scroll unlock after the
//! side menus finish closing) is scheduled a few milliseconds into the future
//! so it lands after layout and transitions settle. Nothing here blocks or
//! spawns: the host advances a [`DeterministicClock`] explicitly (from
//! `requestAnimationFrame` in a browser, by hand in tests) and due tasks run
//! inside that call.
//!
//! # Invariants
//!
//! 1. Tasks run in due-time order; ties run in scheduling order.
//! 2. A task scheduled while the queue is running observes the due time of the
//!    task that scheduled it as "now", and runs in the same `advance` if due.
//! 3. Tasks cannot be cancelled. They must tolerate the page having moved on.

use core::time::Duration;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Time never goes backwards.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

type Task = Box<dyn FnOnce()>;

struct QueueInner {
    clock: DeterministicClock,
    seq: u64,
    tasks: BTreeMap<(Duration, u64), (&'static str, Task)>,
}

/// Queue of fire-and-forget tasks keyed by due time.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct DeferredQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl Default for DeferredQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeferredQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("DeferredQueue")
            .field("now", &inner.clock.now())
            .field("pending", &inner.tasks.len())
            .finish()
    }
}

impl DeferredQueue {
    /// Empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueInner {
                clock: DeterministicClock::new(),
                seq: 0,
                tasks: BTreeMap::new(),
            })),
        }
    }

    /// Current queue time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().clock.now()
    }

    /// Schedule `task` to run `delay` from now. `label` only shows up in logs.
    pub fn schedule(&self, label: &'static str, delay: Duration, task: impl FnOnce() + 'static) {
        let mut inner = self.inner.borrow_mut();
        let due = inner.clock.now().saturating_add(delay);
        let seq = inner.seq;
        inner.seq += 1;
        inner.tasks.insert((due, seq), (label, Box::new(task)));
        crate::trace!(label, due_ms = due.as_millis() as u64, "deferred task scheduled");
    }

    /// Number of tasks not yet run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Labels of pending tasks in run order.
    #[must_use]
    pub fn pending_labels(&self) -> Vec<&'static str> {
        self.inner
            .borrow()
            .tasks
            .values()
            .map(|(label, _)| *label)
            .collect()
    }

    /// Advance time by `dt` and run everything that became due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, dt: Duration) -> usize {
        let target = self.now().saturating_add(dt);
        self.advance_to(target)
    }

    /// Advance time to `now` (never backwards) and run everything due.
    ///
    /// Returns the number of tasks run.
    pub fn advance_to(&self, now: Duration) -> usize {
        let target = now.max(self.now());
        let mut ran = 0;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let due_key = inner
                    .tasks
                    .keys()
                    .next()
                    .copied()
                    .filter(|(due, _)| *due <= target);
                due_key.and_then(|key| {
                    inner.clock.set(key.0);
                    inner.tasks.remove(&key)
                })
            };
            let Some((label, task)) = next else {
                break;
            };
            crate::trace!(label, "deferred task running");
            task();
            ran += 1;
        }
        self.inner.borrow_mut().clock.set(target);
        ran
    }

    /// Run tasks due at the current time without advancing it.
    pub fn run_due(&self) -> usize {
        self.advance_to(self.now())
    }

    /// Run every pending task regardless of due time, advancing the clock to
    /// the last due time.
    pub fn flush(&self) -> usize {
        let mut ran = 0;
        loop {
            let last = self.inner.borrow().tasks.keys().next_back().map(|(d, _)| *d);
            let Some(last) = last else {
                break;
            };
            ran += self.advance_to(last);
        }
        ran
    }
}
