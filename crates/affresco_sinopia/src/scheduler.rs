//! Schedulers deciding when a triggered effect re-runs.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::effect::Effect;

/// Owns the timing policy for effect re-runs.
///
/// An effect whose dependency triggered is handed here; the scheduler
/// decides whether the re-run happens now, later, or is coalesced with
/// other pending re-runs. Making this a seam keeps the batching policy a
/// swappable, testable unit instead of a property baked into the effect.
pub trait Scheduler {
    fn schedule(&self, effect: Effect);
}

/// Re-run immediately, re-entrantly, within the triggering call stack.
///
/// This is the unbatched baseline: N writes in one synchronous block produce
/// N independent re-runs, and intermediate states are observable by whatever
/// the effect drives. Predictable, but a performance hazard under bursts of
/// writes - use [`QueueScheduler`] to coalesce.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncScheduler;

impl Scheduler for SyncScheduler {
    fn schedule(&self, effect: Effect) {
        effect.run();
    }
}

/// Collect triggered effects and re-run them on an explicit [`flush`].
///
/// Scheduling is deduplicated by effect identity, so N writes hitting the
/// same effect queue it once. A flush drains the queue taken at its start;
/// effects scheduled *during* the flush wait for the next one, which bounds
/// every effect to at most one run per flush cycle.
///
/// [`flush`]: QueueScheduler::flush
#[derive(Clone, Default)]
pub struct QueueScheduler {
    inner: Rc<QueueInner>,
}

#[derive(Default)]
struct QueueInner {
    queue: RefCell<Vec<Effect>>,
    queued: RefCell<FxHashSet<usize>>,
}

impl QueueScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every pending effect once and clear the queue.
    ///
    /// Returns how many effects ran.
    pub fn flush(&self) -> usize {
        let batch: Vec<Effect> = self.inner.queue.borrow_mut().drain(..).collect();
        self.inner.queued.borrow_mut().clear();
        let count = batch.len();
        for effect in batch {
            effect.run();
        }
        count
    }

    /// Number of effects waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.borrow().is_empty()
    }
}

impl Scheduler for QueueScheduler {
    fn schedule(&self, effect: Effect) {
        let key = effect.inner_ptr() as usize;
        if self.inner.queued.borrow_mut().insert(key) {
            self.inner.queue.borrow_mut().push(effect);
        }
    }
}
