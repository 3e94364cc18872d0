//! Tracked computations that re-run when their reads change.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::dep::DepInner;
use crate::scheduler::{Scheduler, SyncScheduler};

thread_local! {
    static OBSERVERS: RefCell<Vec<Rc<EffectInner>>> = const { RefCell::new(Vec::new()) };
    static PAUSE_DEPTH: Cell<usize> = const { Cell::new(0) };
}

pub(crate) struct EffectInner {
    body: RefCell<Option<Box<dyn FnMut()>>>,
    deps: RefCell<Vec<Weak<DepInner>>>,
    active: Cell<bool>,
    running: Cell<bool>,
    scheduler: Rc<dyn Scheduler>,
}

/// A computation that tracks its reactive reads and re-runs on writes.
///
/// The body runs once, synchronously, at construction. Every [`Dep`] it
/// read during that run becomes a subscription; a later `trigger` on any of
/// them hands the effect to its [`Scheduler`], which decides when the re-run
/// happens. Each run starts from a clean slate - the previous run's
/// subscriptions are severed first, so conditional reads converge to the
/// current branch.
///
/// A write performed *inside* the effect's own run does not reschedule that
/// effect (self-triggering would never terminate).
///
/// [`Dep`]: crate::Dep
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Create an effect with immediate re-entrant re-runs ([`SyncScheduler`]).
    pub fn new(body: impl FnMut() + 'static) -> Self {
        Self::with_scheduler(body, Rc::new(SyncScheduler))
    }

    /// Create an effect whose re-runs go through `scheduler`.
    ///
    /// The first run is always immediate regardless of the scheduler; only
    /// re-runs are scheduled.
    pub fn with_scheduler(body: impl FnMut() + 'static, scheduler: Rc<dyn Scheduler>) -> Self {
        let effect = Self {
            inner: Rc::new(EffectInner {
                body: RefCell::new(Some(Box::new(body))),
                deps: RefCell::new(Vec::new()),
                active: Cell::new(true),
                running: Cell::new(false),
                scheduler,
            }),
        };
        effect.run();
        effect
    }

    /// Run the body now, re-collecting dependencies.
    pub fn run(&self) {
        run_effect(&self.inner);
    }

    /// Deactivate the effect: sever all subscriptions and drop the body.
    ///
    /// Dropping the body releases whatever the closure captured, which is
    /// what breaks `Rc` cycles between an effect and the state it closes
    /// over. A stopped effect never runs again.
    pub fn stop(&self) {
        self.inner.active.set(false);
        self.inner.cleanup();
        self.inner.body.borrow_mut().take();
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    pub(crate) fn from_inner(inner: Rc<EffectInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner_ptr(&self) -> *const EffectInner {
        Rc::as_ptr(&self.inner)
    }
}

impl EffectInner {
    pub(crate) fn record_dep(&self, dep: Weak<DepInner>) {
        let ptr = dep.as_ptr();
        let mut deps = self.deps.borrow_mut();
        if !deps.iter().any(|existing| existing.as_ptr() == ptr) {
            deps.push(dep);
        }
    }

    fn cleanup(self: &Rc<Self>) {
        let ptr = Rc::as_ptr(self);
        for weak in self.deps.borrow_mut().drain(..) {
            if let Some(dep) = weak.upgrade() {
                dep.remove_subscriber(ptr);
            }
        }
    }
}

fn run_effect(inner: &Rc<EffectInner>) {
    if !inner.active.get() {
        return;
    }
    inner.cleanup();
    inner.running.set(true);
    OBSERVERS.with(|observers| observers.borrow_mut().push(inner.clone()));
    // Each run is a fresh tracking context: a re-run triggered from inside
    // an `untracked` block must still record its own reads.
    let paused = PAUSE_DEPTH.with(|depth| depth.replace(0));

    if let Some(body) = inner.body.borrow_mut().as_mut() {
        body();
    }

    PAUSE_DEPTH.with(|depth| depth.set(paused));
    OBSERVERS.with(|observers| {
        observers.borrow_mut().pop();
    });
    inner.running.set(false);
}

/// Schedule a triggered effect through its scheduler.
///
/// Inactive effects are dropped; an effect currently mid-run is skipped so a
/// write inside its own body cannot recurse into it.
pub(crate) fn schedule(inner: Rc<EffectInner>) {
    if !inner.active.get() || inner.running.get() {
        return;
    }
    let scheduler = inner.scheduler.clone();
    scheduler.schedule(Effect::from_inner(inner));
}

/// The innermost running effect, unless tracking is paused.
pub(crate) fn current_observer() -> Option<Rc<EffectInner>> {
    if PAUSE_DEPTH.with(|depth| depth.get()) > 0 {
        return None;
    }
    OBSERVERS.with(|observers| observers.borrow().last().cloned())
}

/// Run `f` with dependency tracking paused.
///
/// Reads inside `f` do not subscribe the surrounding effect, even through
/// nested reactive calls.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    PAUSE_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let result = f();
    PAUSE_DEPTH.with(|depth| depth.set(depth.get() - 1));
    result
}
