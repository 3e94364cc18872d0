//! Dependency lists linking reactive data to the effects that read it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::effect::{self, EffectInner};

/// A subscriber list attached to one piece of reactive data.
///
/// Reads call [`Dep::track`] to link the currently running effect (if any);
/// writes call [`Dep::trigger`] to schedule every live subscriber. The handle
/// is cheap to clone and clones share the same list.
#[derive(Clone, Default)]
pub struct Dep {
    inner: Rc<DepInner>,
}

#[derive(Default)]
pub(crate) struct DepInner {
    subscribers: RefCell<Vec<Weak<EffectInner>>>,
}

impl Dep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link the currently running effect to this dep.
    ///
    /// Outside an effect (or under [`crate::untracked`]) this is a no-op.
    pub fn track(&self) {
        let Some(observer) = effect::current_observer() else {
            return;
        };
        let ptr = Rc::as_ptr(&observer);
        let mut subscribers = self.inner.subscribers.borrow_mut();
        if !subscribers.iter().any(|weak| weak.as_ptr() == ptr) {
            subscribers.push(Rc::downgrade(&observer));
        }
        drop(subscribers);
        observer.record_dep(Rc::downgrade(&self.inner));
    }

    /// Schedule every live subscriber through its own scheduler.
    ///
    /// The subscriber list is snapshotted first: running an effect
    /// re-registers its links and would otherwise mutate the list mid-walk.
    pub fn trigger(&self) {
        let subscribers: Vec<Weak<EffectInner>> = self.inner.subscribers.borrow().clone();
        for weak in subscribers {
            if let Some(inner) = weak.upgrade() {
                effect::schedule(inner);
            }
        }
    }

    /// Number of live subscribers. Dead weak links count as gone.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl DepInner {
    pub(crate) fn remove_subscriber(&self, ptr: *const EffectInner) {
        self.subscribers
            .borrow_mut()
            .retain(|weak| weak.as_ptr() != ptr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Effect;
    use std::cell::Cell;

    #[test]
    fn test_track_outside_effect_is_noop() {
        let dep = Dep::new();
        dep.track();
        assert_eq!(dep.subscriber_count(), 0);
    }

    #[test]
    fn test_track_links_running_effect() {
        let dep = Dep::new();
        let inner = dep.clone();
        let effect = Effect::new(move || inner.track());
        assert_eq!(dep.subscriber_count(), 1);
        effect.stop();
        assert_eq!(dep.subscriber_count(), 0);
    }

    #[test]
    fn test_trigger_reruns_subscriber() {
        let dep = Dep::new();
        let runs = Rc::new(Cell::new(0));

        let tracked = dep.clone();
        let counter = runs.clone();
        let _effect = Effect::new(move || {
            tracked.track();
            counter.set(counter.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        dep.trigger();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_duplicate_tracks_subscribe_once() {
        let dep = Dep::new();
        let tracked = dep.clone();
        let _effect = Effect::new(move || {
            tracked.track();
            tracked.track();
        });
        assert_eq!(dep.subscriber_count(), 1);
    }
}
