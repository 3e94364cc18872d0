//! Single-value reactive cells.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dep::Dep;

/// A reactive value cell.
///
/// Reads inside an effect subscribe that effect; writes trigger every
/// subscriber. Clones share the same cell. Writes always trigger - value
/// diffing, where wanted, belongs to the consumer (the renderer diffs trees,
/// not cells).
pub struct Signal<T> {
    value: Rc<RefCell<T>>,
    dep: Dep,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            dep: self.dep.clone(),
        }
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            dep: Dep::new(),
        }
    }

    /// Read through a borrow, tracking the surrounding effect.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.dep.track();
        f(&self.value.borrow())
    }

    /// Replace the value and trigger subscribers.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.dep.trigger();
    }

    /// Mutate the value in place and trigger subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        self.dep.trigger();
    }
}

impl<T: Clone> Signal<T> {
    /// Read a copy of the value, tracking the surrounding effect.
    pub fn get(&self) -> T {
        self.dep.track();
        self.value.borrow().clone()
    }

    /// Read a copy without tracking.
    pub fn peek(&self) -> T {
        self.value.borrow().clone()
    }
}

/// Shorthand constructor.
pub fn signal<T>(value: T) -> Signal<T> {
    Signal::new(value)
}
