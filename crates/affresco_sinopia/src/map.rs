//! String-keyed reactive maps with per-key dependency granularity.

use std::cell::RefCell;
use std::rc::Rc;

use compact_str::CompactString;
use rustc_hash::FxHashMap;

use crate::dep::Dep;

/// A shallow-reactive map from string keys to values.
///
/// Each key carries its own [`Dep`], so an effect reading `"count"` is not
/// disturbed by writes to `"title"`. Reads of still-absent keys subscribe
/// too - a later insert under that key re-runs the reader. Key enumeration
/// (`keys`, `len`, `snapshot`) tracks a separate iteration dep triggered by
/// inserts of new keys and removals.
///
/// Shallow means the reactivity boundary is the top-level entry: values are
/// cloned out whole, and mutating the inside of a cloned value is invisible
/// until it is written back.
pub struct ReactiveMap<V> {
    inner: Rc<MapInner<V>>,
}

struct MapInner<V> {
    entries: RefCell<FxHashMap<CompactString, V>>,
    key_deps: RefCell<FxHashMap<CompactString, Dep>>,
    iter_dep: Dep,
}

impl<V> Clone for ReactiveMap<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V> Default for ReactiveMap<V> {
    fn default() -> Self {
        Self {
            inner: Rc::new(MapInner {
                entries: RefCell::new(FxHashMap::default()),
                key_deps: RefCell::new(FxHashMap::default()),
                iter_dep: Dep::new(),
            }),
        }
    }
}

impl<V> ReactiveMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_dep(&self, key: &str) -> Dep {
        let mut deps = self.inner.key_deps.borrow_mut();
        if let Some(dep) = deps.get(key) {
            dep.clone()
        } else {
            let dep = Dep::new();
            deps.insert(CompactString::from(key), dep.clone());
            dep
        }
    }

    /// Whether the key is present, tracking it.
    pub fn contains_key(&self, key: &str) -> bool {
        self.key_dep(key).track();
        self.inner.entries.borrow().contains_key(key)
    }

    /// Key set snapshot, tracking iteration.
    pub fn keys(&self) -> Vec<CompactString> {
        self.inner.iter_dep.track();
        self.inner.entries.borrow().keys().cloned().collect()
    }

    /// Entry count, tracking iteration.
    pub fn len(&self) -> usize {
        self.inner.iter_dep.track();
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a key, triggering its dep and iteration on success.
    pub fn remove(&self, key: &str) -> Option<V> {
        let removed = self.inner.entries.borrow_mut().remove(key);
        if removed.is_some() {
            self.key_dep(key).trigger();
            self.inner.iter_dep.trigger();
        }
        removed
    }
}

impl<V: Clone> ReactiveMap<V> {
    pub fn from_map(map: FxHashMap<CompactString, V>) -> Self {
        let reactive = Self::new();
        *reactive.inner.entries.borrow_mut() = map;
        reactive
    }

    /// Read a key's value, tracking the key (present or not).
    pub fn get(&self, key: &str) -> Option<V> {
        self.key_dep(key).track();
        self.inner.entries.borrow().get(key).cloned()
    }

    /// Whole-map snapshot, tracking iteration.
    pub fn snapshot(&self) -> FxHashMap<CompactString, V> {
        self.inner.iter_dep.track();
        self.inner.entries.borrow().clone()
    }
}

impl<V: Clone + PartialEq> ReactiveMap<V> {
    /// Write a key's value.
    ///
    /// Writing a value equal to the present one is a no-op: nothing
    /// triggers and `false` is returned. A genuine change triggers the key
    /// dep, and a brand-new key additionally triggers iteration.
    pub fn insert(&self, key: impl Into<CompactString>, value: V) -> bool {
        let key = key.into();
        let fresh;
        {
            let mut entries = self.inner.entries.borrow_mut();
            match entries.get(&key) {
                Some(existing) if *existing == value => return false,
                existing => {
                    fresh = existing.is_none();
                }
            }
            entries.insert(key.clone(), value);
        }
        self.key_dep(&key).trigger();
        if fresh {
            self.inner.iter_dep.trigger();
        }
        true
    }

    /// Insert every entry of `map` (same change semantics as [`insert`]).
    ///
    /// [`insert`]: ReactiveMap::insert
    pub fn merge(&self, map: FxHashMap<CompactString, V>) {
        for (key, value) in map {
            self.insert(key, value);
        }
    }
}
