//! Sinopia - Reactive underdrawing for Affresco.
//!
//! A sinopia is the red underdrawing beneath a fresco: invisible in the
//! finished work, but it decides where every brushstroke lands. This crate
//! is that layer for the renderer - a single-threaded, synchronous
//! dependency-tracking primitive. A computation wrapped in an [`Effect`]
//! runs once immediately; any reactive data it read is remembered, and a
//! later write to that data re-invokes the computation through a
//! [`Scheduler`].
//!
//! # Primitives
//!
//! - [`Dep`] - a raw subscriber list; `track()` inside an effect, `trigger()`
//!   on write
//! - [`Signal`] - a reactive value cell built on one `Dep`
//! - [`ReactiveMap`] - a string-keyed map with per-key dependency granularity
//! - [`Effect`] - a tracked computation that re-runs when its reads change
//! - [`SyncScheduler`] / [`QueueScheduler`] - immediate re-entrant re-runs
//!   vs. deduplicated explicit-flush batching
//!
//! # Example
//!
//! ```
//! use affresco_sinopia::{signal, Effect};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let count = signal(0);
//! let seen = Rc::new(Cell::new(0));
//!
//! let observed = count.clone();
//! let sink = seen.clone();
//! let _effect = Effect::new(move || sink.set(observed.get()));
//! assert_eq!(seen.get(), 0); // ran immediately
//!
//! count.set(7);
//! assert_eq!(seen.get(), 7); // re-ran on write
//! ```

mod dep;
mod effect;
mod map;
mod scheduler;
mod signal;

pub use dep::Dep;
pub use effect::{untracked, Effect};
pub use map::ReactiveMap;
pub use scheduler::{QueueScheduler, Scheduler, SyncScheduler};
pub use signal::{signal, Signal};
