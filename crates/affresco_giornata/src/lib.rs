//! Giornata - The reconciliation engine for Affresco.
//!
//! A giornata is one day's patch of fresh plaster: the painter covers
//! exactly the area that changes today and joins it seamlessly to
//! yesterday's work. This crate does the same to a host tree - given the
//! previously rendered node tree and a newly computed one, it issues the
//! host mutations that turn one into the other, and nothing else.
//!
//! The engine couples to re-rendering through `affresco_sinopia` effects: a
//! component's render function runs inside an effect, so mutating reactive
//! state a render read re-enters the patch path on its own. There is no
//! imperative re-render API.
//!
//! # Modules
//!
//! - [`strategy`] - pluggable children diffing planners (naive replace-all
//!   baseline and keyed move-minimizing reconciliation)
//! - `patch` - dispatch and per-kind mount/update handlers
//! - `component` - instance wiring, setup, and the render effect
//! - [`renderer`] - host ownership and the container-level entry point
//! - [`error`] - boundary errors

pub mod error;
pub mod renderer;
pub mod strategy;

mod component;
mod patch;

pub use error::RenderError;
pub use renderer::{Renderer, RendererOptions};
pub use strategy::{ChildOp, ChildPlan, DiffStrategy, FullReplace, KeyedDiff};
