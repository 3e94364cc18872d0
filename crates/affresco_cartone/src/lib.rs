//! Cartone - The node model for Affresco.
//!
//! A cartone is the full-scale preparatory drawing an artist transfers onto
//! the wall before painting. This crate is that drawing: the declarative
//! vocabulary a renderer realizes against a host. It has no opinion about
//! *how* trees are diffed or hosts are mutated - it defines what a tree is.
//!
//! # Modules
//!
//! - [`value`] - the runtime value vocabulary for props, state and attrs
//! - [`flags`] - shape classification bitmask for branch-free dispatch
//! - [`node`] - tagged tree nodes and their constructors
//! - [`component`] - component definitions, instances, and the name
//!   resolution surface render functions read through
//! - [`host`] - the adapter contract a concrete host target implements

pub mod component;
pub mod flags;
pub mod host;
pub mod node;
pub mod value;

pub use component::{
    split_attrs, Assign, ComponentDef, ComponentInstance, DataFn, Lookup, RenderFn, Scope,
    SetupContext, SetupFn, SetupResult,
};
pub use flags::ShapeFlags;
pub use host::{HostAdapter, HostId};
pub use node::{Children, NodeKind, VNode};
pub use value::{Value, ValueMap};

// Re-export for downstream convenience (and for `vmap!`).
pub use compact_str::CompactString;
