//! The adapter contract a concrete host target implements.

use serde::Serialize;

use crate::value::Value;

/// Opaque handle to a realized host node.
///
/// Allocated by the adapter, stored in node host-ref slots, and passed back
/// on later operations. The engine never inspects what it refers to: the
/// host tree is write-only from the engine's perspective, and every diff
/// decision is made against the previous node tree instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HostId(pub u64);

/// Primitive mutations a host target must provide.
///
/// The adapter is trusted: return values and side effects are never
/// validated. Implementations decide what an "element", "text run" or
/// "property" means for their medium.
pub trait HostAdapter {
    /// Allocate a new host element for `tag`.
    fn create_element(&mut self, tag: &str) -> HostId;

    /// Allocate a new host text node.
    fn create_text(&mut self, text: &str) -> HostId;

    /// Allocate a new host comment node.
    fn create_comment(&mut self, text: &str) -> HostId;

    /// Replace all of `node`'s children with a single text run.
    fn set_element_text(&mut self, node: HostId, text: &str);

    /// Update an existing text node's content.
    fn set_text(&mut self, node: HostId, text: &str);

    /// Attach `node` under `parent`, before `anchor` if given else appended.
    fn insert(&mut self, node: HostId, parent: HostId, anchor: Option<HostId>);

    /// Detach and discard `node`.
    fn remove(&mut self, node: HostId);

    /// Apply one property change to `node`. `next = None` means remove.
    fn patch_prop(&mut self, node: HostId, key: &str, prev: Option<&Value>, next: Option<&Value>);
}
