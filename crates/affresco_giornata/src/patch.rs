//! The reconciliation core: dispatch, per-kind handlers, prop and children
//! patching, plan execution, unmount.
//!
//! One symmetric dispatcher serves mount and update: the renderer entry,
//! the children-plan executor and the component render effect all re-enter
//! [`patch`]. Handlers branch internally on the previous node being absent
//! (mount) or present (update).

use std::rc::Rc;

use affresco_cartone::{Children, HostAdapter, HostId, NodeKind, VNode, ValueMap};
use compact_str::CompactString;
use smallvec::SmallVec;

use crate::component;
use crate::error::RenderError;
use crate::renderer::RendererInner;
use crate::strategy::{ChildOp, ChildPlan};

pub(crate) fn patch<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    prev: Option<&VNode>,
    next: &VNode,
    container: HostId,
    anchor: Option<HostId>,
) -> Result<(), RenderError> {
    if !next.shape_consistent() {
        return Err(RenderError::MalformedNode {
            kind: format!("{:?}", next.kind),
            shape: next.shape.flag_names().join("|"),
        });
    }

    // A different identity at the same position is a replacement, not an
    // update: tear the old node down and mount fresh.
    let prev = match prev {
        Some(previous) if !previous.same_ident(next) => {
            unmount(rx, previous);
            None
        }
        other => other,
    };

    match &next.kind {
        NodeKind::Text => process_text(rx, prev, next, container, anchor),
        NodeKind::Comment => process_comment(rx, prev, next, container, anchor),
        NodeKind::Fragment => process_fragment(rx, prev, next, container, anchor),
        NodeKind::Element(_) => process_element(rx, prev, next, container, anchor),
        NodeKind::Component(_) => component::process_component(rx, prev, next, container, anchor),
    }
}

fn process_text<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    prev: Option<&VNode>,
    next: &VNode,
    container: HostId,
    anchor: Option<HostId>,
) -> Result<(), RenderError> {
    let text = next.text_content().unwrap_or_default();
    match prev {
        None => {
            let id = rx.host.borrow_mut().create_text(text);
            next.set_host(Some(id));
            rx.host.borrow_mut().insert(id, container, anchor);
        }
        Some(previous) => {
            let id = previous.host().ok_or(RenderError::DetachedPrevious)?;
            next.set_host(Some(id));
            if previous.text_content() != next.text_content() {
                rx.host.borrow_mut().set_text(id, text);
            }
        }
    }
    Ok(())
}

fn process_comment<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    prev: Option<&VNode>,
    next: &VNode,
    container: HostId,
    anchor: Option<HostId>,
) -> Result<(), RenderError> {
    match prev {
        None => {
            let text = next.text_content().unwrap_or_default();
            let id = rx.host.borrow_mut().create_comment(text);
            next.set_host(Some(id));
            rx.host.borrow_mut().insert(id, container, anchor);
        }
        Some(previous) => {
            // Comments are immutable once mounted; only the host ref is
            // carried forward.
            let id = previous.host().ok_or(RenderError::DetachedPrevious)?;
            next.set_host(Some(id));
        }
    }
    Ok(())
}

fn process_fragment<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    prev: Option<&VNode>,
    next: &VNode,
    container: HostId,
    anchor: Option<HostId>,
) -> Result<(), RenderError> {
    match prev {
        None => {
            if let Children::Nodes(children) = &next.children {
                for child in children {
                    patch(rx, None, child, container, anchor)?;
                }
            }
            Ok(())
        }
        Some(previous) => patch_children(rx, previous, next, container),
    }
}

fn process_element<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    prev: Option<&VNode>,
    next: &VNode,
    container: HostId,
    anchor: Option<HostId>,
) -> Result<(), RenderError> {
    match prev {
        None => mount_element(rx, next, container, anchor),
        Some(previous) => patch_element(rx, previous, next),
    }
}

fn mount_element<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    node: &VNode,
    container: HostId,
    anchor: Option<HostId>,
) -> Result<(), RenderError> {
    let NodeKind::Element(tag) = &node.kind else {
        return Ok(());
    };
    let el = rx.host.borrow_mut().create_element(tag);
    node.set_host(Some(el));

    // Initial prop application: everything is a set, there is no previous.
    if let Some(props) = &node.props {
        let mut host = rx.host.borrow_mut();
        for key in sorted_keys(props) {
            host.patch_prop(el, key, None, props.get(key.as_str()));
        }
    }

    match &node.children {
        Children::None => {}
        Children::Text(text) => rx.host.borrow_mut().set_element_text(el, text),
        Children::Nodes(children) => {
            for child in children {
                patch(rx, None, child, el, None)?;
            }
        }
    }

    rx.host.borrow_mut().insert(el, container, anchor);
    Ok(())
}

fn patch_element<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    prev: &VNode,
    next: &VNode,
) -> Result<(), RenderError> {
    // Same position, same identity: the host node is reused, never
    // reallocated.
    let el = prev.host().ok_or(RenderError::DetachedPrevious)?;
    next.set_host(Some(el));
    patch_props(rx, el, prev.props.as_ref(), next.props.as_ref());
    patch_children(rx, prev, next, el)
}

/// Prop diff with deliberately non-minimal semantics: keys gone from the
/// new set are cleared, and every key in the new set is re-applied even
/// when its value is unchanged. Adapters may rely on write-every-time
/// behavior for some attributes, so the redundancy is part of the
/// contract - do not optimize it away. Keys are visited sorted so the
/// host-op sequence is deterministic.
fn patch_props<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    el: HostId,
    old: Option<&ValueMap>,
    new: Option<&ValueMap>,
) {
    let mut host = rx.host.borrow_mut();
    if let Some(old_map) = old {
        for key in sorted_keys(old_map) {
            let gone = new.map_or(true, |map| !map.contains_key(key.as_str()));
            if gone {
                host.patch_prop(el, key, old_map.get(key.as_str()), None);
            }
        }
    }
    if let Some(new_map) = new {
        for key in sorted_keys(new_map) {
            let previous = old.and_then(|map| map.get(key.as_str()));
            host.patch_prop(el, key, previous, new_map.get(key.as_str()));
        }
    }
}

fn sorted_keys(map: &ValueMap) -> SmallVec<[&CompactString; 8]> {
    let mut keys: SmallVec<[&CompactString; 8]> = map.keys().collect();
    keys.sort_unstable();
    keys
}

pub(crate) fn patch_children<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    prev: &VNode,
    next: &VNode,
    container: HostId,
) -> Result<(), RenderError> {
    match &next.children {
        Children::Text(text) => {
            if let Children::Nodes(old_children) = &prev.children {
                for child in old_children {
                    unmount(rx, child);
                }
            }
            if prev.children.as_text() != Some(text.as_str()) {
                rx.host.borrow_mut().set_element_text(container, text);
            }
            Ok(())
        }
        Children::Nodes(new_children) => {
            let old_children: &[VNode] = match &prev.children {
                Children::Nodes(nodes) => nodes,
                Children::Text(_) => {
                    rx.host.borrow_mut().set_element_text(container, "");
                    &[]
                }
                Children::None => &[],
            };
            let plan = rx.strategy.plan(old_children, new_children);
            apply_plan(rx, &plan, old_children, new_children, container)
        }
        Children::None => {
            match &prev.children {
                Children::Nodes(old_children) => {
                    for child in old_children {
                        unmount(rx, child);
                    }
                }
                Children::Text(_) => rx.host.borrow_mut().set_element_text(container, ""),
                Children::None => {}
            }
            Ok(())
        }
    }
}

fn apply_plan<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    plan: &ChildPlan,
    old: &[VNode],
    new: &[VNode],
    container: HostId,
) -> Result<(), RenderError> {
    for op in &plan.ops {
        match *op {
            ChildOp::Patch { prev, next } => {
                patch(rx, Some(&old[prev]), &new[next], container, None)?;
            }
            ChildOp::Unmount { prev } => unmount(rx, &old[prev]),
            ChildOp::Mount { next, anchor } => {
                let anchor = resolve_anchor(new, anchor);
                patch(rx, None, &new[next], container, anchor)?;
            }
            ChildOp::Move { next, anchor } => {
                let anchor = resolve_anchor(new, anchor);
                let mut hosts: SmallVec<[HostId; 4]> = SmallVec::new();
                collect_attachment_roots(&new[next], &mut hosts);
                let mut host = rx.host.borrow_mut();
                for id in hosts {
                    host.insert(id, container, anchor);
                }
            }
        }
    }
    Ok(())
}

fn resolve_anchor(new: &[VNode], anchor: Option<usize>) -> Option<HostId> {
    anchor.and_then(|index| new.get(index)).and_then(first_host)
}

/// The first realized host node of a subtree: its own for concrete nodes,
/// the first child's for fragments, the sub-tree's for components.
fn first_host(node: &VNode) -> Option<HostId> {
    match &node.kind {
        NodeKind::Text | NodeKind::Comment | NodeKind::Element(_) => node.host(),
        NodeKind::Fragment => node
            .children
            .as_nodes()
            .and_then(|children| children.iter().find_map(first_host)),
        NodeKind::Component(_) => node
            .instance()
            .and_then(|instance| instance.sub_tree.borrow().as_ref().and_then(first_host)),
    }
}

/// Every host node directly attached to the container for this subtree:
/// one for concrete nodes, each child's roots for fragments, the
/// sub-tree's roots for components.
fn collect_attachment_roots(node: &VNode, out: &mut SmallVec<[HostId; 4]>) {
    match &node.kind {
        NodeKind::Text | NodeKind::Comment | NodeKind::Element(_) => {
            if let Some(id) = node.host() {
                out.push(id);
            }
        }
        NodeKind::Fragment => {
            if let Some(children) = node.children.as_nodes() {
                for child in children {
                    collect_attachment_roots(child, out);
                }
            }
        }
        NodeKind::Component(_) => {
            if let Some(instance) = node.instance() {
                if let Some(sub_tree) = instance.sub_tree.borrow().as_ref() {
                    collect_attachment_roots(sub_tree, out);
                }
            }
        }
    }
}

/// Tear a subtree down: stop every descendant component's render effect
/// and release its instance exactly once, then detach each host
/// attachment root exactly once. Hosts below an attachment root leave with
/// it, so unmounting an element root issues a single host removal.
pub(crate) fn unmount<A: HostAdapter + 'static>(rx: &Rc<RendererInner<A>>, node: &VNode) {
    unmount_node(rx, node, true);
}

fn unmount_node<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    node: &VNode,
    detach_host: bool,
) {
    match &node.kind {
        NodeKind::Text | NodeKind::Comment => {
            if detach_host {
                if let Some(id) = node.host() {
                    rx.host.borrow_mut().remove(id);
                }
            }
        }
        NodeKind::Element(_) => {
            if let Children::Nodes(children) = &node.children {
                for child in children {
                    unmount_node(rx, child, false);
                }
            }
            if detach_host {
                if let Some(id) = node.host() {
                    rx.host.borrow_mut().remove(id);
                }
            }
        }
        NodeKind::Fragment => {
            if let Children::Nodes(children) = &node.children {
                for child in children {
                    unmount_node(rx, child, detach_host);
                }
            }
        }
        NodeKind::Component(_) => {
            let Some(instance) = node.take_instance() else {
                return;
            };
            if let Some(effect) = instance.effect.borrow_mut().take() {
                effect.stop();
            }
            if let Some(sub_tree) = instance.sub_tree.borrow_mut().take() {
                unmount_node(rx, &sub_tree, detach_host);
            }
            instance.is_mounted.set(false);
        }
    }
}
