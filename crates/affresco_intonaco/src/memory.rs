//! Recording in-memory host adapter.

use std::fmt::Write as _;

use affresco_cartone::{HostAdapter, HostId, Value};
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// One recorded host mutation, in application order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HostOp {
    CreateElement {
        id: HostId,
        tag: CompactString,
    },
    CreateText {
        id: HostId,
        text: CompactString,
    },
    CreateComment {
        id: HostId,
        text: CompactString,
    },
    SetElementText {
        node: HostId,
        text: CompactString,
    },
    SetText {
        node: HostId,
        text: CompactString,
    },
    Insert {
        node: HostId,
        parent: HostId,
        anchor: Option<HostId>,
    },
    Remove {
        node: HostId,
    },
    /// `value = None` records a property removal.
    PatchProp {
        node: HostId,
        key: CompactString,
        value: Option<Value>,
    },
}

enum Payload {
    Element {
        tag: CompactString,
        props: FxHashMap<CompactString, Value>,
        text_run: Option<CompactString>,
    },
    Text(CompactString),
    Comment(CompactString),
    /// Mount target allocated by the caller, outside the op log.
    Container,
}

struct MemNode {
    payload: Payload,
    parent: Option<HostId>,
    children: Vec<HostId>,
}

/// An in-memory host: a live node tree plus an ordered mutation log.
#[derive(Default)]
pub struct MemoryHost {
    nodes: FxHashMap<HostId, MemNode>,
    next_id: u64,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a mount target. Not recorded in the op log, so tests can
    /// count engine-issued mutations without setup noise.
    pub fn container(&mut self) -> HostId {
        self.alloc(Payload::Container)
    }

    /// Every mutation applied so far, in order.
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// Count ops matching a predicate.
    pub fn count_ops(&self, predicate: impl Fn(&HostOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }

    pub fn removals(&self) -> usize {
        self.count_ops(|op| matches!(op, HostOp::Remove { .. }))
    }

    pub fn creations(&self) -> usize {
        self.count_ops(|op| {
            matches!(
                op,
                HostOp::CreateElement { .. } | HostOp::CreateText { .. } | HostOp::CreateComment { .. }
            )
        })
    }

    pub fn text_sets(&self) -> usize {
        self.count_ops(|op| matches!(op, HostOp::SetText { .. } | HostOp::SetElementText { .. }))
    }

    /// Whether the node is still in the store.
    pub fn exists(&self, id: HostId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn children_of(&self, id: HostId) -> Vec<HostId> {
        self.nodes
            .get(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Text content of a text node, a comment, or an element's text run.
    pub fn text_of(&self, id: HostId) -> Option<&str> {
        match &self.nodes.get(&id)?.payload {
            Payload::Text(text) | Payload::Comment(text) => Some(text),
            Payload::Element { text_run, .. } => text_run.as_deref(),
            Payload::Container => None,
        }
    }

    pub fn prop_of(&self, id: HostId, key: &str) -> Option<&Value> {
        match &self.nodes.get(&id)?.payload {
            Payload::Element { props, .. } => props.get(key),
            _ => None,
        }
    }

    /// Deterministic indented rendering of a subtree: elements with sorted
    /// props, quoted text runs, comment markers.
    pub fn dump(&self, root: HostId) -> String {
        let mut out = String::new();
        self.dump_into(root, 0, &mut out);
        out
    }

    fn dump_into(&self, id: HostId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        match &node.payload {
            Payload::Container => {
                let _ = writeln!(out, "{indent}#container");
            }
            Payload::Text(text) => {
                let _ = writeln!(out, "{indent}\"{text}\"");
                return;
            }
            Payload::Comment(text) => {
                let _ = writeln!(out, "{indent}<!-- {text} -->");
                return;
            }
            Payload::Element {
                tag,
                props,
                text_run,
            } => {
                let mut keys: Vec<&CompactString> = props.keys().collect();
                keys.sort_unstable();
                let mut line = format!("{indent}<{tag}");
                for key in keys {
                    let _ = write!(line, " {key}=\"{}\"", props[key]);
                }
                line.push('>');
                let _ = writeln!(out, "{line}");
                if let Some(text) = text_run {
                    let _ = writeln!(out, "{indent}  \"{text}\"");
                }
            }
        }
        for child in &node.children {
            self.dump_into(*child, depth + 1, out);
        }
    }

    fn alloc(&mut self, payload: Payload) -> HostId {
        self.next_id += 1;
        let id = HostId(self.next_id);
        self.nodes.insert(
            id,
            MemNode {
                payload,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    fn detach(&mut self, id: HostId) {
        let Some(parent) = self.nodes.get(&id).and_then(|node| node.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    fn drop_subtree(&mut self, id: HostId) {
        let children = self
            .nodes
            .get(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.drop_subtree(child);
        }
        self.nodes.remove(&id);
    }
}

impl HostAdapter for MemoryHost {
    fn create_element(&mut self, tag: &str) -> HostId {
        let id = self.alloc(Payload::Element {
            tag: CompactString::from(tag),
            props: FxHashMap::default(),
            text_run: None,
        });
        self.ops.push(HostOp::CreateElement {
            id,
            tag: CompactString::from(tag),
        });
        id
    }

    fn create_text(&mut self, text: &str) -> HostId {
        let id = self.alloc(Payload::Text(CompactString::from(text)));
        self.ops.push(HostOp::CreateText {
            id,
            text: CompactString::from(text),
        });
        id
    }

    fn create_comment(&mut self, text: &str) -> HostId {
        let id = self.alloc(Payload::Comment(CompactString::from(text)));
        self.ops.push(HostOp::CreateComment {
            id,
            text: CompactString::from(text),
        });
        id
    }

    fn set_element_text(&mut self, node: HostId, text: &str) {
        let children = self.children_of(node);
        for child in children {
            self.drop_subtree(child);
        }
        if let Some(mem) = self.nodes.get_mut(&node) {
            mem.children.clear();
            if let Payload::Element { text_run, .. } = &mut mem.payload {
                *text_run = if text.is_empty() {
                    None
                } else {
                    Some(CompactString::from(text))
                };
            }
        }
        self.ops.push(HostOp::SetElementText {
            node,
            text: CompactString::from(text),
        });
    }

    fn set_text(&mut self, node: HostId, text: &str) {
        if let Some(mem) = self.nodes.get_mut(&node) {
            if let Payload::Text(content) = &mut mem.payload {
                *content = CompactString::from(text);
            }
        }
        self.ops.push(HostOp::SetText {
            node,
            text: CompactString::from(text),
        });
    }

    fn insert(&mut self, node: HostId, parent: HostId, anchor: Option<HostId>) {
        self.detach(node);
        let position = match anchor {
            Some(anchor) => self
                .nodes
                .get(&parent)
                .and_then(|mem| mem.children.iter().position(|child| *child == anchor)),
            None => None,
        };
        if let Some(mem) = self.nodes.get_mut(&parent) {
            match position {
                Some(index) => mem.children.insert(index, node),
                None => mem.children.push(node),
            }
        }
        if let Some(mem) = self.nodes.get_mut(&node) {
            mem.parent = Some(parent);
        }
        self.ops.push(HostOp::Insert {
            node,
            parent,
            anchor,
        });
    }

    fn remove(&mut self, node: HostId) {
        self.detach(node);
        self.drop_subtree(node);
        self.ops.push(HostOp::Remove { node });
    }

    fn patch_prop(&mut self, node: HostId, key: &str, _prev: Option<&Value>, next: Option<&Value>) {
        if let Some(mem) = self.nodes.get_mut(&node) {
            if let Payload::Element { props, .. } = &mut mem.payload {
                match next {
                    Some(value) => {
                        props.insert(CompactString::from(key), value.clone());
                    }
                    None => {
                        props.remove(key);
                    }
                }
            }
        }
        self.ops.push(HostOp::PatchProp {
            node,
            key: CompactString::from(key),
            value: next.cloned(),
        });
    }
}
