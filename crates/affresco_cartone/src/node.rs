//! Tagged tree nodes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;

use crate::component::{ComponentDef, ComponentInstance};
use crate::flags::ShapeFlags;
use crate::host::HostId;
use crate::value::ValueMap;

/// What a node describes.
#[derive(Clone)]
pub enum NodeKind {
    /// Plain text run
    Text,
    /// Comment, immutable once mounted
    Comment,
    /// Parentless grouping of siblings, no host node of its own
    Fragment,
    /// Host element with a tag
    Element(CompactString),
    /// Stateful component described by a shared definition
    Component(Rc<ComponentDef>),
}

impl NodeKind {
    /// Kind identity: marker equality, tag equality, or definition identity.
    pub fn same(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (NodeKind::Text, NodeKind::Text)
            | (NodeKind::Comment, NodeKind::Comment)
            | (NodeKind::Fragment, NodeKind::Fragment) => true,
            (NodeKind::Element(a), NodeKind::Element(b)) => a == b,
            (NodeKind::Component(a), NodeKind::Component(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Text => f.write_str("Text"),
            NodeKind::Comment => f.write_str("Comment"),
            NodeKind::Fragment => f.write_str("Fragment"),
            NodeKind::Element(tag) => write!(f, "Element({tag})"),
            NodeKind::Component(def) => write!(f, "Component({})", def.name),
        }
    }
}

/// A node's children payload.
#[derive(Debug, Default)]
pub enum Children {
    #[default]
    None,
    /// A single text run
    Text(CompactString),
    /// An ordered node sequence
    Nodes(Vec<VNode>),
}

impl Children {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Children::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_nodes(&self) -> Option<&[VNode]> {
        match self {
            Children::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Children::None)
    }
}

impl From<&str> for Children {
    fn from(text: &str) -> Self {
        Children::Text(CompactString::from(text))
    }
}

impl From<String> for Children {
    fn from(text: String) -> Self {
        Children::Text(CompactString::from(text))
    }
}

impl From<Vec<VNode>> for Children {
    fn from(nodes: Vec<VNode>) -> Self {
        Children::Nodes(nodes)
    }
}

/// A tagged description of a piece of UI, created fresh every render.
///
/// The host-ref slot starts empty, is assigned when the node mounts, and is
/// carried over from the previous node when an update reuses the same
/// logical position. The instance slot plays the same role for component
/// nodes. Both are interior-mutable so the engine can realize a tree it
/// only holds by shared reference.
pub struct VNode {
    pub kind: NodeKind,
    pub props: Option<ValueMap>,
    pub children: Children,
    /// Identity for keyed children reconciliation
    pub key: Option<CompactString>,
    pub shape: ShapeFlags,
    host: Cell<Option<HostId>>,
    instance: RefCell<Option<Rc<ComponentInstance>>>,
}

fn children_flag(children: &Children) -> ShapeFlags {
    match children {
        Children::None => ShapeFlags::empty(),
        Children::Text(_) => ShapeFlags::TEXT_CHILDREN,
        Children::Nodes(_) => ShapeFlags::ARRAY_CHILDREN,
    }
}

impl VNode {
    fn new(kind: NodeKind, props: Option<ValueMap>, children: Children, kind_flag: ShapeFlags) -> Self {
        let shape = kind_flag | children_flag(&children);
        Self {
            kind,
            props,
            children,
            key: None,
            shape,
            host: Cell::new(None),
            instance: RefCell::new(None),
        }
    }

    /// Create an element node.
    pub fn element(
        tag: impl Into<CompactString>,
        props: Option<ValueMap>,
        children: impl Into<Children>,
    ) -> Self {
        Self::new(
            NodeKind::Element(tag.into()),
            props,
            children.into(),
            ShapeFlags::ELEMENT,
        )
    }

    /// Create a text node.
    pub fn text(text: impl Into<CompactString>) -> Self {
        Self::new(
            NodeKind::Text,
            None,
            Children::Text(text.into()),
            ShapeFlags::TEXT,
        )
    }

    /// Create a comment node.
    pub fn comment(text: impl Into<CompactString>) -> Self {
        Self::new(
            NodeKind::Comment,
            None,
            Children::Text(text.into()),
            ShapeFlags::COMMENT,
        )
    }

    /// Create a fragment node.
    pub fn fragment(children: Vec<VNode>) -> Self {
        Self::new(
            NodeKind::Fragment,
            None,
            Children::Nodes(children),
            ShapeFlags::FRAGMENT,
        )
    }

    /// Create a component node.
    pub fn component(def: Rc<ComponentDef>, props: Option<ValueMap>) -> Self {
        Self::new(
            NodeKind::Component(def),
            props,
            Children::None,
            ShapeFlags::COMPONENT,
        )
    }

    /// Attach a reconciliation key.
    pub fn with_key(mut self, key: impl Into<CompactString>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The realized host node, if mounted.
    pub fn host(&self) -> Option<HostId> {
        self.host.get()
    }

    pub fn set_host(&self, host: Option<HostId>) {
        self.host.set(host);
    }

    /// The live component instance, for component nodes that mounted.
    pub fn instance(&self) -> Option<Rc<ComponentInstance>> {
        self.instance.borrow().clone()
    }

    pub fn set_instance(&self, instance: Rc<ComponentInstance>) {
        *self.instance.borrow_mut() = Some(instance);
    }

    pub fn take_instance(&self) -> Option<Rc<ComponentInstance>> {
        self.instance.borrow_mut().take()
    }

    /// Whether `other` occupies the same logical identity: same kind
    /// (marker / tag / definition) and same key.
    pub fn same_ident(&self, other: &VNode) -> bool {
        self.kind.same(&other.kind) && self.key == other.key
    }

    /// Whether the shape's children bits agree with the children payload.
    pub fn shape_consistent(&self) -> bool {
        let text_bit = self.shape.contains(ShapeFlags::TEXT_CHILDREN);
        let array_bit = self.shape.contains(ShapeFlags::ARRAY_CHILDREN);
        match self.children {
            Children::None => !text_bit && !array_bit,
            Children::Text(_) => text_bit && !array_bit,
            Children::Nodes(_) => array_bit && !text_bit,
        }
    }

    /// Text payload of text and comment nodes.
    pub fn text_content(&self) -> Option<&str> {
        self.children.as_text()
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNode")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("shape", &self.shape.flag_names())
            .field("host", &self.host.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vmap;

    #[test]
    fn test_constructors_set_shape() {
        let el = VNode::element("div", Some(vmap! { "id" => "app" }), vec![]);
        assert_eq!(el.shape, ShapeFlags::ELEMENT | ShapeFlags::ARRAY_CHILDREN);

        let el = VNode::element("span", None, "hello");
        assert_eq!(el.shape, ShapeFlags::ELEMENT | ShapeFlags::TEXT_CHILDREN);

        let text = VNode::text("hi");
        assert_eq!(text.shape, ShapeFlags::TEXT | ShapeFlags::TEXT_CHILDREN);

        let comment = VNode::comment("note");
        assert_eq!(comment.shape, ShapeFlags::COMMENT | ShapeFlags::TEXT_CHILDREN);

        let fragment = VNode::fragment(vec![VNode::text("a")]);
        assert_eq!(
            fragment.shape,
            ShapeFlags::FRAGMENT | ShapeFlags::ARRAY_CHILDREN
        );
    }

    #[test]
    fn test_shape_consistency_holds_for_constructors() {
        for node in [
            VNode::element("div", None, vec![VNode::text("x")]),
            VNode::element("p", None, "text"),
            VNode::text("t"),
            VNode::comment("c"),
            VNode::fragment(vec![]),
        ] {
            assert!(node.shape_consistent(), "{node:?}");
        }
    }

    #[test]
    fn test_same_ident_matches_kind_and_key() {
        let a = VNode::element("div", None, Children::None).with_key("1");
        let b = VNode::element("div", None, Children::None).with_key("1");
        let c = VNode::element("div", None, Children::None).with_key("2");
        let d = VNode::element("span", None, Children::None).with_key("1");
        assert!(a.same_ident(&b));
        assert!(!a.same_ident(&c));
        assert!(!a.same_ident(&d));
    }

    #[test]
    fn test_component_identity_is_by_definition() {
        let def_a = Rc::new(ComponentDef::new("counter"));
        let def_b = Rc::new(ComponentDef::new("counter"));
        let a1 = VNode::component(def_a.clone(), None);
        let a2 = VNode::component(def_a, None);
        let b = VNode::component(def_b, None);
        assert!(a1.same_ident(&a2));
        assert!(!a1.same_ident(&b));
    }

    #[test]
    fn test_host_slot_starts_empty() {
        let node = VNode::text("x");
        assert_eq!(node.host(), None);
        node.set_host(Some(HostId(3)));
        assert_eq!(node.host(), Some(HostId(3)));
    }
}
