//! Shape classification flags.

use bitflags::bitflags;
use smallvec::SmallVec;

bitflags! {
    /// Bitmask classifying a node's kind and its children's representation.
    ///
    /// The kind bits mirror [`NodeKind`] and the children bits mirror
    /// [`Children`], so dispatch can branch on a mask comparison without
    /// touching the payloads. The redundancy carries an invariant: the
    /// children bits must agree with the actual `Children` payload.
    /// Constructors uphold it; the patch boundary verifies it.
    ///
    /// [`NodeKind`]: crate::node::NodeKind
    /// [`Children`]: crate::node::Children
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ShapeFlags: u16 {
        /// Host element with a tag
        const ELEMENT = 1;
        /// Stateful component
        const COMPONENT = 1 << 1;
        /// Text node
        const TEXT = 1 << 2;
        /// Comment node
        const COMMENT = 1 << 3;
        /// Parentless grouping of siblings
        const FRAGMENT = 1 << 4;
        /// Children are a single text run
        const TEXT_CHILDREN = 1 << 5;
        /// Children are an ordered node sequence
        const ARRAY_CHILDREN = 1 << 6;
    }
}

impl ShapeFlags {
    /// Get flag names for display
    pub fn flag_names(&self) -> SmallVec<[&'static str; 8]> {
        let mut names = SmallVec::new();
        if self.contains(Self::ELEMENT) {
            names.push("ELEMENT");
        }
        if self.contains(Self::COMPONENT) {
            names.push("COMPONENT");
        }
        if self.contains(Self::TEXT) {
            names.push("TEXT");
        }
        if self.contains(Self::COMMENT) {
            names.push("COMMENT");
        }
        if self.contains(Self::FRAGMENT) {
            names.push("FRAGMENT");
        }
        if self.contains(Self::TEXT_CHILDREN) {
            names.push("TEXT_CHILDREN");
        }
        if self.contains(Self::ARRAY_CHILDREN) {
            names.push("ARRAY_CHILDREN");
        }
        names
    }
}
