//! Component definitions, instances, and the name resolution surface.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use affresco_sinopia::{Effect, ReactiveMap};
use compact_str::CompactString;

use crate::node::VNode;
use crate::value::{Value, ValueMap};

/// Produces a component's initial state.
pub type DataFn = Rc<dyn Fn() -> ValueMap>;

/// Produces a node tree from the component's resolution surface.
pub type RenderFn = Rc<dyn Fn(&dyn Scope) -> VNode>;

/// The setup phase, invoked once at mount with the reactive props view and
/// the setup context.
pub type SetupFn = Rc<dyn Fn(&ReactiveMap<Value>, &SetupContext) -> SetupResult>;

/// Extra material handed to the setup phase.
pub struct SetupContext {
    /// Passthrough attributes: everything the caller supplied that is not a
    /// declared prop. Exposed as plain data, not reactive.
    pub attrs: ValueMap,
}

/// What a setup phase produced.
///
/// A render function overrides any separately declared `render` option; a
/// bindings map is merged into the instance's state for name resolution.
pub enum SetupResult {
    Render(RenderFn),
    Bindings(ValueMap),
    None,
}

/// A declarative component: named, with formal props, optional initial
/// data, optional setup phase, optional render function.
///
/// Definitions are shared behind `Rc`; node identity for component nodes is
/// definition identity.
pub struct ComponentDef {
    pub name: CompactString,
    /// Declared formal prop names; incoming attributes outside this set are
    /// passthrough attrs.
    pub props: Vec<CompactString>,
    pub data: Option<DataFn>,
    pub setup: Option<SetupFn>,
    pub render: Option<RenderFn>,
}

impl ComponentDef {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
            data: None,
            setup: None,
            render: None,
        }
    }

    /// Declare one formal prop.
    pub fn prop(mut self, name: impl Into<CompactString>) -> Self {
        self.props.push(name.into());
        self
    }

    /// Set the initial-data function.
    pub fn data(mut self, data: impl Fn() -> ValueMap + 'static) -> Self {
        self.data = Some(Rc::new(data));
        self
    }

    /// Set the setup phase.
    pub fn setup(
        mut self,
        setup: impl Fn(&ReactiveMap<Value>, &SetupContext) -> SetupResult + 'static,
    ) -> Self {
        self.setup = Some(Rc::new(setup));
        self
    }

    /// Set the render function.
    pub fn render(mut self, render: impl Fn(&dyn Scope) -> VNode + 'static) -> Self {
        self.render = Some(Rc::new(render));
        self
    }

    /// Share the definition for use in nodes.
    pub fn share(self) -> Rc<Self> {
        Rc::new(self)
    }
}

/// Where a name resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Found in the instance's state
    State(Value),
    /// Found in the declared props
    Props(Value),
    /// Found in neither
    Missing,
}

/// Where a write landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assign {
    /// Written into state
    State,
    /// Rejected: the name belongs to the read-only props
    ReadonlyProps,
}

/// The two-tier name resolution surface a render function reads through.
///
/// Reads check state first, then props. Writes land in state only; a write
/// naming a props key is rejected and ignored. The tagged [`Lookup`] result
/// keeps the duck-typed feel of dynamic lookup without a runtime-generic
/// interception layer.
pub trait Scope {
    fn resolve(&self, name: &str) -> Lookup;

    fn assign(&self, name: &str, value: Value) -> Assign;

    /// Convenience read: a missing name yields [`Value::Null`].
    fn get(&self, name: &str) -> Value {
        match self.resolve(name) {
            Lookup::State(value) | Lookup::Props(value) => value,
            Lookup::Missing => Value::Null,
        }
    }
}

/// The live counterpart of one mounted component node.
///
/// Created once per mounted component node and carried across updates for
/// as long as the same definition occupies that position in the tree.
pub struct ComponentInstance {
    pub def: Rc<ComponentDef>,
    /// Reactive state, seeded from the definition's initial data and later
    /// merged with setup bindings.
    pub state: ReactiveMap<Value>,
    /// Shallow-reactive view of the declared props.
    pub props: ReactiveMap<Value>,
    /// Passthrough attributes, plain and non-reactive.
    pub attrs: RefCell<ValueMap>,
    /// False until the first successful patch into the host.
    pub is_mounted: Cell<bool>,
    /// The node tree produced by the most recent committed render.
    pub sub_tree: RefCell<Option<VNode>>,
    /// The render function resolved at mount (setup result or declared).
    pub render_fn: RefCell<Option<RenderFn>>,
    /// The render effect driving this instance.
    pub effect: RefCell<Option<Effect>>,
}

impl ComponentInstance {
    /// Build an instance: state from the definition's data function, props
    /// from the declared subset of incoming attributes.
    pub fn new(def: Rc<ComponentDef>, declared: ValueMap, attrs: ValueMap) -> Rc<Self> {
        let state = match &def.data {
            Some(data) => ReactiveMap::from_map((**data)()),
            None => ReactiveMap::new(),
        };
        Rc::new(Self {
            def,
            state,
            props: ReactiveMap::from_map(declared),
            attrs: RefCell::new(attrs),
            is_mounted: Cell::new(false),
            sub_tree: RefCell::new(None),
            render_fn: RefCell::new(None),
            effect: RefCell::new(None),
        })
    }
}

/// Resolve incoming attributes into `(declared props, passthrough attrs)`.
pub fn split_attrs(def: &ComponentDef, raw: Option<&ValueMap>) -> (ValueMap, ValueMap) {
    let mut declared = ValueMap::default();
    let mut passthrough = ValueMap::default();
    let Some(raw) = raw else {
        return (declared, passthrough);
    };
    for (key, value) in raw {
        if def.props.iter().any(|name| name == key) {
            declared.insert(key.clone(), value.clone());
        } else {
            passthrough.insert(key.clone(), value.clone());
        }
    }
    (declared, passthrough)
}
