//! Component runtime: instance wiring, setup, and the render effect.

use std::cell::RefCell;
use std::rc::Rc;

use affresco_cartone::{
    split_attrs, Assign, ComponentInstance, HostAdapter, HostId, Lookup, NodeKind, Scope,
    SetupContext, SetupResult, VNode, Value,
};
use affresco_sinopia::{untracked, Effect};

use crate::error::RenderError;
use crate::patch;
use crate::renderer::RendererInner;

/// The resolution surface handed to render functions.
///
/// Reads check the instance's state first, then its props, and the
/// reactive maps underneath are what subscribe the render effect to what
/// it read. Writes land in state; props are read-only through this
/// surface.
pub(crate) struct TemplateScope {
    instance: Rc<ComponentInstance>,
}

impl TemplateScope {
    pub(crate) fn new(instance: Rc<ComponentInstance>) -> Self {
        Self { instance }
    }
}

impl Scope for TemplateScope {
    fn resolve(&self, name: &str) -> Lookup {
        if let Some(value) = self.instance.state.get(name) {
            return Lookup::State(value);
        }
        if let Some(value) = self.instance.props.get(name) {
            return Lookup::Props(value);
        }
        tracing::warn!(
            component = %self.instance.def.name,
            name,
            "name found in neither state nor props"
        );
        Lookup::Missing
    }

    fn assign(&self, name: &str, value: Value) -> Assign {
        let shadows_prop = untracked(|| self.instance.props.contains_key(name));
        if shadows_prop {
            tracing::warn!(
                component = %self.instance.def.name,
                name,
                "write to a read-only prop ignored"
            );
            return Assign::ReadonlyProps;
        }
        self.instance.state.insert(name, value);
        Assign::State
    }
}

pub(crate) fn process_component<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    prev: Option<&VNode>,
    next: &VNode,
    container: HostId,
    anchor: Option<HostId>,
) -> Result<(), RenderError> {
    match prev {
        None => mount_component(rx, next, container, anchor),
        Some(previous) => update_component(previous, next),
    }
}

/// Mount: split attrs, build the instance, run setup, resolve the render
/// function, and register the render effect. The effect's first run (which
/// happens synchronously inside effect registration) performs the initial
/// patch; every later run is a re-render triggered by reactive data the
/// previous run read.
fn mount_component<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    node: &VNode,
    container: HostId,
    anchor: Option<HostId>,
) -> Result<(), RenderError> {
    let NodeKind::Component(def) = &node.kind else {
        return Ok(());
    };
    let (declared, attrs) = split_attrs(def, node.props.as_ref());
    let instance = ComponentInstance::new(def.clone(), declared, attrs);
    node.set_instance(instance.clone());

    if let Some(setup) = &def.setup {
        let context = SetupContext {
            attrs: instance.attrs.borrow().clone(),
        };
        match (**setup)(&instance.props, &context) {
            SetupResult::Render(render) => {
                if def.render.is_some() {
                    tracing::warn!(
                        component = %def.name,
                        "setup returned a render function; the `render` option is ignored"
                    );
                }
                *instance.render_fn.borrow_mut() = Some(render);
            }
            SetupResult::Bindings(bindings) => instance.state.merge(bindings),
            SetupResult::None => {}
        }
    }
    if instance.render_fn.borrow().is_none() {
        match &def.render {
            Some(render) => *instance.render_fn.borrow_mut() = Some(render.clone()),
            None => return Err(RenderError::MissingRender(def.name.clone())),
        }
    }

    // A re-render has no caller to return an error to; the mount path does.
    // The slot carries the first run's failure back out of the effect.
    let mount_failure: Rc<RefCell<Option<RenderError>>> = Rc::new(RefCell::new(None));
    let weak = Rc::downgrade(rx);
    let target = instance.clone();
    let failure = mount_failure.clone();
    let effect = Effect::with_scheduler(
        move || {
            let Some(rx) = weak.upgrade() else {
                return;
            };
            if let Err(error) = render_component(&rx, &target, container, anchor) {
                tracing::error!(
                    component = %target.def.name,
                    %error,
                    "render commit abandoned"
                );
                *failure.borrow_mut() = Some(error);
            }
        },
        rx.scheduler.clone(),
    );

    if let Some(error) = mount_failure.borrow_mut().take() {
        effect.stop();
        return Err(error);
    }
    *instance.effect.borrow_mut() = Some(effect);
    Ok(())
}

/// One run of the render effect: produce a subtree, patch it against the
/// previous one (or mount on the first run), commit it as the new
/// sub-tree.
fn render_component<A: HostAdapter + 'static>(
    rx: &Rc<RendererInner<A>>,
    instance: &Rc<ComponentInstance>,
    container: HostId,
    anchor: Option<HostId>,
) -> Result<(), RenderError> {
    let Some(render) = instance.render_fn.borrow().clone() else {
        return Ok(());
    };
    let scope = TemplateScope::new(instance.clone());
    let sub_tree = (*render)(&scope);

    let previous = instance.sub_tree.borrow_mut().take();
    let result = if instance.is_mounted.get() {
        patch::patch(rx, previous.as_ref(), &sub_tree, container, anchor)
    } else {
        patch::patch(rx, None, &sub_tree, container, anchor)
    };
    match result {
        Ok(()) => {
            instance.is_mounted.set(true);
            *instance.sub_tree.borrow_mut() = Some(sub_tree);
            Ok(())
        }
        Err(error) => {
            *instance.sub_tree.borrow_mut() = previous;
            Err(error)
        }
    }
}

/// Update at the parent's call site: the instance survives. Passthrough
/// attrs are replaced wholesale; declared props are written through the
/// reactive view, whose equality short-circuit means only genuine changes
/// re-trigger the render effect.
fn update_component(prev: &VNode, next: &VNode) -> Result<(), RenderError> {
    let Some(instance) = prev.instance() else {
        return Err(RenderError::DetachedPrevious);
    };
    next.set_instance(instance.clone());
    let NodeKind::Component(def) = &next.kind else {
        return Ok(());
    };

    let (declared, attrs) = split_attrs(def, next.props.as_ref());
    *instance.attrs.borrow_mut() = attrs;

    // The parent's own render effect is active here; prop propagation must
    // not subscribe it to the child's maps.
    untracked(|| {
        for key in instance.props.keys() {
            if !declared.contains_key(key.as_str()) {
                instance.props.remove(&key);
            }
        }
        for (key, value) in declared {
            instance.props.insert(key, value);
        }
    });
    Ok(())
}
