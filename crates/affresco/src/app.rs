//! The app factory: a root component definition bound to a renderer.

use std::cell::Cell;
use std::rc::Rc;

use affresco_cartone::{ComponentDef, HostAdapter, HostId, VNode, ValueMap};
use affresco_giornata::{RenderError, Renderer, RendererOptions};

/// An application: one root component, one renderer, one mount point at a
/// time.
pub struct App<A: HostAdapter + 'static> {
    renderer: Renderer<A>,
    root: Rc<ComponentDef>,
    props: Option<ValueMap>,
    container: Cell<Option<HostId>>,
}

/// Build an app over `host` with `root` as the root component.
pub fn create_app<A: HostAdapter + 'static>(host: A, root: Rc<ComponentDef>) -> App<A> {
    App {
        renderer: Renderer::new(host),
        root,
        props: None,
        container: Cell::new(None),
    }
}

impl<A: HostAdapter + 'static> App<A> {
    /// Build with explicit renderer options (scheduler, diff strategy).
    pub fn with_options(host: A, root: Rc<ComponentDef>, options: RendererOptions) -> Self {
        Self {
            renderer: Renderer::with_options(host, options),
            root,
            props: None,
            container: Cell::new(None),
        }
    }

    /// Supply root props, consumed on every mount.
    pub fn with_props(mut self, props: ValueMap) -> Self {
        self.props = Some(props);
        self
    }

    /// Build the root component node and render it into `container`.
    pub fn mount(&self, container: HostId) -> Result<(), RenderError> {
        let node = VNode::component(self.root.clone(), self.props.clone());
        self.renderer.render(Some(node), container)?;
        self.container.set(Some(container));
        Ok(())
    }

    /// Unmount whatever the app last mounted. No-op before the first mount.
    pub fn unmount(&self) -> Result<(), RenderError> {
        match self.container.take() {
            Some(container) => self.renderer.render(None, container),
            None => Ok(()),
        }
    }

    pub fn renderer(&self) -> &Renderer<A> {
        &self.renderer
    }
}
