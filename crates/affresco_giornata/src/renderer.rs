//! The renderer: host ownership, configuration, and the root entry point.

use std::cell::RefCell;
use std::rc::Rc;

use affresco_cartone::{ComponentInstance, HostAdapter, HostId, VNode};
use affresco_sinopia::{Scheduler, SyncScheduler};
use rustc_hash::FxHashMap;

use crate::error::RenderError;
use crate::patch;
use crate::strategy::{DiffStrategy, KeyedDiff};

/// Tunable seams of a renderer.
pub struct RendererOptions {
    /// When triggered render effects re-run. The default is the unbatched
    /// baseline: immediately and re-entrantly, one full render+patch cycle
    /// per write. Swap in a [`QueueScheduler`] to coalesce.
    ///
    /// [`QueueScheduler`]: affresco_sinopia::QueueScheduler
    pub scheduler: Rc<dyn Scheduler>,
    /// How child arrays are reconciled. Defaults to [`KeyedDiff`];
    /// [`FullReplace`] is the destroy-and-rebuild baseline.
    ///
    /// [`FullReplace`]: crate::strategy::FullReplace
    pub strategy: Rc<dyn DiffStrategy>,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            scheduler: Rc::new(SyncScheduler),
            strategy: Rc::new(KeyedDiff),
        }
    }
}

pub(crate) struct RendererInner<A: HostAdapter> {
    pub(crate) host: RefCell<A>,
    pub(crate) scheduler: Rc<dyn Scheduler>,
    pub(crate) strategy: Rc<dyn DiffStrategy>,
    roots: RefCell<FxHashMap<HostId, VNode>>,
}

/// Renders node trees into a host, container by container.
///
/// The association container → last rendered tree lives in an explicit
/// registry here, keyed by host id - host objects are never decorated with
/// hidden fields. Handles are cheap clones sharing one renderer.
pub struct Renderer<A: HostAdapter> {
    inner: Rc<RendererInner<A>>,
}

impl<A: HostAdapter> Clone for Renderer<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: HostAdapter + 'static> Renderer<A> {
    pub fn new(host: A) -> Self {
        Self::with_options(host, RendererOptions::default())
    }

    pub fn with_options(host: A, options: RendererOptions) -> Self {
        Self {
            inner: Rc::new(RendererInner {
                host: RefCell::new(host),
                scheduler: options.scheduler,
                strategy: options.strategy,
                roots: RefCell::new(FxHashMap::default()),
            }),
        }
    }

    /// Render `node` into `container`.
    ///
    /// `Some(node)` patches against the container's previously rendered
    /// tree (a mount when there is none) and records `node` as current.
    /// `None` unmounts the recorded tree if any, a no-op otherwise.
    pub fn render(&self, node: Option<VNode>, container: HostId) -> Result<(), RenderError> {
        match node {
            None => {
                let previous = self.inner.roots.borrow_mut().remove(&container);
                if let Some(previous) = previous {
                    patch::unmount(&self.inner, &previous);
                }
                Ok(())
            }
            Some(next) => {
                let previous = self.inner.roots.borrow_mut().remove(&container);
                patch::patch(&self.inner, previous.as_ref(), &next, container, None)?;
                self.inner.roots.borrow_mut().insert(container, next);
                Ok(())
            }
        }
    }

    /// The live instance behind a container's root component node, if the
    /// container's current tree is a component.
    pub fn root_instance(&self, container: HostId) -> Option<Rc<ComponentInstance>> {
        self.inner
            .roots
            .borrow()
            .get(&container)
            .and_then(|node| node.instance())
    }

    /// Borrow the host adapter read-only.
    pub fn with_host<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        f(&self.inner.host.borrow())
    }

    /// Borrow the host adapter mutably (container allocation, log
    /// housekeeping). Must not be called while a render is in progress.
    pub fn with_host_mut<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        f(&mut self.inner.host.borrow_mut())
    }
}
