//! Affresco - Reactive tree renderer with pluggable hosts.
//!
//! Declarative node trees, described by components, realized onto any host
//! that can create, insert, remove and mutate nodes. Successive renders are
//! reconciled: the engine diffs the newly computed tree against the
//! previously committed one and issues only the necessary host mutations.
//! A component's render runs inside a reactive effect, so mutating state
//! the render read re-renders on its own - there is no update call.
//!
//! # Crates
//!
//! - `affresco_sinopia` - the reactive underdrawing: cells, effects,
//!   schedulers
//! - `affresco_cartone` - the preparatory drawing: values, shape flags,
//!   nodes, component definitions, host contract
//! - `affresco_giornata` - the day's patch of plaster: reconciliation,
//!   children diffing strategies, component runtime, renderer
//! - `affresco_intonaco` - the plainest surface to paint on: an in-memory
//!   recording host
//!
//! # Example
//!
//! ```
//! use affresco::{create_app, vmap, Children, ComponentDef, MemoryHost, Scope, VNode};
//!
//! let counter = ComponentDef::new("counter")
//!     .data(|| vmap! { "count" => 0 })
//!     .render(|scope: &dyn Scope| {
//!         VNode::element(
//!             "p",
//!             None,
//!             Children::from(format!("count: {}", scope.get("count"))),
//!         )
//!     })
//!     .share();
//!
//! let app = create_app(MemoryHost::new(), counter);
//! let container = app.renderer().with_host_mut(|host| host.container());
//! app.mount(container).expect("mounts");
//!
//! let dump = app.renderer().with_host(|host| host.dump(container));
//! assert_eq!(dump, "#container\n  <p>\n    \"count: 0\"\n");
//! ```

mod app;

pub use app::{create_app, App};

pub use affresco_cartone::{
    split_attrs, Assign, Children, CompactString, ComponentDef, ComponentInstance, HostAdapter,
    HostId, Lookup, NodeKind, RenderFn, Scope, SetupContext, SetupResult, ShapeFlags, VNode, Value,
    ValueMap,
};
pub use affresco_cartone::vmap;
pub use affresco_giornata::{
    ChildOp, ChildPlan, DiffStrategy, FullReplace, KeyedDiff, RenderError, Renderer,
    RendererOptions,
};
pub use affresco_intonaco::{HostOp, MemoryHost};
pub use affresco_sinopia::{
    signal, untracked, Dep, Effect, QueueScheduler, ReactiveMap, Scheduler, Signal, SyncScheduler,
};

/// Affresco version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
