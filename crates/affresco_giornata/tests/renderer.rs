//! End-to-end reconciliation tests against the recording host.

use std::cell::Cell;
use std::rc::Rc;

use affresco_cartone::{
    vmap, Children, CompactString, ComponentDef, HostId, Scope, SetupResult, VNode, Value,
};
use affresco_giornata::{FullReplace, RenderError, Renderer, RendererOptions};
use affresco_intonaco::{HostOp, MemoryHost};
use affresco_sinopia::QueueScheduler;

fn renderer() -> (Renderer<MemoryHost>, HostId) {
    let renderer = Renderer::new(MemoryHost::new());
    let container = renderer.with_host_mut(|host| host.container());
    (renderer, container)
}

fn li(text: &str) -> VNode {
    VNode::element("li", None, Children::from(text))
}

fn keyed_li(key: &str, text: &str) -> VNode {
    li(text).with_key(key)
}

#[test]
fn test_prop_patch_clears_old_and_reapplies_all_new() {
    let (renderer, container) = renderer();
    renderer
        .render(
            Some(VNode::element(
                "div",
                Some(vmap! { "a" => 1, "c" => 3 }),
                Children::None,
            )),
            container,
        )
        .expect("mounts");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer
        .render(
            Some(VNode::element(
                "div",
                Some(vmap! { "a" => 1, "b" => 2 }),
                Children::None,
            )),
            container,
        )
        .expect("updates");

    // Old-only keys cleared first, then every new key re-applied - `a`
    // included, although its value never changed.
    let el = HostId(2);
    let ops = renderer.with_host(|host| host.ops().to_vec());
    assert_eq!(
        ops,
        vec![
            HostOp::PatchProp {
                node: el,
                key: CompactString::from("c"),
                value: None,
            },
            HostOp::PatchProp {
                node: el,
                key: CompactString::from("a"),
                value: Some(Value::Int(1)),
            },
            HostOp::PatchProp {
                node: el,
                key: CompactString::from("b"),
                value: Some(Value::Int(2)),
            },
        ]
    );
}

#[test]
fn test_malformed_shape_is_rejected_at_the_boundary() {
    let (renderer, container) = renderer();
    let mut node = VNode::element("div", None, Children::None);
    // Bypass the constructors: the payload changes, the flags do not.
    node.children = Children::from("smuggled");

    let error = renderer.render(Some(node), container).expect_err("rejected");
    assert!(matches!(error, RenderError::MalformedNode { .. }));
    assert!(renderer.with_host(|host| host.ops().is_empty()));
}

#[test]
fn test_full_replace_rebuilds_children_wholesale() {
    let renderer = Renderer::with_options(
        MemoryHost::new(),
        RendererOptions {
            strategy: Rc::new(FullReplace),
            ..Default::default()
        },
    );
    let container = renderer.with_host_mut(|host| host.container());

    let list = |items: &[&str]| {
        VNode::element(
            "ul",
            None,
            Children::Nodes(items.iter().map(|text| li(text)).collect()),
        )
    };
    renderer
        .render(Some(list(&["x", "y", "z"])), container)
        .expect("mounts");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer
        .render(Some(list(&["x", "y"])), container)
        .expect("updates");

    // The naive baseline: three removals, two fresh mounts, zero reuse.
    let (removals, creations) =
        renderer.with_host(|host| (host.removals(), host.creations()));
    assert_eq!((removals, creations), (3, 2));
    let ops = renderer.with_host(|host| host.ops().to_vec());
    assert!(ops[..3]
        .iter()
        .all(|op| matches!(op, HostOp::Remove { .. })));
}

#[test]
fn test_keyed_permutation_reuses_and_moves_hosts() {
    let (renderer, container) = renderer();
    let list = |keys: &[&str]| {
        VNode::element(
            "ul",
            None,
            Children::Nodes(keys.iter().map(|key| keyed_li(key, key)).collect()),
        )
    };
    renderer
        .render(Some(list(&["a", "b", "c"])), container)
        .expect("mounts");
    let ul = renderer.with_host(|host| host.children_of(container))[0];
    let before = renderer.with_host(|host| host.children_of(ul));
    renderer.with_host_mut(|host| host.clear_ops());

    renderer
        .render(Some(list(&["c", "a", "b"])), container)
        .expect("updates");

    // Same hosts, rotated: no creations, no removals, one move.
    let (removals, creations) =
        renderer.with_host(|host| (host.removals(), host.creations()));
    assert_eq!((removals, creations), (0, 0));
    let inserts = renderer.with_host(|host| {
        host.count_ops(|op| matches!(op, HostOp::Insert { parent, .. } if *parent == ul))
    });
    assert_eq!(inserts, 1);

    let after = renderer.with_host(|host| host.children_of(ul));
    assert_eq!(after, vec![before[2], before[0], before[1]]);
}

#[test]
fn test_root_unmount_issues_one_removal() {
    let (renderer, container) = renderer();
    renderer
        .render(
            Some(VNode::element(
                "div",
                None,
                Children::Nodes(vec![VNode::element(
                    "span",
                    None,
                    Children::from("inner"),
                )]),
            )),
            container,
        )
        .expect("mounts");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer.render(None, container).expect("unmounts");
    let ops = renderer.with_host(|host| host.ops().to_vec());
    assert_eq!(ops, vec![HostOp::Remove { node: HostId(2) }]);

    // A second `render(None)` has no recorded tree and does nothing.
    renderer.render(None, container).expect("no-op");
    assert_eq!(renderer.with_host(|host| host.removals()), 1);
}

#[test]
fn test_unchanged_text_roundtrip_issues_no_ops() {
    let (renderer, container) = renderer();
    let tree = || {
        VNode::element(
            "div",
            None,
            Children::Nodes(vec![VNode::text("hello"), VNode::text("world")]),
        )
    };
    renderer.render(Some(tree()), container).expect("mounts");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer.render(Some(tree()), container).expect("updates");
    assert!(renderer.with_host(|host| host.ops().is_empty()));
}

#[test]
fn test_changed_text_sets_once() {
    let (renderer, container) = renderer();
    renderer
        .render(
            Some(VNode::element(
                "div",
                None,
                Children::Nodes(vec![VNode::text("before")]),
            )),
            container,
        )
        .expect("mounts");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer
        .render(
            Some(VNode::element(
                "div",
                None,
                Children::Nodes(vec![VNode::text("after")]),
            )),
            container,
        )
        .expect("updates");
    let ops = renderer.with_host(|host| host.ops().to_vec());
    assert_eq!(
        ops,
        vec![HostOp::SetText {
            node: HostId(3),
            text: CompactString::from("after"),
        }]
    );
}

#[test]
fn test_root_replacement_unmounts_then_mounts() {
    let (renderer, container) = renderer();
    renderer
        .render(
            Some(VNode::element("div", None, Children::None)),
            container,
        )
        .expect("mounts");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer
        .render(
            Some(VNode::element("span", None, Children::None)),
            container,
        )
        .expect("replaces");
    let ops = renderer.with_host(|host| host.ops().to_vec());
    assert_eq!(
        ops,
        vec![
            HostOp::Remove { node: HostId(2) },
            HostOp::CreateElement {
                id: HostId(3),
                tag: CompactString::from("span"),
            },
            HostOp::Insert {
                node: HostId(3),
                parent: container,
                anchor: None,
            },
        ]
    );
}

#[test]
fn test_array_children_replaced_by_text() {
    let (renderer, container) = renderer();
    renderer
        .render(
            Some(VNode::element(
                "div",
                None,
                Children::Nodes(vec![li("x"), li("y")]),
            )),
            container,
        )
        .expect("mounts");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer
        .render(
            Some(VNode::element("div", None, Children::from("plain"))),
            container,
        )
        .expect("updates");

    // Every previous child removed first, then one text run.
    let ops = renderer.with_host(|host| host.ops().to_vec());
    assert_eq!(
        ops,
        vec![
            HostOp::Remove { node: HostId(3) },
            HostOp::Remove { node: HostId(4) },
            HostOp::SetElementText {
                node: HostId(2),
                text: CompactString::from("plain"),
            },
        ]
    );
}

#[test]
fn test_text_children_replaced_by_array() {
    let (renderer, container) = renderer();
    renderer
        .render(
            Some(VNode::element("div", None, Children::from("plain"))),
            container,
        )
        .expect("mounts");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer
        .render(
            Some(VNode::element(
                "div",
                None,
                Children::Nodes(vec![li("z")]),
            )),
            container,
        )
        .expect("updates");

    let ops = renderer.with_host(|host| host.ops().to_vec());
    assert_eq!(ops[0], HostOp::SetElementText {
        node: HostId(2),
        text: CompactString::new(""),
    });
    assert_eq!(renderer.with_host(|host| host.creations()), 1);
    assert_eq!(renderer.with_host(|host| host.text_of(HostId(2)).map(str::to_owned)), None);
}

#[test]
fn test_fragment_mounts_children_into_parent() {
    let (renderer, container) = renderer();
    renderer
        .render(
            Some(VNode::fragment(vec![
                VNode::text("head"),
                VNode::element("p", None, Children::from("body")),
            ])),
            container,
        )
        .expect("mounts");

    let children = renderer.with_host(|host| host.children_of(container));
    assert_eq!(children.len(), 2);
    renderer.with_host_mut(|host| host.clear_ops());

    renderer
        .render(
            Some(VNode::fragment(vec![
                VNode::text("head"),
                VNode::element("p", None, Children::from("edited")),
            ])),
            container,
        )
        .expect("updates");
    let ops = renderer.with_host(|host| host.ops().to_vec());
    assert_eq!(
        ops,
        vec![HostOp::SetElementText {
            node: children[1],
            text: CompactString::from("edited"),
        }]
    );
}

#[test]
fn test_comment_is_immutable_after_mount() {
    let (renderer, container) = renderer();
    renderer
        .render(Some(VNode::comment("first")), container)
        .expect("mounts");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer
        .render(Some(VNode::comment("second")), container)
        .expect("updates");
    assert!(renderer.with_host(|host| host.ops().is_empty()));
    assert_eq!(
        renderer.with_host(|host| host.text_of(HostId(2)).map(str::to_owned)),
        Some(String::from("first"))
    );
}

fn counter_def() -> Rc<ComponentDef> {
    ComponentDef::new("counter")
        .data(|| vmap! { "count" => 0 })
        .render(|scope: &dyn Scope| {
            VNode::element(
                "div",
                None,
                Children::from(format!("count: {}", scope.get("count"))),
            )
        })
        .share()
}

#[test]
fn test_state_mutation_rerenders_without_an_update_call() {
    let (renderer, container) = renderer();
    renderer
        .render(Some(VNode::component(counter_def(), None)), container)
        .expect("mounts");
    let instance = renderer.root_instance(container).expect("instance");
    assert_eq!(
        renderer.with_host(|host| host.text_of(HostId(2)).map(str::to_owned)),
        Some(String::from("count: 0"))
    );
    renderer.with_host_mut(|host| host.clear_ops());

    // One write, one synchronous render+patch cycle.
    instance.state.insert("count", Value::Int(1));
    assert_eq!(renderer.with_host(|host| host.text_sets()), 1);

    // N writes, N cycles: the unbatched baseline does not coalesce.
    instance.state.insert("count", Value::Int(2));
    instance.state.insert("count", Value::Int(3));
    assert_eq!(renderer.with_host(|host| host.text_sets()), 3);

    // Writing the value already present short-circuits in the state map.
    instance.state.insert("count", Value::Int(3));
    assert_eq!(renderer.with_host(|host| host.text_sets()), 3);

    assert_eq!(
        renderer.with_host(|host| host.text_of(HostId(2)).map(str::to_owned)),
        Some(String::from("count: 3"))
    );
}

#[test]
fn test_queue_scheduler_coalesces_rerenders() {
    let queue = QueueScheduler::new();
    let renderer = Renderer::with_options(
        MemoryHost::new(),
        RendererOptions {
            scheduler: Rc::new(queue.clone()),
            ..Default::default()
        },
    );
    let container = renderer.with_host_mut(|host| host.container());
    renderer
        .render(Some(VNode::component(counter_def(), None)), container)
        .expect("mounts");
    let instance = renderer.root_instance(container).expect("instance");
    renderer.with_host_mut(|host| host.clear_ops());

    instance.state.insert("count", Value::Int(1));
    instance.state.insert("count", Value::Int(2));
    instance.state.insert("count", Value::Int(3));
    assert_eq!(renderer.with_host(|host| host.text_sets()), 0);

    // One flush, one render, one host write with the final value.
    assert_eq!(queue.flush(), 1);
    assert_eq!(renderer.with_host(|host| host.text_sets()), 1);
    assert_eq!(
        renderer.with_host(|host| host.text_of(HostId(2)).map(str::to_owned)),
        Some(String::from("count: 3"))
    );
}

#[test]
fn test_setup_render_function_wins_over_render_option() {
    let (renderer, container) = renderer();
    let def = ComponentDef::new("dual")
        .setup(|_props, _context| {
            SetupResult::Render(Rc::new(|_scope: &dyn Scope| VNode::text("from setup")))
        })
        .render(|_scope: &dyn Scope| VNode::text("from option"))
        .share();

    renderer
        .render(Some(VNode::component(def, None)), container)
        .expect("mounts");
    let dump = renderer.with_host(|host| host.dump(container));
    assert_eq!(dump, "#container\n  \"from setup\"\n");
}

#[test]
fn test_setup_bindings_merge_into_state() {
    let (renderer, container) = renderer();
    let def = ComponentDef::new("mixed")
        .data(|| vmap! { "a" => "data" })
        .setup(|_props, _context| SetupResult::Bindings(vmap! { "b" => "setup" }))
        .render(|scope: &dyn Scope| {
            VNode::text(format!("{}/{}", scope.get("a"), scope.get("b")))
        })
        .share();

    renderer
        .render(Some(VNode::component(def, None)), container)
        .expect("mounts");
    let dump = renderer.with_host(|host| host.dump(container));
    assert_eq!(dump, "#container\n  \"data/setup\"\n");
}

#[test]
fn test_prop_writes_are_rejected_state_writes_land() {
    let (renderer, container) = renderer();
    let def = ComponentDef::new("guarded")
        .prop("fixed")
        .data(|| vmap! { "mine" => 0 })
        .render(|scope: &dyn Scope| {
            use affresco_cartone::Assign;
            assert_eq!(
                scope.assign("fixed", Value::Int(9)),
                Assign::ReadonlyProps
            );
            assert_eq!(scope.assign("mine", Value::Int(1)), Assign::State);
            VNode::text(format!("{}:{}", scope.get("fixed"), scope.get("mine")))
        })
        .share();

    renderer
        .render(
            Some(VNode::component(def, Some(vmap! { "fixed" => 5 }))),
            container,
        )
        .expect("mounts");
    // The prop write was ignored, the state write stuck.
    let instance = renderer.root_instance(container).expect("instance");
    assert_eq!(instance.props.get("fixed"), Some(Value::Int(5)));
    assert_eq!(instance.state.get("mine"), Some(Value::Int(1)));
}

#[test]
fn test_component_update_propagates_changed_props_only() {
    let (renderer, container) = renderer();
    let badge_renders = Rc::new(Cell::new(0usize));

    let counting = badge_renders.clone();
    let badge = ComponentDef::new("badge")
        .prop("label")
        .render(move |scope: &dyn Scope| {
            counting.set(counting.get() + 1);
            VNode::element("p", None, Children::from(scope.get("label").to_string()))
        })
        .share();

    let child = badge.clone();
    let parent = ComponentDef::new("parent")
        .data(|| vmap! { "label" => "x", "tick" => 0 })
        .render(move |scope: &dyn Scope| {
            VNode::element(
                "div",
                Some(vmap! { "data-tick" => scope.get("tick") }),
                Children::Nodes(vec![VNode::component(
                    child.clone(),
                    Some(vmap! { "label" => scope.get("label") }),
                )]),
            )
        })
        .share();

    renderer
        .render(Some(VNode::component(parent, None)), container)
        .expect("mounts");
    assert_eq!(badge_renders.get(), 1);
    let parent_instance = renderer.root_instance(container).expect("instance");
    let p = HostId(3);
    assert_eq!(
        renderer.with_host(|host| host.text_of(p).map(str::to_owned)),
        Some(String::from("x"))
    );

    // A changed declared prop re-renders the child exactly once.
    parent_instance.state.insert("label", Value::from("y"));
    assert_eq!(badge_renders.get(), 2);
    assert_eq!(
        renderer.with_host(|host| host.text_of(p).map(str::to_owned)),
        Some(String::from("y"))
    );

    // A parent re-render that leaves the child's props equal does not
    // touch the child: the instance survives, the effect stays quiet.
    parent_instance.state.insert("tick", Value::Int(1));
    assert_eq!(badge_renders.get(), 2);
}

#[test]
fn test_unmounted_component_effects_are_stopped() {
    let (renderer, container) = renderer();
    renderer
        .render(Some(VNode::component(counter_def(), None)), container)
        .expect("mounts");
    let instance = renderer.root_instance(container).expect("instance");
    renderer.with_host_mut(|host| host.clear_ops());

    renderer.render(None, container).expect("unmounts");
    let ops = renderer.with_host(|host| host.ops().to_vec());
    assert_eq!(ops, vec![HostOp::Remove { node: HostId(2) }]);
    assert!(!instance.is_mounted.get());
    renderer.with_host_mut(|host| host.clear_ops());

    // The render effect is disposed: state writes trigger nothing.
    instance.state.insert("count", Value::Int(99));
    assert!(renderer.with_host(|host| host.ops().is_empty()));
}

#[test]
fn test_mount_op_sequence_snapshot() {
    let (renderer, container) = renderer();
    renderer
        .render(Some(VNode::comment("boundary")), container)
        .expect("mounts");
    let ops = renderer.with_host(|host| host.ops().to_vec());
    insta::assert_debug_snapshot!(ops, @r###"
    [
        CreateComment {
            id: HostId(
                2,
            ),
            text: "boundary",
        },
        Insert {
            node: HostId(
                2,
            ),
            parent: HostId(
                1,
            ),
            anchor: None,
        },
    ]
    "###);
}

#[test]
fn test_mounted_tree_dump_snapshot() {
    let (renderer, container) = renderer();
    renderer
        .render(
            Some(VNode::element(
                "div",
                Some(vmap! { "id" => "app", "class" => "panel" }),
                Children::Nodes(vec![
                    VNode::element("span", None, Children::from("hello")),
                    VNode::comment("sep"),
                    VNode::text("tail"),
                ]),
            )),
            container,
        )
        .expect("mounts");
    let dump = renderer.with_host(|host| host.dump(container));
    insta::assert_snapshot!(dump.trim_end(), @r###"
    #container
      <div class="panel" id="app">
        <span>
          "hello"
        <!-- sep -->
        "tail"
    "###);
}
