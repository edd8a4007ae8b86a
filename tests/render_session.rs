//! End-to-end behaviour of a render session against the memory host.
//!
//! Covers the build/commit cycle, reconciliation outcomes, hook state,
//! cancellation and failure handling.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use spark_fiber::*;

// =============================================================================
// HELPERS
// =============================================================================

fn session() -> (RenderSession<MemoryHost>, HostId) {
    let session = RenderSession::new(MemoryHost::new(), Config::default());
    let container = session.host().container();
    (session, container)
}

/// `div > {tag}[title=foo] > "Hello"`
fn hello(tag: &str) -> Element {
    element!("div", props! {}, element!(tag, props! { "title" => "foo" }, "Hello").unwrap()).unwrap()
}

type SetterSlot = Rc<RefCell<Option<StateSetter<i64>>>>;

/// A counter component that leaks its setter for the test to call.
fn counter() -> (Component, SetterSlot) {
    let slot: SetterSlot = Rc::new(RefCell::new(None));
    let captured = slot.clone();
    let component = Component::new("Counter", move |hooks, _props, _children| {
        let (count, set_count) = hooks.use_state(0i64)?;
        *captured.borrow_mut() = Some(set_count);
        Ok(element!("span", props! {}, count)?)
    });
    (component, slot)
}

fn setter(slot: &SetterSlot) -> StateSetter<i64> {
    slot.borrow().clone().expect("counter rendered")
}

fn first_child(session: &RenderSession<MemoryHost>, id: FiberId) -> FiberId {
    session.fiber(id).and_then(|f| f.child).expect("fiber has a child")
}

// =============================================================================
// MOUNT
// =============================================================================

#[test]
fn test_first_render_places_nested_tree() {
    let (mut session, container) = session();

    session.render(hello("h1"), container);
    let stats = session.flush_sync().unwrap().unwrap();

    assert_eq!(session.host().to_markup(container), r#"<div><h1 title="foo">Hello</h1></div>"#);
    assert_eq!(stats.placed, 3);
    assert_eq!(stats.removed, 0);

    // Appends run parent first
    let appends: Vec<HostOp> = session
        .host()
        .ops()
        .iter()
        .filter(|op| matches!(op, HostOp::Append { .. }))
        .cloned()
        .collect();
    assert_eq!(appends.len(), 3);
    assert!(matches!(appends[0], HostOp::Append { parent, .. } if parent == container));
}

#[test]
fn test_arena_holds_only_committed_tree() {
    let (mut session, container) = session();

    for _ in 0..5 {
        session.render(hello("h1"), container);
        session.flush_sync().unwrap();
    }

    // root, div, h1, text
    assert_eq!(session.arena().len(), 4);
    let root = session.current_root().unwrap();
    assert_eq!(session.fiber(root).unwrap().alternate, None);
}

// =============================================================================
// RECONCILIATION
// =============================================================================

#[test]
fn test_replacing_child_type_places_and_deletes() {
    let (mut session, container) = session();
    session.render(hello("h1"), container);
    session.flush_sync().unwrap();
    let old_div = first_child(&session, session.current_root().unwrap());
    let old_h1 = first_child(&session, old_div);

    session.render(hello("h2"), container);
    assert_eq!(session.perform_work(&Unbounded).unwrap(), WorkStatus::BuildComplete);

    let wip = session.work_in_progress().unwrap();
    let div = first_child(&session, wip);
    let h2 = first_child(&session, div);
    assert_eq!(session.fiber(div).unwrap().effect, EffectTag::Update);
    assert_eq!(session.fiber(div).unwrap().alternate, Some(old_div));
    assert_eq!(session.fiber(h2).unwrap().effect, EffectTag::Place);
    assert_eq!(session.pending_deletions(), &[old_h1]);

    let stats = session.commit().unwrap();
    assert_eq!(session.host().to_markup(container), r#"<div><h2 title="foo">Hello</h2></div>"#);
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.placed, 2);
    assert_eq!(stats.unchanged, 1);
    assert!(session.pending_deletions().is_empty());
}

#[test]
fn test_same_type_reuses_host_node() {
    let (mut session, container) = session();
    session.render(hello("h1"), container);
    session.flush_sync().unwrap();
    let old_div = first_child(&session, session.current_root().unwrap());
    let old_host = session.fiber(old_div).unwrap().host;

    let changed = element!("div", props! { "width" => 10 }, element!("h1", props! { "title" => "foo" }, "Hello").unwrap()).unwrap();
    session.render(changed, container);
    session.perform_work(&Unbounded).unwrap();

    let div = first_child(&session, session.work_in_progress().unwrap());
    assert_eq!(session.fiber(div).unwrap().effect, EffectTag::Update);
    assert_eq!(session.fiber(div).unwrap().host, old_host);

    let stats = session.commit().unwrap();
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.placed, 0);
    assert_eq!(
        session.host().to_markup(container),
        r#"<div width="10"><h1 title="foo">Hello</h1></div>"#
    );
}

#[test]
fn test_identical_render_changes_nothing() {
    let (mut session, container) = session();
    session.render(hello("h1"), container);
    session.flush_sync().unwrap();
    session.host_mut().take_ops();

    session.render(hello("h1"), container);
    session.perform_work(&Unbounded).unwrap();

    let wip = session.work_in_progress().unwrap();
    let mut stack = session.children(wip);
    while let Some(id) = stack.pop() {
        assert_eq!(session.fiber(id).unwrap().effect, EffectTag::Update);
        stack.extend(session.children(id));
    }

    let stats = session.commit().unwrap();
    assert_eq!(stats.mutations(), 0);
    assert_eq!(stats.unchanged, 3);
    assert!(session.host().ops().is_empty());
}

#[test]
fn test_changed_listener_is_swapped() {
    let (mut session, container) = session();
    let tree = |cb: Callback| element!("button", props! { "onClick" => cb }, "go").unwrap();

    session.render(tree(Callback::new(|_| {})), container);
    session.flush_sync().unwrap();
    session.host_mut().take_ops();

    session.render(tree(Callback::new(|_| {})), container);
    let stats = session.flush_sync().unwrap().unwrap();

    assert_eq!(stats.updated, 1);
    // One listener removed, one added
    assert!(matches!(session.host().ops(), [HostOp::Update { changes: 2, .. }]));
}

#[test]
fn test_shrinking_list_removes_tail() {
    let (mut session, container) = session();
    let list = |n: usize| {
        let items: Vec<Element> = (0..n).map(|i| element!("li", props! {}, i).unwrap()).collect();
        element!("ul", props! {}, items).unwrap()
    };

    session.render(list(3), container);
    session.flush_sync().unwrap();
    session.render(list(1), container);
    let stats = session.flush_sync().unwrap().unwrap();

    assert_eq!(stats.removed, 2);
    assert_eq!(session.host().to_markup(container), "<ul><li>0</li></ul>");
}

#[test]
fn test_component_replaced_by_host_element() {
    let (mut session, container) = session();
    let (component, _slot) = counter();
    session.render(element!("div", props! {}, element!(component).unwrap()).unwrap(), container);
    session.flush_sync().unwrap();
    let old_div = first_child(&session, session.current_root().unwrap());
    let old_counter = first_child(&session, old_div);
    assert!(session.fiber(old_counter).unwrap().host.is_none());

    session.render(element!("div", props! {}, element!("p", props! {}, "x").unwrap()).unwrap(), container);
    session.perform_work(&Unbounded).unwrap();
    assert_eq!(session.pending_deletions(), &[old_counter]);

    // The component owns no host node; its span goes instead
    let stats = session.commit().unwrap();
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.placed, 2);
    assert_eq!(session.host().to_markup(container), "<div><p>x</p></div>");
    assert!(session.host().find("span").is_none());
}

#[test]
fn test_shrinking_component_list_removes_their_hosts() {
    let (mut session, container) = session();
    let item = Component::new("Item", |_hooks, props, _children| {
        let n = props.get("n").and_then(Value::as_i64).unwrap_or_default();
        Ok(element!("li", props! {}, element!("b", props! {}, n)?)?)
    });
    let list = |n: i64| {
        let items: Vec<Element> = (0..n)
            .map(|i| element!(item.clone(), props! { "n" => i }).unwrap())
            .collect();
        element!("ul", props! {}, items).unwrap()
    };

    session.render(list(3), container);
    session.flush_sync().unwrap();
    assert_eq!(
        session.host().to_markup(container),
        "<ul><li><b>0</b></li><li><b>1</b></li><li><b>2</b></li></ul>"
    );

    session.render(list(1), container);
    let stats = session.flush_sync().unwrap().unwrap();

    // One removal per component: the nearest host node, not its descendants
    assert_eq!(stats.removed, 2);
    assert_eq!(stats.placed, 0);
    assert_eq!(session.host().to_markup(container), "<ul><li><b>0</b></li></ul>");
}

#[test]
fn test_fn_pointer_components_swap_by_name() {
    type Render = fn(&mut Hooks, &Props, &[Element]) -> Result<Element, ComponentError>;
    fn render_a(hooks: &mut Hooks, _props: &Props, _children: &[Element]) -> Result<Element, ComponentError> {
        let (n, _) = hooks.use_state(1i64)?;
        Ok(element!("a", props! {}, n)?)
    }
    fn render_b(hooks: &mut Hooks, _props: &Props, _children: &[Element]) -> Result<Element, ComponentError> {
        let (label, _) = hooks.use_state(String::from("x"))?;
        Ok(element!("b", props! {}, label)?)
    }
    let a = Component::new("A", render_a as Render);
    let b = Component::new("B", render_b as Render);

    let (mut session, container) = session();
    session.render(element!(a).unwrap(), container);
    session.flush_sync().unwrap();
    let old = first_child(&session, session.current_root().unwrap());

    session.render(element!(b).unwrap(), container);
    session.perform_work(&Unbounded).unwrap();
    let swapped = first_child(&session, session.work_in_progress().unwrap());
    assert_eq!(session.fiber(swapped).unwrap().effect, EffectTag::Place);
    assert_eq!(session.pending_deletions(), &[old]);

    session.commit().unwrap();
    assert_eq!(session.host().to_markup(container), "<b>x</b>");
}

#[test]
fn test_wrapper_component_renders_its_children() {
    let (mut session, container) = session();
    let wrapper = Component::new("Wrapper", |_hooks, props, children| {
        Ok(element!("section", props.clone(), children.to_vec())?)
    });
    let tree = |text: &str| {
        element!(
            wrapper.clone(),
            props! { "title" => "w" },
            element!("p", props! {}, text).unwrap()
        )
        .unwrap()
    };

    session.render(tree("child"), container);
    session.flush_sync().unwrap();
    assert_eq!(session.host().to_markup(container), r#"<section title="w"><p>child</p></section>"#);

    session.render(tree("other"), container);
    let stats = session.flush_sync().unwrap().unwrap();
    assert_eq!(stats.updated, 1);
    assert_eq!(session.host().to_markup(container), r#"<section title="w"><p>other</p></section>"#);
}

// =============================================================================
// SCHEDULING
// =============================================================================

#[test]
fn test_no_host_mutation_before_commit() {
    let (mut session, container) = session();
    session.render(hello("h1"), container);

    assert_eq!(session.perform_work(&StepBudget::new(1)).unwrap(), WorkStatus::Yielded);
    assert!(session.next_unit().is_some());
    assert_eq!(session.host().mutation_count(), 0);

    assert_eq!(session.perform_work(&StepBudget::new(2)).unwrap(), WorkStatus::Yielded);
    assert_eq!(session.host().mutation_count(), 0);

    assert_eq!(session.perform_work(&Unbounded).unwrap(), WorkStatus::BuildComplete);
    // Detached nodes exist, nothing is attached yet
    assert!(!session.host().ops().is_empty());
    assert_eq!(session.host().mutation_count(), 0);
    assert_eq!(session.host().to_markup(container), "");

    session.commit().unwrap();
    assert_eq!(session.host().mutation_count(), 3);
}

#[test]
fn test_commit_requires_finished_build() {
    let (mut session, container) = session();
    assert!(matches!(session.commit(), Err(EngineError::NothingToCommit)));

    session.render(hello("h1"), container);
    session.perform_work(&StepBudget::new(1)).unwrap();
    assert!(matches!(session.commit(), Err(EngineError::NothingToCommit)));
}

#[test]
fn test_newer_build_replaces_unfinished_one() {
    let (mut session, container) = session();
    session.render(hello("h1"), container);
    session.perform_work(&StepBudget::new(3)).unwrap();

    session.render(hello("section"), container);
    session.flush_sync().unwrap();

    assert_eq!(
        session.host().to_markup(container),
        r#"<div><section title="foo">Hello</section></div>"#
    );
    assert_eq!(session.arena().len(), 4);
}

#[test]
fn test_superseded_builds_release_their_nodes() {
    let (mut session, container) = session();
    for _ in 0..50 {
        session.render(hello("h1"), container);
        assert_eq!(session.perform_work(&Unbounded).unwrap(), WorkStatus::BuildComplete);
    }
    session.render(hello("h1"), container);
    session.flush_sync().unwrap();

    // container, div, h1, text
    assert_eq!(session.host().allocated_nodes(), 4);
    let released = session
        .host()
        .ops()
        .iter()
        .filter(|op| matches!(op, HostOp::Release { .. }))
        .count();
    assert_eq!(released, 50 * 3);
}

#[test]
fn test_superseded_builds_do_not_grow_layout_tree() {
    let host = TerminalHost::new(TerminalConfig::new(20, 4)).unwrap();
    let mut session = RenderSession::new(host, Config::default());
    let container = session.host().container();

    for _ in 0..50 {
        session.render(hello("h1"), container);
        session.perform_work(&Unbounded).unwrap();
    }
    session.render(hello("h1"), container);
    session.flush_sync().unwrap();

    assert_eq!(session.host().node_count(), 3);
    assert_eq!(session.host().allocated_nodes(), 4);
}

#[test]
fn test_run_until_idle_with_tiny_slices() {
    let (mut session, container) = session();
    session.render(hello("h1"), container);

    let stats = run_until_idle(&mut session, Duration::ZERO).unwrap().unwrap();

    assert_eq!(stats.placed, 3);
    assert!(!session.has_pending_work());
    assert_eq!(session.work_loop(&Unbounded).unwrap(), WorkStatus::Idle);
}

// =============================================================================
// HOOKS
// =============================================================================

#[test]
fn test_two_updates_apply_in_order() {
    let (mut session, container) = session();
    let (component, slot) = counter();
    session.render(element!(component).unwrap(), container);
    session.flush_sync().unwrap();
    assert_eq!(session.host().to_markup(container), "<span>0</span>");

    let set_count = setter(&slot);
    set_count.update(|c| c + 1);
    set_count.update(|c| c + 1);
    assert!(session.has_pending_work());

    // Both requests are served by one build
    assert!(matches!(session.work_loop(&Unbounded).unwrap(), WorkStatus::Committed(_)));
    assert_eq!(session.work_loop(&Unbounded).unwrap(), WorkStatus::Idle);
    assert_eq!(session.host().to_markup(container), "<span>2</span>");
}

#[test]
fn test_listener_drives_state() {
    let (mut session, container) = session();
    let app = Component::new("Clicker", |hooks, _props, _children| {
        let (clicks, set_clicks) = hooks.use_state(0i64)?;
        let on_click = Callback::new(move |_| set_clicks.update(|c| c + 1));
        Ok(element!("button", props! { "onClick" => on_click }, clicks)?)
    });
    session.render(element!(app).unwrap(), container);
    session.flush_sync().unwrap();

    let button = session.host().find("button").unwrap();
    assert!(session.host().dispatch(button, "onClick", &Value::Null));
    assert!(session.host().dispatch(button, "onClick", &Value::Null));
    session.flush_sync().unwrap();

    assert_eq!(session.host().to_markup(container), "<button>2</button>");
}

#[test]
fn test_stale_setter_still_updates() {
    let (mut session, container) = session();
    let (component, slot) = counter();
    session.render(element!(component.clone()).unwrap(), container);
    session.flush_sync().unwrap();
    let first_setter = setter(&slot);

    // Re-render so the component gets a fresh setter
    session.render(element!(component).unwrap(), container);
    session.flush_sync().unwrap();

    first_setter.set(41);
    session.flush_sync().unwrap();
    assert_eq!(session.host().to_markup(container), "<span>41</span>");
}

#[test]
fn test_update_before_first_commit_waits() {
    let (mut session, container) = session();
    let (component, slot) = counter();
    session.render(element!(component).unwrap(), container);

    // root, then the counter itself
    session.perform_work(&StepBudget::new(2)).unwrap();
    setter(&slot).update(|c| c + 1);
    assert!(!session.host().ops().iter().any(HostOp::is_mutation));

    let stats = session.flush_sync().unwrap();
    assert!(stats.is_some());
    assert_eq!(session.host().to_markup(container), "<span>1</span>");
}

#[test]
fn test_state_change_restart_keeps_newest_children() {
    let (mut session, container) = session();
    let (component, slot) = counter();
    session.render(element!("div", props! {}, element!(component.clone()).unwrap()).unwrap(), container);
    session.flush_sync().unwrap();

    let bigger = element!(
        "div",
        props! {},
        element!(component).unwrap(),
        element!("p", props! {}, "more").unwrap()
    )
    .unwrap();
    session.render(bigger, container);
    session.perform_work(&StepBudget::new(1)).unwrap();

    setter(&slot).update(|c| c + 10);
    session.flush_sync().unwrap();

    assert_eq!(session.host().to_markup(container), "<div><span>10</span><p>more</p></div>");
}

#[test]
fn test_components_keep_state_across_parent_renders() {
    let (mut session, container) = session();
    let (component, slot) = counter();
    let tree = |c: &Component, label: &str| {
        element!("div", props! { "label" => label }, element!(c.clone()).unwrap()).unwrap()
    };

    session.render(tree(&component, "a"), container);
    session.flush_sync().unwrap();
    setter(&slot).set(5);
    session.flush_sync().unwrap();

    session.render(tree(&component, "b"), container);
    session.flush_sync().unwrap();
    assert_eq!(session.host().to_markup(container), r#"<div label="b"><span>5</span></div>"#);
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn test_component_error_keeps_committed_tree() {
    let (mut session, container) = session();
    let fail = Rc::new(Cell::new(false));
    let flag = fail.clone();
    let flaky = Component::new("Flaky", move |_hooks, _props, _children| {
        if flag.get() {
            return Err(ComponentError::msg("boom"));
        }
        Ok(element!("p", props! {}, "ok")?)
    });

    session.render(element!(flaky.clone()).unwrap(), container);
    session.flush_sync().unwrap();
    let committed = session.current_root();
    let mutations = session.host().mutation_count();

    fail.set(true);
    session.render(element!(flaky).unwrap(), container);
    let err = session.flush_sync().unwrap_err();

    assert!(matches!(err, EngineError::Render { component: "Flaky", .. }));
    assert_eq!(session.current_root(), committed);
    assert_eq!(session.work_in_progress(), None);
    assert_eq!(session.next_unit(), None);
    assert!(session.pending_deletions().is_empty());
    assert_eq!(session.host().mutation_count(), mutations);
    assert_eq!(session.host().to_markup(container), "<p>ok</p>");
}

#[test]
fn test_failed_build_releases_created_nodes() {
    let (mut session, container) = session();
    let fail = Rc::new(Cell::new(false));
    let flag = fail.clone();
    let flaky = Component::new("Flaky", move |_hooks, _props, _children| {
        if flag.get() {
            return Err(ComponentError::msg("boom"));
        }
        Ok(element!("p", props! {}, "ok")?)
    });
    let tree = |tag: &str| {
        element!(
            "div",
            props! {},
            element!(tag, props! {}, "head").unwrap(),
            element!(flaky.clone()).unwrap()
        )
        .unwrap()
    };

    session.render(tree("h1"), container);
    session.flush_sync().unwrap();
    let nodes = session.host().allocated_nodes();

    // h2 and its text get created before the component fails
    fail.set(true);
    session.render(tree("h2"), container);
    assert!(session.flush_sync().is_err());

    assert_eq!(session.host().allocated_nodes(), nodes);
    assert_eq!(session.host().to_markup(container), "<div><h1>head</h1><p>ok</p></div>");
}

#[test]
fn test_hook_order_change_is_reported() {
    let (mut session, container) = session();
    let as_text = Rc::new(Cell::new(false));
    let flag = as_text.clone();
    let shifty = Component::new("Shifty", move |hooks, _props, _children| {
        if flag.get() {
            let (label, _) = hooks.use_state(String::from("x"))?;
            return Ok(element!("span", props! {}, label)?);
        }
        let (n, _) = hooks.use_state(1i64)?;
        Ok(element!("span", props! {}, n)?)
    });

    session.render(element!(shifty.clone()).unwrap(), container);
    session.flush_sync().unwrap();

    as_text.set(true);
    session.render(element!(shifty).unwrap(), container);
    let err = session.flush_sync().unwrap_err();

    assert!(matches!(
        err,
        EngineError::Render {
            source: ComponentError::Hook(HookError::TypeMismatch { index: 0, .. }),
            ..
        }
    ));
}

#[test]
fn test_host_create_failure_aborts_build() {
    let (mut session, container) = session();
    session.host_mut().fail_on(HostOpKind::Create);
    session.render(hello("h1"), container);

    let err = session.flush_sync().unwrap_err();
    assert!(matches!(err, EngineError::Host(_)));
    assert_eq!(session.current_root(), None);
    assert_eq!(session.work_in_progress(), None);
    assert!(session.arena().is_empty());
}

#[test]
fn test_partial_commit_keeps_previous_generation() {
    let (mut session, container) = session();
    session.render(hello("h1"), container);
    session.flush_sync().unwrap();
    let committed = session.current_root();

    session.host_mut().fail_on(HostOpKind::Append);
    session.render(hello("h2"), container);
    let err = session.flush_sync().unwrap_err();

    assert!(matches!(err, EngineError::CommitPartiallyApplied(HostError { op: HostOpKind::Append, .. })));
    assert_eq!(session.current_root(), committed);
    assert_eq!(session.work_in_progress(), None);
    // The deletion ran before the failing append; no rollback
    assert_eq!(session.host().to_markup(container), "<div></div>");
}

#[test]
fn test_failed_commit_keeps_state_actions() {
    let (mut session, container) = session();
    let (component, slot) = counter();
    session.render(element!(component.clone()).unwrap(), container);
    session.flush_sync().unwrap();

    setter(&slot).update(|c| c + 1);
    session.host_mut().fail_on(HostOpKind::Update);
    assert!(session.flush_sync().is_err());

    let root = session.current_root().unwrap();
    let committed_counter = first_child(&session, root);
    assert_eq!(session.fiber(committed_counter).unwrap().hooks[0].pending(), 1);

    // Applied exactly once by the next successful build
    session.render(element!(component).unwrap(), container);
    session.flush_sync().unwrap();
    assert_eq!(session.host().to_markup(container), "<span>1</span>");
}

// =============================================================================
// UNMOUNT
// =============================================================================

#[test]
fn test_unmount_removes_everything() {
    let (mut session, container) = session();
    assert!(matches!(session.unmount(), Err(EngineError::NotMounted)));

    session.render(hello("h1"), container);
    session.flush_sync().unwrap();

    let stats = session.unmount().unwrap();
    assert_eq!(stats.removed, 1);
    assert_eq!(session.host().to_markup(container), "");
    assert_eq!(session.arena().len(), 1);
}
