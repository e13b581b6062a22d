// Tests for expand/collapse state, layout and transition plans

use sitetree_core::config::{InitialExpansion, LayoutConfig, Pace};
use sitetree_core::measure::FixedAdvance;
use sitetree_core::layout::Point;
use sitetree_core::render::RenderState;
use sitetree_core::transition::LinkPath;
use sitetree_core::tree::{NodeId, build_tree};
use std::collections::{HashMap, HashSet};

fn render(urls: &[&str], expansion: InitialExpansion) -> RenderState {
    let tree = build_tree(urls).unwrap();
    let config = LayoutConfig::default().with_initial_expansion(expansion);
    RenderState::initialize(tree, config, &FixedAdvance::default()).0
}

fn positions(state: &RenderState) -> HashMap<NodeId, (f64, f64)> {
    state
        .visible_nodes()
        .iter()
        .map(|n| (n.id, (n.x, n.y)))
        .collect()
}

const SITE: &[&str] = &[
    "https://ex.com/docs/guide/intro",
    "https://ex.com/docs/guide/setup",
    "https://ex.com/docs/api",
    "https://ex.com/blog/2024/post-1",
    "https://ex.com/blog/2024/post-2",
    "https://ex.com/about",
];

// ============================================================================
// Toggle Tests
// ============================================================================

#[test]
fn test_toggle_twice_restores_layout() {
    let state = render(SITE, InitialExpansion::default());
    let docs = state.tree().find_by_url("https://ex.com/docs").unwrap();

    let (open, _) = state.toggle(docs, Pace::Normal).unwrap();
    let (closed, _) = open.toggle(docs, Pace::Normal).unwrap();

    assert_eq!(positions(&closed), positions(&state));
    assert_eq!(
        closed.visible_ids().collect::<Vec<_>>(),
        state.visible_ids().collect::<Vec<_>>()
    );
}

#[test]
fn test_collapse_preserves_descendants() {
    let state = render(&["https://ex.com/a/b/c", "https://ex.com/a/d"], InitialExpansion::All);
    let a = state.tree().find_by_url("https://ex.com/a").unwrap();
    assert_eq!(state.visible_nodes().len(), 5);

    let (collapsed, _) = state.toggle(a, Pace::Normal).unwrap();
    assert_eq!(collapsed.visible_nodes().len(), 2);
    assert_eq!(collapsed.tree().len(), 5);

    let (reopened, _) = collapsed.toggle(a, Pace::Normal).unwrap();
    assert_eq!(reopened.visible_nodes().len(), 5);
}

#[test]
fn test_reexpanding_restores_sub_expansion() {
    let state = render(SITE, InitialExpansion::All);
    let docs = state.tree().find_by_url("https://ex.com/docs").unwrap();
    let guide = state.tree().find_by_url("https://ex.com/docs/guide").unwrap();
    let intro = state.tree().find_by_url("https://ex.com/docs/guide/intro").unwrap();

    let (guide_closed, _) = state.toggle(guide, Pace::Normal).unwrap();
    let (docs_closed, _) = guide_closed.toggle(docs, Pace::Normal).unwrap();
    let (docs_open, _) = docs_closed.toggle(docs, Pace::Normal).unwrap();

    assert!(docs_open.is_visible(guide));
    assert!(!docs_open.is_expanded(guide));
    assert!(!docs_open.is_visible(intro));
}

#[test]
fn test_toggle_leaves_old_state_untouched() {
    let state = render(SITE, InitialExpansion::default());
    let before = positions(&state);
    let blog = state.tree().find_by_url("https://ex.com/blog").unwrap();

    let _ = state.toggle(blog, Pace::Slow).unwrap();
    assert_eq!(positions(&state), before);
    assert!(!state.is_expanded(blog));
}

// ============================================================================
// Layout Tests
// ============================================================================

#[test]
fn test_siblings_never_overlap() {
    let state = render(SITE, InitialExpansion::All);
    let spacing = state.config().node_spacing;

    let mut by_depth: HashMap<usize, Vec<f64>> = HashMap::new();
    for node in state.visible_nodes() {
        by_depth.entry(node.depth).or_default().push(node.x);
    }
    for xs in by_depth.values_mut() {
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= spacing - 1e-9);
        }
    }
}

#[test]
fn test_parent_centred_over_children() {
    let state = render(SITE, InitialExpansion::All);
    for node in state.visible_nodes() {
        let children = state.tree().children(node.id);
        if children.is_empty() {
            continue;
        }
        let first = state.layout_node(children[0]).unwrap().x;
        let last = state.layout_node(children[children.len() - 1]).unwrap().x;
        assert!((node.x - (first + last) / 2.0).abs() < 1e-9);
    }
}

#[test]
fn test_depth_axis_uses_depth_spacing() {
    let state = render(SITE, InitialExpansion::All);
    let spacing = state.config().depth_spacing;
    for node in state.visible_nodes() {
        assert_eq!(node.y, node.depth as f64 * spacing);
    }
}

#[test]
fn test_root_at_origin() {
    let state = render(SITE, InitialExpansion::All);
    let root = state.layout_node(NodeId::ROOT).unwrap();
    assert_eq!((root.x, root.y), (0.0, 0.0));
}

// ============================================================================
// Transition Plan Tests
// ============================================================================

#[test]
fn test_plan_groups_partition_old_and_new() {
    let state = render(SITE, InitialExpansion::default());
    let docs = state.tree().find_by_url("https://ex.com/docs").unwrap();
    let (next, plan) = state.toggle(docs, Pace::Normal).unwrap();

    let entering: HashSet<_> = plan.entering.iter().map(|m| m.id).collect();
    let updating: HashSet<_> = plan.updating.iter().map(|m| m.id).collect();
    let exiting: HashSet<_> = plan.exiting.iter().map(|m| m.id).collect();

    let old: HashSet<_> = state.visible_ids().collect();
    let new: HashSet<_> = next.visible_ids().collect();

    assert_eq!(entering, &new - &old);
    assert_eq!(updating, &new & &old);
    assert_eq!(exiting, &old - &new);
}

#[test]
fn test_links_keyed_by_target() {
    let state = render(SITE, InitialExpansion::All);
    let blog = state.tree().find_by_url("https://ex.com/blog").unwrap();
    let (next, plan) = state.toggle(blog, Pace::Normal).unwrap();

    let exiting_targets: HashSet<_> = plan.links_exiting.iter().map(|l| l.target).collect();
    let exiting_nodes: HashSet<_> = plan.exiting.iter().map(|m| m.id).collect();
    assert_eq!(exiting_targets, exiting_nodes);

    let kept = plan.links_updating.len() + plan.links_entering.len();
    assert_eq!(kept, next.visible_nodes().len() - 1);
}

#[test]
fn test_links_run_from_parent_offset_to_child_inset() {
    let state = render(SITE, InitialExpansion::default());
    let docs = state.tree().find_by_url("https://ex.com/docs").unwrap();
    let (next, plan) = state.toggle(docs, Pace::Normal).unwrap();
    let inset = next.config().target_inset;

    assert!(!plan.links_entering.is_empty());
    assert!(!plan.links_updating.is_empty());
    for link in plan.links_entering.iter().chain(&plan.links_updating) {
        let parent = next.layout_node(link.source).unwrap();
        let child = next.layout_node(link.target).unwrap();
        assert!(parent.link_offset > 0.0);
        assert_eq!(link.to.source, Point::new(parent.x, parent.y + parent.link_offset));
        assert_eq!(link.to.target, Point::new(child.x, child.y - inset));
    }
}

#[test]
fn test_exiting_links_collapse_into_trigger_new_position() {
    // Cousins b3 and d1 push the two branches apart; collapsing `a` lets
    // them close up, so the trigger moves.
    let state = render(
        &[
            "https://ex.com/a/b1",
            "https://ex.com/a/b2",
            "https://ex.com/a/b3",
            "https://ex.com/c/d1",
            "https://ex.com/c/d2",
            "https://ex.com/c/d3",
        ],
        InitialExpansion::All,
    );
    let a = state.tree().find_by_url("https://ex.com/a").unwrap();
    let (next, plan) = state.toggle(a, Pace::Normal).unwrap();
    let inset = next.config().target_inset;

    let trigger_old = state.layout_node(a).unwrap().position();
    let trigger_new = next.layout_node(a).unwrap().position();
    assert_ne!(trigger_old, trigger_new);

    assert_eq!(plan.links_exiting.len(), 3);
    for link in &plan.links_exiting {
        assert_eq!(link.to, LinkPath::collapsed(trigger_new, inset));
        let parent = state.layout_node(link.source).unwrap();
        assert_eq!(link.from.source, Point::new(parent.x, parent.y + parent.link_offset));
    }
}

#[test]
fn test_link_source_follows_label_width() {
    let state = render(
        &["https://ex.com/a/x", "https://ex.com/much-longer/y"],
        InitialExpansion::All,
    );
    let short = state.tree().find_by_url("https://ex.com/a").unwrap();
    let long = state.tree().find_by_url("https://ex.com/much-longer").unwrap();
    let x = state.tree().find_by_url("https://ex.com/a/x").unwrap();
    let y = state.tree().find_by_url("https://ex.com/much-longer/y").unwrap();

    let from_short = state.link_path(x).unwrap().source;
    let from_long = state.link_path(y).unwrap().source;
    assert_eq!(state.layout_node(short).unwrap().y, state.layout_node(long).unwrap().y);
    assert!(from_long.y > from_short.y);
}

#[test]
fn test_slow_pace_lengthens_plan() {
    let state = render(SITE, InitialExpansion::default());
    let docs = state.tree().find_by_url("https://ex.com/docs").unwrap();

    let (_, normal) = state.toggle(docs, Pace::Normal).unwrap();
    let (_, slow) = state.toggle(docs, Pace::Slow).unwrap();
    assert!(slow.duration > normal.duration);
    assert_eq!(slow.duration, state.config().slow_duration);
}
