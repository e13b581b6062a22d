//! Tidy tree layout (Reingold-Tilford, in the linear-time formulation of
//! Buchheim, Jünger and Leipert).
//!
//! Only the visible part of a [`SiteTree`] is laid out: a node's children take
//! part only while the node is expanded. Each visible node gets a breadth
//! coordinate `x` in multiples of `node_spacing` and a depth coordinate
//! `y = depth * depth_spacing`. The root sits at `(0, 0)`.
//!
//! Siblings are kept one slot apart, cousins two.
//!
//! 1. **First walk (post-order):** assign preliminary breadth positions,
//!    pushing each subtree right until its left contour clears the right
//!    contour of the subtrees before it. Threads make contour walks O(1).
//! 2. **Second walk (pre-order):** accumulate modifiers into final positions.

use crate::tree::{NodeId, SiteTree};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

/// Positions of every node in the visible set.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyLayout {
    /// Visible nodes in pre-order.
    pub order: Vec<NodeId>,
    pub positions: HashMap<NodeId, Point>,
}

impl TidyLayout {
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.positions.get(&id).copied()
    }
}

/// Per-node scratch state of the algorithm.
#[derive(Debug)]
struct TidyNode {
    id: NodeId,
    depth: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Index among siblings.
    number: usize,
    /// Preliminary breadth.
    prelim: f64,
    /// Shift applied to the whole subtree in the second walk.
    modifier: f64,
    shift: f64,
    change: f64,
    thread: Option<usize>,
    ancestor: usize,
    /// Default ancestor handed to the next child's apportion step.
    default_ancestor: Option<usize>,
}

/// Lay out the nodes for which every ancestor satisfies `expanded`.
pub fn tidy_layout<F>(tree: &SiteTree, node_spacing: f64, depth_spacing: f64, expanded: F) -> TidyLayout
where
    F: Fn(NodeId) -> bool,
{
    let mut nodes = collect_visible(tree, &expanded);

    first_walk(0, &mut nodes);

    let mut final_x = vec![0.0; nodes.len()];
    // Shift so the root lands on zero.
    nodes[0].modifier -= nodes[0].prelim;
    final_x[0] = 0.0;
    for v in 0..nodes.len() {
        if let Some(p) = nodes[v].parent {
            final_x[v] = nodes[v].prelim + nodes[p].modifier;
            nodes[v].modifier += nodes[p].modifier;
        }
    }

    let mut positions = HashMap::with_capacity(nodes.len());
    let mut order = Vec::with_capacity(nodes.len());
    for (v, node) in nodes.iter().enumerate() {
        positions.insert(
            node.id,
            Point::new(final_x[v] * node_spacing, node.depth as f64 * depth_spacing),
        );
        order.push(node.id);
    }

    TidyLayout { order, positions }
}

/// Flatten the visible set into pre-order, so parents always precede children.
fn collect_visible<F>(tree: &SiteTree, expanded: &F) -> Vec<TidyNode>
where
    F: Fn(NodeId) -> bool,
{
    let mut nodes: Vec<TidyNode> = Vec::new();
    let mut stack: Vec<(NodeId, Option<usize>, usize)> = vec![(NodeId::ROOT, None, 0)];

    while let Some((id, parent, number)) = stack.pop() {
        let idx = nodes.len();
        nodes.push(TidyNode {
            id,
            depth: tree[id].depth,
            parent,
            children: Vec::new(),
            number,
            prelim: 0.0,
            modifier: 0.0,
            shift: 0.0,
            change: 0.0,
            thread: None,
            ancestor: idx,
            default_ancestor: None,
        });
        if let Some(p) = parent {
            nodes[p].children.push(idx);
        }

        if expanded(id) {
            let children = &tree[id].children;
            for (number, &child) in children.iter().enumerate().rev() {
                stack.push((child, Some(idx), number));
            }
        }
    }

    nodes
}

fn separation(a: usize, b: usize, nodes: &[TidyNode]) -> f64 {
    if nodes[a].parent == nodes[b].parent { 1.0 } else { 2.0 }
}

fn next_left(v: usize, nodes: &[TidyNode]) -> Option<usize> {
    nodes[v].children.first().copied().or(nodes[v].thread)
}

fn next_right(v: usize, nodes: &[TidyNode]) -> Option<usize> {
    nodes[v].children.last().copied().or(nodes[v].thread)
}

fn left_sibling(v: usize, nodes: &[TidyNode]) -> Option<usize> {
    let parent = nodes[v].parent?;
    let number = nodes[v].number;
    (number > 0).then(|| nodes[parent].children[number - 1])
}

fn first_walk(v: usize, nodes: &mut Vec<TidyNode>) {
    let children = nodes[v].children.clone();
    for &child in &children {
        first_walk(child, nodes);
    }

    let sibling = left_sibling(v, nodes);
    if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
        execute_shifts(v, nodes);
        let midpoint = (nodes[first].prelim + nodes[last].prelim) / 2.0;
        if let Some(w) = sibling {
            nodes[v].prelim = nodes[w].prelim + separation(v, w, nodes);
            nodes[v].modifier = nodes[v].prelim - midpoint;
        } else {
            nodes[v].prelim = midpoint;
        }
    } else if let Some(w) = sibling {
        nodes[v].prelim = nodes[w].prelim + separation(v, w, nodes);
    }

    if let Some(parent) = nodes[v].parent {
        let fallback = nodes[parent].children[0];
        let ancestor = nodes[parent].default_ancestor.unwrap_or(fallback);
        let ancestor = apportion(v, sibling, ancestor, nodes);
        nodes[parent].default_ancestor = Some(ancestor);
    }
}

/// Push `v`'s subtree clear of every subtree to its left, spreading the shift
/// over the siblings in between.
fn apportion(v: usize, sibling: Option<usize>, mut ancestor: usize, nodes: &mut [TidyNode]) -> usize {
    let Some(w) = sibling else {
        return ancestor;
    };
    let Some(parent) = nodes[v].parent else {
        return ancestor;
    };

    // i = inside, o = outside; p = right subtree (v), m = left subtrees.
    let mut vip = v;
    let mut vop = v;
    let mut vim = w;
    let mut vom = nodes[parent].children[0];
    let mut sip = nodes[vip].modifier;
    let mut sop = nodes[vop].modifier;
    let mut sim = nodes[vim].modifier;
    let mut som = nodes[vom].modifier;

    let mut next_im = next_right(vim, nodes);
    let mut next_ip = next_left(vip, nodes);
    while let (Some(im), Some(ip)) = (next_im, next_ip) {
        vim = im;
        vip = ip;
        // Both outer contours are at least as deep as the inner ones.
        vom = next_left(vom, nodes).unwrap_or(vom);
        vop = next_right(vop, nodes).unwrap_or(vop);
        nodes[vop].ancestor = v;

        let shift = nodes[vim].prelim + sim - nodes[vip].prelim - sip + separation(vim, vip, nodes);
        if shift > 0.0 {
            let from = next_ancestor(vim, v, ancestor, nodes);
            move_subtree(from, v, shift, nodes);
            sip += shift;
            sop += shift;
        }

        sim += nodes[vim].modifier;
        sip += nodes[vip].modifier;
        som += nodes[vom].modifier;
        sop += nodes[vop].modifier;

        next_im = next_right(vim, nodes);
        next_ip = next_left(vip, nodes);
    }

    if next_im.is_some() && next_right(vop, nodes).is_none() {
        nodes[vop].thread = next_im;
        nodes[vop].modifier += sim - sop;
    }
    if next_ip.is_some() && next_left(vom, nodes).is_none() {
        nodes[vom].thread = next_ip;
        nodes[vom].modifier += sip - som;
        ancestor = v;
    }

    ancestor
}

fn next_ancestor(vim: usize, v: usize, ancestor: usize, nodes: &[TidyNode]) -> usize {
    let candidate = nodes[vim].ancestor;
    if nodes[candidate].parent == nodes[v].parent {
        candidate
    } else {
        ancestor
    }
}

fn move_subtree(wm: usize, wp: usize, shift: f64, nodes: &mut [TidyNode]) {
    let subtrees = (nodes[wp].number - nodes[wm].number) as f64;
    let change = shift / subtrees;
    nodes[wp].change -= change;
    nodes[wp].shift += shift;
    nodes[wm].change += change;
    nodes[wp].prelim += shift;
    nodes[wp].modifier += shift;
}

fn execute_shifts(v: usize, nodes: &mut [TidyNode]) {
    let mut shift = 0.0;
    let mut change = 0.0;
    let children = nodes[v].children.clone();
    for &w in children.iter().rev() {
        nodes[w].prelim += shift;
        nodes[w].modifier += shift;
        change += nodes[w].change;
        shift += nodes[w].shift + change;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;

    fn layout_all(tree: &SiteTree) -> TidyLayout {
        tidy_layout(tree, 1.0, 1.0, |_| true)
    }

    fn x_of(tree: &SiteTree, layout: &TidyLayout, url: &str) -> f64 {
        layout.position(tree.find_by_url(url).unwrap()).unwrap().x
    }

    #[test]
    fn test_single_node_at_origin() {
        let tree = build_tree(["https://ex.com/"]).unwrap();
        let layout = layout_all(&tree);
        assert_eq!(layout.order, vec![NodeId::ROOT]);
        assert_eq!(layout.position(NodeId::ROOT), Some(Point::ORIGIN));
    }

    #[test]
    fn test_parent_centred_over_children() {
        let tree = build_tree(["https://ex.com/a", "https://ex.com/b", "https://ex.com/c"]).unwrap();
        let layout = layout_all(&tree);
        let a = x_of(&tree, &layout, "https://ex.com/a");
        let b = x_of(&tree, &layout, "https://ex.com/b");
        let c = x_of(&tree, &layout, "https://ex.com/c");
        assert_eq!(b - a, 1.0);
        assert_eq!(c - b, 1.0);
        assert_eq!((a + c) / 2.0, 0.0);
    }

    #[test]
    fn test_cousins_two_slots_apart() {
        let tree = build_tree(["https://ex.com/a/x", "https://ex.com/b/y"]).unwrap();
        let layout = layout_all(&tree);
        let x = x_of(&tree, &layout, "https://ex.com/a/x");
        let y = x_of(&tree, &layout, "https://ex.com/b/y");
        assert_eq!(y - x, 2.0);
    }

    #[test]
    fn test_depth_spacing() {
        let tree = build_tree(["https://ex.com/a/b"]).unwrap();
        let layout = tidy_layout(&tree, 48.0, 640.0, |_| true);
        let b = tree.find_by_url("https://ex.com/a/b").unwrap();
        assert_eq!(layout.position(b).unwrap().y, 1280.0);
    }

    #[test]
    fn test_collapsed_subtree_excluded() {
        let tree = build_tree(["https://ex.com/a/b", "https://ex.com/c"]).unwrap();
        let a = tree.find_by_url("https://ex.com/a").unwrap();
        let layout = tidy_layout(&tree, 1.0, 1.0, |id| id != a);
        assert_eq!(layout.order.len(), 3);
        assert!(layout.position(tree.find_by_url("https://ex.com/a/b").unwrap()).is_none());
    }

    #[test]
    fn test_no_overlap_on_uneven_subtrees() {
        let tree = build_tree([
            "https://ex.com/a/1/x",
            "https://ex.com/a/1/y",
            "https://ex.com/a/2",
            "https://ex.com/b",
            "https://ex.com/c/3/z",
            "https://ex.com/c/3/w",
            "https://ex.com/c/3/v",
        ])
        .unwrap();
        let layout = layout_all(&tree);

        let mut by_depth: HashMap<usize, Vec<f64>> = HashMap::new();
        for &id in &layout.order {
            by_depth
                .entry(tree[id].depth)
                .or_default()
                .push(layout.position(id).unwrap().x);
        }
        for xs in by_depth.values() {
            let mut xs = xs.clone();
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
            for pair in xs.windows(2) {
                assert!(pair[1] - pair[0] >= 1.0 - 1e-9, "overlap in {:?}", xs);
            }
        }
    }
}
