//! Incremental renderer: expand/collapse state plus the layout derived from it.
//!
//! A [`RenderState`] is a value. Every interaction produces a new state and
//! the [`TransitionPlan`] that animates from the old layout to the new one;
//! the old state is left untouched.

use crate::config::{LayoutConfig, Pace};
use crate::error::{Result, TreeError};
use crate::layout::{Point, tidy_layout};
use crate::measure::LabelMeasure;
use crate::transition::{LinkPath, TransitionPlan};
use crate::tree::{NodeId, SiteTree, TreeNode};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// State of a node's disclosure indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Expanded,
    Collapsed,
    /// Leaves have no indicator.
    None,
}

impl Indicator {
    fn of(node: &TreeNode, expanded: bool) -> Self {
        match (node.has_children(), expanded) {
            (false, _) => Indicator::None,
            (true, true) => Indicator::Expanded,
            (true, false) => Indicator::Collapsed,
        }
    }

    pub fn glyph(self) -> Option<char> {
        match self {
            Indicator::Expanded => Some('<'),
            Indicator::Collapsed => Some('>'),
            Indicator::None => None,
        }
    }
}

/// A visible node with its position in the current pass and the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub x0: f64,
    pub y0: f64,
    pub label_width: f64,
    pub indicator: Indicator,
    /// Where the indicator glyph starts, relative to the node anchor.
    pub indicator_x: Option<f64>,
    /// Where outgoing links start, relative to the node anchor.
    pub link_offset: f64,
}

impl LayoutNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn previous_position(&self) -> Point {
        Point::new(self.x0, self.y0)
    }
}

/// Bounding box of a layout in screen terms: `top`/`bottom` along the breadth
/// axis, `left`/`right` along the depth axis, margins included.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Viewport {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Viewport {
    fn around(nodes: &[LayoutNode], config: &LayoutConfig) -> Self {
        let mut min_x = 0.0f64;
        let mut max_x = 0.0f64;
        let mut max_y = 0.0f64;
        for node in nodes {
            min_x = min_x.min(node.x);
            max_x = max_x.max(node.x);
            let reach = if node.indicator == Indicator::None {
                config.label_offset + node.label_width
            } else {
                node.link_offset
            };
            max_y = max_y.max(node.y + reach);
        }

        Self {
            top: min_x - config.margin_top,
            bottom: max_x + config.margin_bottom,
            left: -config.margin_left,
            right: max_y + config.margin_right,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone)]
pub struct RenderState {
    tree: Arc<SiteTree>,
    config: LayoutConfig,
    expanded: Vec<bool>,
    label_widths: Arc<[f64]>,
    nodes: Vec<LayoutNode>,
    slots: HashMap<NodeId, usize>,
    viewport: Viewport,
}

impl RenderState {
    /// Measure every label once, apply the initial expansion policy and lay
    /// out the first frame. Every visible node enters from the root.
    pub fn initialize<M>(
        tree: impl Into<Arc<SiteTree>>,
        config: LayoutConfig,
        measure: &M,
    ) -> (RenderState, TransitionPlan)
    where
        M: LabelMeasure + ?Sized,
    {
        let tree = tree.into();
        let expanded: Vec<bool> = tree
            .nodes()
            .map(|n| config.initial_expansion.is_expanded(n))
            .collect();
        let label_widths: Arc<[f64]> = tree.nodes().map(|n| measure.label_width(&n.name)).collect();

        debug!(
            "Initializing render state for {} ({} nodes, expansion {})",
            tree.root().name,
            tree.len(),
            config.initial_expansion
        );

        let blank = RenderState {
            tree,
            config,
            expanded: Vec::new(),
            label_widths,
            nodes: Vec::new(),
            slots: HashMap::new(),
            viewport: Viewport::default(),
        };
        blank.transition_to(expanded, NodeId::ROOT, Pace::Normal)
    }

    /// Flip one node's expand flag. Descendants keep their own flags, so a
    /// re-expanded branch comes back the way it was left. Leaves have nothing
    /// to flip and yield a plan without entering or exiting nodes.
    pub fn toggle(&self, id: NodeId, pace: Pace) -> Result<(RenderState, TransitionPlan)> {
        let node = self.tree.get(id)?;
        if !self.is_visible(id) {
            return Err(TreeError::NotVisible(id));
        }

        let mut expanded = self.expanded.clone();
        if node.has_children() {
            expanded[id.index()] = !expanded[id.index()];
            debug!(
                "Toggled {} ({}) -> {}",
                id,
                node.name,
                if expanded[id.index()] { "expanded" } else { "collapsed" }
            );
        }

        Ok(self.transition_to(expanded, id, pace))
    }

    pub fn expand_all(&self, pace: Pace) -> (RenderState, TransitionPlan) {
        let expanded = vec![true; self.tree.len()];
        self.transition_to(expanded, NodeId::ROOT, pace)
    }

    /// Collapse everything below the root.
    pub fn collapse_all(&self, pace: Pace) -> (RenderState, TransitionPlan) {
        let mut expanded = vec![false; self.tree.len()];
        expanded[NodeId::ROOT.index()] = true;
        self.transition_to(expanded, NodeId::ROOT, pace)
    }

    fn transition_to(&self, expanded: Vec<bool>, trigger: NodeId, pace: Pace) -> (RenderState, TransitionPlan) {
        let config = &self.config;
        let tidy = tidy_layout(&self.tree, config.node_spacing, config.depth_spacing, |id| {
            expanded[id.index()]
        });

        // Nodes that were hidden start where the trigger was.
        let origin = self
            .layout_node(trigger)
            .map(LayoutNode::position)
            .unwrap_or(Point::ORIGIN);

        let mut nodes = Vec::with_capacity(tidy.order.len());
        let mut slots = HashMap::with_capacity(tidy.order.len());
        for &id in &tidy.order {
            let node = &self.tree[id];
            let at = tidy.positions[&id];
            let previous = self.layout_node(id).map(LayoutNode::position).unwrap_or(origin);
            let label_width = self.label_widths[id.index()];
            let (indicator_x, link_offset) = if node.has_children() {
                let label_end = config.label_offset + label_width;
                (Some(label_end + config.indicator_gap), label_end + config.link_gap)
            } else {
                (None, 0.0)
            };

            slots.insert(id, nodes.len());
            nodes.push(LayoutNode {
                id,
                parent: node.parent,
                depth: node.depth,
                x: at.x,
                y: at.y,
                x0: previous.x,
                y0: previous.y,
                label_width,
                indicator: Indicator::of(node, expanded[id.index()]),
                indicator_x,
                link_offset,
            });
        }

        let viewport = Viewport::around(&nodes, config);
        let next = RenderState {
            tree: Arc::clone(&self.tree),
            config: config.clone(),
            expanded,
            label_widths: Arc::clone(&self.label_widths),
            nodes,
            slots,
            viewport,
        };

        let plan = TransitionPlan::between(self, &next, trigger, config.duration(pace));
        (next, plan)
    }

    pub fn tree(&self) -> &SiteTree {
        &self.tree
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.get(id.index()).copied().unwrap_or(false)
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Visible nodes in pre-order.
    pub fn visible_nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn visible_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn layout_node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.slots.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The drawn link ending at `child`, if `child` is visible and not the root.
    pub fn link_path(&self, child: NodeId) -> Option<LinkPath> {
        let child = self.layout_node(child)?;
        let parent = self.layout_node(child.parent?)?;
        Some(LinkPath::between(parent, child, self.config.target_inset))
    }

    /// Visible (parent, child) pairs in pre-order of the child.
    pub fn links(&self) -> impl Iterator<Item = (&LayoutNode, &LayoutNode)> + '_ {
        self.nodes.iter().filter_map(move |child| {
            let parent = self.layout_node(child.parent?)?;
            Some((parent, child))
        })
    }
}
