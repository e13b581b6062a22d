//! Enter/update/exit plans between two consecutive layouts.
//!
//! Nodes and links are matched by [`NodeId`] (links by the id of their
//! target). Entering items grow out of the trigger node's previous position,
//! exiting items shrink into its new position.

use crate::layout::Point;
use crate::render::{LayoutNode, RenderState, Viewport};
use crate::tree::NodeId;
use serde::Serialize;
use std::time::Duration;

/// Endpoints of a drawn link. The source sits at the parent's link offset,
/// the target just before the child's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkPath {
    pub source: Point,
    pub target: Point,
}

impl LinkPath {
    pub fn between(parent: &LayoutNode, child: &LayoutNode, target_inset: f64) -> Self {
        Self {
            source: Point::new(parent.x, parent.y + parent.link_offset),
            target: Point::new(child.x, child.y - target_inset),
        }
    }

    /// A zero-length link parked at `at`.
    pub fn collapsed(at: Point, target_inset: f64) -> Self {
        Self {
            source: at,
            target: Point::new(at.x, at.y - target_inset),
        }
    }

    pub fn lerp(self, to: LinkPath, t: f64) -> LinkPath {
        LinkPath {
            source: self.source.lerp(to.source, t),
            target: self.target.lerp(to.target, t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMotion {
    pub id: NodeId,
    pub from: Point,
    pub to: Point,
    pub from_opacity: f64,
    pub to_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkMotion {
    pub source: NodeId,
    pub target: NodeId,
    pub from: LinkPath,
    pub to: LinkPath,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionPlan {
    pub trigger: NodeId,
    pub duration: Duration,
    pub entering: Vec<NodeMotion>,
    pub updating: Vec<NodeMotion>,
    pub exiting: Vec<NodeMotion>,
    pub links_entering: Vec<LinkMotion>,
    pub links_updating: Vec<LinkMotion>,
    pub links_exiting: Vec<LinkMotion>,
    pub viewport_from: Viewport,
    pub viewport: Viewport,
}

/// One sampled instant of a transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionFrame {
    pub nodes: Vec<FrameNode>,
    pub links: Vec<FrameLink>,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameNode {
    pub id: NodeId,
    pub at: Point,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameLink {
    pub source: NodeId,
    pub target: NodeId,
    pub path: LinkPath,
}

impl TransitionPlan {
    pub(crate) fn between(old: &RenderState, new: &RenderState, trigger: NodeId, duration: Duration) -> Self {
        let inset = new.config().target_inset;
        let trigger_from = old
            .layout_node(trigger)
            .map(LayoutNode::position)
            .unwrap_or(Point::ORIGIN);
        let trigger_to = new
            .layout_node(trigger)
            .map(LayoutNode::position)
            .unwrap_or(Point::ORIGIN);

        let mut plan = TransitionPlan {
            trigger,
            duration,
            entering: Vec::new(),
            updating: Vec::new(),
            exiting: Vec::new(),
            links_entering: Vec::new(),
            links_updating: Vec::new(),
            links_exiting: Vec::new(),
            viewport_from: old.viewport(),
            viewport: new.viewport(),
        };

        for node in new.visible_nodes() {
            match old.layout_node(node.id) {
                Some(previous) => plan.updating.push(NodeMotion {
                    id: node.id,
                    from: previous.position(),
                    to: node.position(),
                    from_opacity: 1.0,
                    to_opacity: 1.0,
                }),
                None => plan.entering.push(NodeMotion {
                    id: node.id,
                    from: trigger_from,
                    to: node.position(),
                    from_opacity: 0.0,
                    to_opacity: 1.0,
                }),
            }
        }

        for node in old.visible_nodes() {
            if !new.is_visible(node.id) {
                plan.exiting.push(NodeMotion {
                    id: node.id,
                    from: node.position(),
                    to: trigger_to,
                    from_opacity: 1.0,
                    to_opacity: 0.0,
                });
            }
        }

        for (parent, child) in new.links() {
            let to = LinkPath::between(parent, child, inset);
            let motion = match old.link_path(child.id) {
                Some(from) => LinkMotion {
                    source: parent.id,
                    target: child.id,
                    from,
                    to,
                },
                None => LinkMotion {
                    source: parent.id,
                    target: child.id,
                    from: LinkPath::collapsed(trigger_from, inset),
                    to,
                },
            };
            if old.is_visible(child.id) {
                plan.links_updating.push(motion);
            } else {
                plan.links_entering.push(motion);
            }
        }

        for (parent, child) in old.links() {
            if !new.is_visible(child.id) {
                plan.links_exiting.push(LinkMotion {
                    source: parent.id,
                    target: child.id,
                    from: LinkPath::between(parent, child, inset),
                    to: LinkPath::collapsed(trigger_to, inset),
                });
            }
        }

        plan
    }

    /// True when nothing enters or leaves.
    pub fn is_stationary(&self) -> bool {
        self.entering.is_empty() && self.exiting.is_empty()
    }

    /// Normalized time for `elapsed`, clamped to `[0, 1]`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Sample the transition at normalized time `t`. Exiting nodes and links
    /// are still present until `t` reaches 1, then dropped.
    pub fn frame(&self, t: f64) -> TransitionFrame {
        let t = t.clamp(0.0, 1.0);
        let eased = ease_cubic_in_out(t);
        let finished = t >= 1.0;

        let sample = |m: &NodeMotion| FrameNode {
            id: m.id,
            at: m.from.lerp(m.to, eased),
            opacity: m.from_opacity + (m.to_opacity - m.from_opacity) * eased,
        };
        let sample_link = |m: &LinkMotion| FrameLink {
            source: m.source,
            target: m.target,
            path: m.from.lerp(m.to, eased),
        };

        let mut nodes: Vec<FrameNode> = self.updating.iter().chain(&self.entering).map(sample).collect();
        let mut links: Vec<FrameLink> = self
            .links_updating
            .iter()
            .chain(&self.links_entering)
            .map(sample_link)
            .collect();
        if !finished {
            nodes.extend(self.exiting.iter().map(sample));
            links.extend(self.links_exiting.iter().map(sample_link));
        }

        let viewport = Viewport {
            top: lerp(self.viewport_from.top, self.viewport.top, eased),
            bottom: lerp(self.viewport_from.bottom, self.viewport.bottom, eased),
            left: lerp(self.viewport_from.left, self.viewport.left, eased),
            right: lerp(self.viewport_from.right, self.viewport.right, eased),
        };

        TransitionFrame { nodes, links, viewport }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
