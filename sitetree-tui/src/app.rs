use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use sitetree_core::config::{LayoutConfig, Pace};
use sitetree_core::layout::Point;
use sitetree_core::render::{LayoutNode, RenderState};
use sitetree_core::transition::{TransitionFrame, TransitionPlan};
use sitetree_core::tree::{NodeId, SiteTree};
use std::time::Instant;

/// Longest label drawn in full, in cells. Longer ones are cut with an ellipsis.
pub const MAX_LABEL_CELLS: usize = 18;

/// What the event loop should do after an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Open(String),
}

/// Which part of a node a screen cell falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Anchor,
    Label,
    Indicator,
}

/// Width of a label as drawn on a character grid.
pub fn label_cells(label: &str) -> f64 {
    label.chars().count().min(MAX_LABEL_CELLS) as f64
}

/// The label as drawn: cut to [`MAX_LABEL_CELLS`] with a trailing ellipsis.
pub fn display_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CELLS {
        return label.to_string();
    }
    let mut cut: String = label.chars().take(MAX_LABEL_CELLS - 1).collect();
    cut.push('…');
    cut
}

/// Running transition. `from` is kept so exiting nodes can still be drawn.
struct Animation {
    plan: TransitionPlan,
    started: Instant,
    from: RenderState,
}

pub struct App {
    state: RenderState,
    animation: Option<Animation>,
    selected: NodeId,
    /// Top-left corner of the visible window, in layout units.
    camera: Point,
    tree_area: Rect,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(tree: SiteTree, config: LayoutConfig) -> Self {
        let (state, plan) = RenderState::initialize(tree, config, &label_cells);
        let viewport = state.viewport();
        let status = format!(
            "{} nodes from {}",
            state.tree().len(),
            state.tree().origin()
        );
        let from = state.clone();

        Self {
            camera: Point::new(viewport.top, viewport.left),
            state,
            animation: Some(Animation {
                plan,
                started: Instant::now(),
                from,
            }),
            selected: NodeId::ROOT,
            tree_area: Rect::default(),
            status,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn selected(&self) -> NodeId {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&LayoutNode> {
        self.state.layout_node(self.selected)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn camera(&self) -> Point {
        self.camera
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Drop the animation once its time is up.
    pub fn tick(&mut self, now: Instant) {
        if let Some(animation) = &self.animation
            && animation.plan.progress(now.saturating_duration_since(animation.started)) >= 1.0
        {
            self.animation = None;
        }
    }

    pub fn finish_animation(&mut self) {
        self.animation = None;
    }

    /// What to draw at `now`: the running transition, or the settled layout.
    pub fn frame(&self, now: Instant) -> TransitionFrame {
        match &self.animation {
            Some(animation) => {
                let t = animation
                    .plan
                    .progress(now.saturating_duration_since(animation.started));
                animation.plan.frame(t)
            }
            None => settled_frame(&self.state),
        }
    }

    /// Layout data for a node in the current frame. Exiting nodes are only
    /// found in the state the animation started from.
    pub fn frame_node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.state.layout_node(id).or_else(|| {
            self.animation
                .as_ref()
                .and_then(|animation| animation.from.layout_node(id))
        })
    }

    fn start(&mut self, next: RenderState, plan: TransitionPlan) {
        let from = std::mem::replace(&mut self.state, next);
        self.animation = Some(Animation {
            plan,
            started: Instant::now(),
            from,
        });
        self.reselect_visible();
        self.follow_selection();
    }

    pub fn toggle(&mut self, id: NodeId, pace: Pace) {
        match self.state.toggle(id, pace) {
            Ok((next, plan)) => {
                if plan.is_stationary() {
                    self.status = format!("{} has no children", self.state.tree()[id].name);
                    return;
                }
                let node = &next.tree()[id];
                self.status = format!(
                    "{} {}{}",
                    if next.is_expanded(id) { "Expanded" } else { "Collapsed" },
                    node.name,
                    if pace == Pace::Slow { " (slow)" } else { "" }
                );
                self.start(next, plan);
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    pub fn toggle_selected(&mut self, pace: Pace) {
        self.toggle(self.selected, pace);
    }

    pub fn expand_all(&mut self, pace: Pace) {
        let (next, plan) = self.state.expand_all(pace);
        self.status = "Expanded all".to_string();
        self.start(next, plan);
    }

    pub fn collapse_all(&mut self, pace: Pace) {
        let (next, plan) = self.state.collapse_all(pace);
        self.status = "Collapsed all".to_string();
        self.start(next, plan);
    }

    pub fn selected_url(&self) -> String {
        self.state.tree()[self.selected].url.clone()
    }

    pub fn select(&mut self, id: NodeId) {
        if self.state.is_visible(id) {
            self.selected = id;
            self.follow_selection();
        }
    }

    fn visible_index(&self) -> usize {
        self.state
            .visible_nodes()
            .iter()
            .position(|n| n.id == self.selected)
            .unwrap_or(0)
    }

    /// Move the selection by `delta` rows in visible pre-order, clamped.
    pub fn move_selection(&mut self, delta: isize) {
        let nodes = self.state.visible_nodes();
        if nodes.is_empty() {
            return;
        }
        let index = self.visible_index() as isize + delta;
        let index = index.clamp(0, nodes.len() as isize - 1) as usize;
        let id = nodes[index].id;
        self.select(id);
    }

    pub fn select_first(&mut self) {
        self.select(NodeId::ROOT);
    }

    pub fn select_last(&mut self) {
        if let Some(last) = self.state.visible_nodes().last() {
            let id = last.id;
            self.select(id);
        }
    }

    /// Collapse the selected node, or step out to its parent when it is
    /// already collapsed or a leaf.
    pub fn fold(&mut self, pace: Pace) {
        let node = &self.state.tree()[self.selected];
        if node.has_children() && self.state.is_expanded(self.selected) {
            self.toggle_selected(pace);
        } else if let Some(parent) = node.parent {
            self.select(parent);
        }
    }

    /// Expand the selected node, or step into its first child.
    pub fn unfold(&mut self, pace: Pace) {
        let node = &self.state.tree()[self.selected];
        if !node.has_children() {
            return;
        }
        if !self.state.is_expanded(self.selected) {
            self.toggle_selected(pace);
        } else {
            let first = node.children[0];
            self.select(first);
        }
    }

    /// After a collapse the selection may be hidden; move it up to the
    /// nearest visible ancestor.
    fn reselect_visible(&mut self) {
        if self.state.is_visible(self.selected) {
            return;
        }
        self.selected = self
            .state
            .tree()
            .ancestors(self.selected)
            .into_iter()
            .find(|&a| self.state.is_visible(a))
            .unwrap_or(NodeId::ROOT);
    }

    pub fn set_tree_area(&mut self, area: Rect) {
        if self.tree_area != area {
            self.tree_area = area;
            self.follow_selection();
        }
    }

    pub fn tree_area(&self) -> Rect {
        self.tree_area
    }

    /// Scroll the camera just enough to keep the selected node and its label
    /// inside the tree area.
    pub fn follow_selection(&mut self) {
        let Some(node) = self.state.layout_node(self.selected) else {
            return;
        };
        let rows = f64::from(self.tree_area.height.max(1));
        let cols = f64::from(self.tree_area.width.max(1));
        let config = self.state.config();

        if node.x < self.camera.x {
            self.camera.x = node.x - config.margin_top;
        } else if node.x > self.camera.x + rows - 1.0 {
            self.camera.x = node.x - rows + 1.0 + config.margin_bottom;
        }

        let start = node.y - config.target_inset - 1.0;
        let end = node.y + node.indicator_x.unwrap_or(config.label_offset + node.label_width) + 1.0;
        if start < self.camera.y {
            self.camera.y = start.min(node.y - config.margin_left);
        } else if end > self.camera.y + cols {
            self.camera.y = end - cols;
        }
    }

    pub fn pan(&mut self, rows: f64, cols: f64) {
        self.camera.x += rows;
        self.camera.y += cols;
    }

    /// Which node part lies under the terminal cell (`column`, `row`).
    pub fn hit_test(&self, column: u16, row: u16) -> Option<(NodeId, Hit)> {
        let area = self.tree_area;
        if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
            return None;
        }
        let breadth = self.camera.x + f64::from(row - area.y);
        let depth = self.camera.y + f64::from(column - area.x);
        let config = self.state.config();

        self.state.visible_nodes().iter().find_map(|node| {
            if (node.x - breadth).abs() >= 0.5 {
                return None;
            }
            let offset = depth - node.y;
            if let Some(indicator) = node.indicator_x
                && offset >= indicator
                && offset < indicator + 1.0
            {
                return Some((node.id, Hit::Indicator));
            }
            if offset >= config.label_offset && offset < config.label_offset + node.label_width {
                return Some((node.id, Hit::Label));
            }
            if offset >= -config.target_inset - 1.0 && offset < config.label_offset {
                return Some((node.id, Hit::Anchor));
            }
            None
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let pace = pace_for(key.modifiers);
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Action::Quit;
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return Action::Quit;
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') => self.fold(pace),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') => self.unfold(pace),
            KeyCode::Char(' ') | KeyCode::Tab => self.toggle_selected(pace),
            KeyCode::BackTab => self.toggle_selected(Pace::Slow),
            KeyCode::Char('e') | KeyCode::Char('E') => self.expand_all(pace),
            KeyCode::Char('c') | KeyCode::Char('C') => self.collapse_all(pace),
            KeyCode::Enter | KeyCode::Char('o') => return Action::Open(self.selected_url()),
            _ => {}
        }
        Action::None
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Action {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some((id, hit)) = self.hit_test(mouse.column, mouse.row) else {
                    return Action::None;
                };
                self.select(id);
                match hit {
                    Hit::Indicator => self.toggle(id, pace_for(mouse.modifiers)),
                    Hit::Label => return Action::Open(self.selected_url()),
                    Hit::Anchor => {}
                }
            }
            MouseEventKind::ScrollUp => self.pan(-3.0, 0.0),
            MouseEventKind::ScrollDown => self.pan(3.0, 0.0),
            MouseEventKind::ScrollLeft => self.pan(0.0, -6.0),
            MouseEventKind::ScrollRight => self.pan(0.0, 6.0),
            _ => {}
        }
        Action::None
    }
}

/// Shift or Alt held while toggling slows the transition down.
pub fn pace_for(modifiers: KeyModifiers) -> Pace {
    if modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
        Pace::Slow
    } else {
        Pace::Normal
    }
}

fn settled_frame(state: &RenderState) -> TransitionFrame {
    use sitetree_core::transition::{FrameLink, FrameNode};

    TransitionFrame {
        nodes: state
            .visible_nodes()
            .iter()
            .map(|n| FrameNode {
                id: n.id,
                at: n.position(),
                opacity: 1.0,
            })
            .collect(),
        links: state
            .links()
            .filter_map(|(parent, child)| {
                state.link_path(child.id).map(|path| FrameLink {
                    source: parent.id,
                    target: child.id,
                    path,
                })
            })
            .collect(),
        viewport: state.viewport(),
    }
}
