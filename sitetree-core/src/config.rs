use crate::tree::TreeNode;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which nodes start out expanded when a tree is first rendered.
///
/// The root is always expanded, whatever the policy says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialExpansion {
    /// Expand every node shallower than the given depth.
    Depth(usize),
    /// Expand everything.
    All,
    /// Expand the root only.
    RootOnly,
}

impl InitialExpansion {
    pub fn is_expanded(&self, node: &TreeNode) -> bool {
        if node.is_root() {
            return true;
        }
        match self {
            InitialExpansion::Depth(limit) => node.depth < *limit,
            InitialExpansion::All => true,
            InitialExpansion::RootOnly => false,
        }
    }
}

impl Default for InitialExpansion {
    fn default() -> Self {
        InitialExpansion::Depth(1)
    }
}

impl fmt::Display for InitialExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialExpansion::Depth(limit) => write!(f, "depth:{}", limit),
            InitialExpansion::All => write!(f, "all"),
            InitialExpansion::RootOnly => write!(f, "none"),
        }
    }
}

impl FromStr for InitialExpansion {
    type Err = String;

    /// Accepts `all`, `none`, `depth:N` or a bare depth `N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "all" => return Ok(InitialExpansion::All),
            "none" | "root" => return Ok(InitialExpansion::RootOnly),
            _ => {}
        }

        let digits = s.strip_prefix("depth:").unwrap_or(&s);
        digits
            .parse::<usize>()
            .map(InitialExpansion::Depth)
            .map_err(|_| format!("invalid expansion policy '{}' (expected all, none or depth:N)", s))
    }
}

/// Transition speed, picked by a modifier key at the moment of toggling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    #[default]
    Normal,
    Slow,
}

/// Spacing, offsets and timing shared by every layout pass.
///
/// Layout coordinates follow the usual horizontal tree convention: `x` is the
/// vertical slot (breadth) and `y` grows with depth. The offsets are measured
/// along `y` from a node's anchor point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutConfig {
    /// Distance between adjacent sibling slots.
    pub node_spacing: f64,
    /// Distance between depth levels.
    pub depth_spacing: f64,
    /// Where the label text starts.
    pub label_offset: f64,
    /// Gap between the label's end and the disclosure indicator.
    pub indicator_gap: f64,
    /// Gap between the label's end and where outgoing links start.
    pub link_gap: f64,
    /// How far before a child's anchor incoming links stop.
    pub target_inset: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub normal_duration: Duration,
    pub slow_duration: Duration,
    pub initial_expansion: InitialExpansion,
}

impl LayoutConfig {
    pub fn duration(&self, pace: Pace) -> Duration {
        match pace {
            Pace::Normal => self.normal_duration,
            Pace::Slow => self.slow_duration,
        }
    }

    pub fn with_initial_expansion(mut self, expansion: InitialExpansion) -> Self {
        self.initial_expansion = expansion;
        self
    }

    pub fn with_node_spacing(mut self, spacing: f64) -> Self {
        self.node_spacing = spacing;
        self
    }

    pub fn with_depth_spacing(mut self, spacing: f64) -> Self {
        self.depth_spacing = spacing;
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 48.0,
            depth_spacing: 640.0,
            label_offset: 6.0,
            indicator_gap: 5.0,
            link_gap: 12.0,
            target_inset: 6.0,
            margin_top: 10.0,
            margin_right: 10.0,
            margin_bottom: 10.0,
            margin_left: 240.0,
            normal_duration: Duration::from_millis(250),
            slow_duration: Duration::from_millis(2500),
            initial_expansion: InitialExpansion::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expansion_policies() {
        assert_eq!("all".parse::<InitialExpansion>(), Ok(InitialExpansion::All));
        assert_eq!("none".parse::<InitialExpansion>(), Ok(InitialExpansion::RootOnly));
        assert_eq!("depth:3".parse::<InitialExpansion>(), Ok(InitialExpansion::Depth(3)));
        assert_eq!("2".parse::<InitialExpansion>(), Ok(InitialExpansion::Depth(2)));
        assert!("sideways".parse::<InitialExpansion>().is_err());
    }

    #[test]
    fn test_expansion_display_round_trips() {
        for policy in [
            InitialExpansion::All,
            InitialExpansion::RootOnly,
            InitialExpansion::Depth(4),
        ] {
            assert_eq!(policy.to_string().parse::<InitialExpansion>(), Ok(policy));
        }
    }

    #[test]
    fn test_duration_by_pace() {
        let config = LayoutConfig::default();
        assert_eq!(config.duration(Pace::Normal), Duration::from_millis(250));
        assert_eq!(config.duration(Pace::Slow), Duration::from_millis(2500));
    }
}
