pub mod config;
pub mod error;
pub mod layout;
pub mod measure;
pub mod render;
pub mod report;
pub mod transition;
pub mod tree;

pub use config::{InitialExpansion, LayoutConfig, Pace};
pub use error::{ExportError, Result, TreeError};
pub use layout::{Point, TidyLayout, tidy_layout};
pub use measure::{FixedAdvance, LabelMeasure};
pub use render::{Indicator, LayoutNode, RenderState, Viewport};
pub use transition::{FrameLink, FrameNode, LinkMotion, LinkPath, NodeMotion, TransitionFrame, TransitionPlan};
pub use tree::{NodeId, NodeKind, SiteTree, TreeNode, TreeStats, build_tree};
