//! Prefix tree of a site's URLs, keyed by hostname and path segments.

use crate::error::{Result, TreeError};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Index;
use tracing::{debug, warn};
use url::Url;

/// Stable node identity, assigned in creation order and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub const fn from_index(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The site itself, named after the hostname.
    Root,
    /// A path segment with at least one child.
    Internal,
    /// A path segment nothing hangs off.
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    pub url: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl TreeNode {
    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
}

/// Immutable tree built once per sitemap. Nodes live in an arena indexed by
/// [`NodeId`]; the root is always `NodeId::ROOT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTree {
    nodes: Vec<TreeNode>,
    origin: String,
    by_url: HashMap<String, NodeId>,
}

impl SiteTree {
    pub fn from_urls<I, S>(urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        build_tree(urls)
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn get(&self, id: NodeId) -> Result<&TreeNode> {
        self.node(id).ok_or(TreeError::UnknownNode(id))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest segment count across all nodes.
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn find_by_url(&self, url: &str) -> Option<NodeId> {
        self.by_url.get(url.trim_end_matches('/')).copied()
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    pub fn iter_preorder(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes[parent.0].parent;
        }
        chain
    }

    /// Segment names from the root's first child down to `id`.
    pub fn path_segments(&self, id: NodeId) -> Vec<&str> {
        let mut segments: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .rev()
            .skip(1)
            .map(|a| self.nodes[a.0].name.as_str())
            .collect();
        if let Some(node) = self.node(id).filter(|n| !n.is_root()) {
            segments.push(node.name.as_str());
        }
        segments
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            nodes: self.nodes.len(),
            leaves: self.nodes.iter().filter(|n| n.kind == NodeKind::Leaf).count(),
            depth: self.depth(),
        }
    }
}

impl Index<NodeId> for SiteTree {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }
}

pub struct PreOrder<'a> {
    tree: &'a SiteTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.0];
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Build a tree from absolute URLs.
///
/// The first URL decides the root: its hostname becomes the root's name and
/// its origin the root's URL. Nodes are deduplicated on the accumulated path
/// (`origin/seg1/seg2/...`), never on the bare segment name, so `/a/x` and
/// `/b/x` give two distinct nodes named `x`. Query strings and fragments are
/// ignored.
pub fn build_tree<I, S>(urls: I) -> Result<SiteTree>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut urls = urls.into_iter();
    let first = urls.next().ok_or(TreeError::NoUrls)?;
    let first = parse_absolute(first.as_ref())?;

    let mut builder = TreeBuilder::new(&first);
    builder.insert(&first);
    let mut count = 1;
    for raw in urls {
        builder.insert(&parse_absolute(raw.as_ref())?);
        count += 1;
    }

    let tree = builder.finish();
    debug!(
        "Built tree for {} from {} URLs: {} nodes, depth {}",
        tree.origin,
        count,
        tree.len(),
        tree.depth()
    );
    Ok(tree)
}

fn parse_absolute(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| TreeError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(TreeError::InvalidUrl {
            url: raw.to_string(),
            reason: "URL has no host".to_string(),
        });
    }
    Ok(url)
}

struct TreeBuilder {
    nodes: Vec<TreeNode>,
    origin: String,
    by_url: HashMap<String, NodeId>,
    foreign_origins: HashSet<String>,
}

impl TreeBuilder {
    fn new(first: &Url) -> Self {
        let origin = first.origin().ascii_serialization();
        let root = TreeNode {
            id: NodeId::ROOT,
            name: first.host_str().unwrap_or_default().to_string(),
            url: origin.clone(),
            kind: NodeKind::Root,
            depth: 0,
            parent: None,
            children: Vec::new(),
        };

        let mut by_url = HashMap::new();
        by_url.insert(origin.clone(), NodeId::ROOT);

        Self {
            nodes: vec![root],
            origin,
            by_url,
            foreign_origins: HashSet::new(),
        }
    }

    fn insert(&mut self, url: &Url) {
        let origin = url.origin().ascii_serialization();
        if origin != self.origin && self.foreign_origins.insert(origin.clone()) {
            warn!(
                "URL origin {} differs from {}; its paths hang under the root",
                origin, self.origin
            );
        }

        let mut current = NodeId::ROOT;
        let mut path = origin;
        for segment in url.path().split('/').filter(|s| !s.is_empty()) {
            path.push('/');
            path.push_str(segment);

            current = match self.by_url.get(&path) {
                Some(&id) => id,
                None => self.push_child(current, segment, &path),
            };
        }
    }

    fn push_child(&mut self, parent: NodeId, segment: &str, url: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(TreeNode {
            id,
            name: segment.to_string(),
            url: url.to_string(),
            kind: NodeKind::Leaf,
            depth,
            parent: Some(parent),
            children: Vec::new(),
        });

        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.push(id);
        if parent_node.kind == NodeKind::Leaf {
            parent_node.kind = NodeKind::Internal;
        }

        self.by_url.insert(url.to_string(), id);
        id
    }

    fn finish(self) -> SiteTree {
        SiteTree {
            nodes: self.nodes,
            origin: self.origin,
            by_url: self.by_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &SiteTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree[id].name.clone()).collect()
    }

    #[test]
    fn test_root_from_first_url() {
        let tree = build_tree(["https://ex.com/a", "https://ex.com/b"]).unwrap();
        assert_eq!(tree.root().name, "ex.com");
        assert_eq!(tree.root().url, "https://ex.com");
        assert_eq!(tree.root().kind, NodeKind::Root);
    }

    #[test]
    fn test_siblings_share_parent() {
        let tree = build_tree(["https://ex.com/a/b", "https://ex.com/a/c"]).unwrap();
        assert_eq!(tree.len(), 4);

        let a = tree.root().children[0];
        assert_eq!(tree[a].name, "a");
        assert_eq!(tree[a].kind, NodeKind::Internal);
        assert_eq!(names(&tree, &tree[a].children), vec!["b", "c"]);
    }

    #[test]
    fn test_same_segment_under_different_parents() {
        let tree = build_tree(["https://ex.com/a/x", "https://ex.com/b/x"]).unwrap();
        assert_eq!(tree.len(), 5);

        let xs: Vec<&TreeNode> = tree.nodes().filter(|n| n.name == "x").collect();
        assert_eq!(xs.len(), 2);
        assert_ne!(xs[0].url, xs[1].url);
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let tree = build_tree(["https://ex.com//a///b/"]).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.depth(), 2);
        let b = tree.find_by_url("https://ex.com/a/b").unwrap();
        assert_eq!(tree[b].url, "https://ex.com/a/b");
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        let tree = build_tree(["https://ex.com/a?page=2", "https://ex.com/a#top"]).unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_leaf_becomes_internal() {
        let tree = build_tree(["https://ex.com/a", "https://ex.com/a/b"]).unwrap();
        let a = tree.find_by_url("https://ex.com/a").unwrap();
        assert_eq!(tree[a].kind, NodeKind::Internal);
        assert_eq!(names(&tree, &tree[a].children), vec!["b"]);
    }

    #[test]
    fn test_empty_input_rejected() {
        let urls: Vec<&str> = Vec::new();
        assert_eq!(build_tree(urls), Err(TreeError::NoUrls));
    }

    #[test]
    fn test_relative_url_rejected() {
        let err = build_tree(["https://ex.com/a", "/relative/path"]).unwrap_err();
        assert!(matches!(err, TreeError::InvalidUrl { ref url, .. } if url == "/relative/path"));
    }

    #[test]
    fn test_hostless_url_rejected() {
        let err = build_tree(["mailto:someone@ex.com"]).unwrap_err();
        assert!(matches!(err, TreeError::InvalidUrl { .. }));
    }

    #[test]
    fn test_preorder_visits_parents_first() {
        let tree = build_tree([
            "https://ex.com/a/b",
            "https://ex.com/c",
            "https://ex.com/a/d",
        ])
        .unwrap();
        let order: Vec<&str> = tree.iter_preorder().map(|n| n.name.as_str()).collect();
        assert_eq!(order, vec!["ex.com", "a", "b", "d", "c"]);
    }

    #[test]
    fn test_ancestors_and_segments() {
        let tree = build_tree(["https://ex.com/a/b/c"]).unwrap();
        let c = tree.find_by_url("https://ex.com/a/b/c").unwrap();
        assert_eq!(tree.ancestors(c).len(), 3);
        assert_eq!(tree.path_segments(c), vec!["a", "b", "c"]);
        assert!(tree.path_segments(NodeId::ROOT).is_empty());
    }

    #[test]
    fn test_stats() {
        let tree = build_tree(["https://ex.com/a/b", "https://ex.com/a/c", "https://ex.com/d"]).unwrap();
        let stats = tree.stats();
        assert_eq!(stats.nodes, 5);
        assert_eq!(stats.leaves, 3);
        assert_eq!(stats.depth, 2);
    }

    #[test]
    fn test_root_only_tree() {
        let tree = build_tree(["https://ex.com/"]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.stats().leaves, 0);
    }
}
