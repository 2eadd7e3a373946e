//! Navigation tree of a documentation chapter.

use std::fmt;
use std::rc::Rc;

use tocrawl_tree::iter::{self, Descendants};
use tocrawl_tree::{NodeRef, Tree, TreeError};

use crate::error::CrawlError;

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Display title, possibly empty.
    pub name: String,
    /// Absolute URL.
    pub url: String,
}

impl NavEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Internal,
    Leaf,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Root => "root",
            NodeKind::Internal => "internal",
            NodeKind::Leaf => "leaf",
        })
    }
}

/// Arena-backed navigation tree. Owns every node; [`NavNode`]s are handles into it.
#[derive(Debug, Clone)]
pub struct NavTree {
    tree: Rc<Tree<NavEntry>>,
}

impl NavTree {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            tree: Tree::new(NavEntry::new(name, url)),
        }
    }

    pub fn root(&self) -> NavNode {
        NavNode(self.tree.root())
    }

    /// Creates a node that is not attached anywhere yet, see [`NavNode::attach`].
    pub fn detached(&self, entry: NavEntry) -> Result<NavNode, CrawlError> {
        let id = self.tree.orphan(entry);
        let node = self.tree.get(id).ok_or(TreeError::Missing(id))?;
        Ok(NavNode(node))
    }

    /// Number of nodes reachable from the root.
    pub fn len(&self) -> usize {
        self.root().iter_depth_first().count()
    }

    /// Always false: a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn find(&self, url: &str) -> Option<NavNode> {
        self.root().find(url)
    }

    pub fn leaves(&self) -> Leaves {
        self.root().iter_leaves()
    }
}

impl fmt::Display for NavTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root(), f)
    }
}

/// Handle to a node of a [`NavTree`].
///
/// Handles only hold a weak reference: they stop resolving once the tree is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct NavNode(NodeRef<NavEntry>);

impl NavNode {
    pub fn entry(&self) -> NavEntry {
        self.0.map_value(NavEntry::clone).unwrap_or_else(|| NavEntry::new("", ""))
    }

    pub fn name(&self) -> String {
        self.0.map_value(|e| e.name.clone()).unwrap_or_default()
    }

    pub fn url(&self) -> String {
        self.0.map_value(|e| e.url.clone()).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<NavNode> {
        self.0.parent().map(NavNode)
    }

    pub fn children(&self) -> impl Iterator<Item = NavNode> {
        self.0.children().map(NavNode)
    }

    pub fn kind(&self) -> NodeKind {
        if self.0.parent().is_none() {
            NodeKind::Root
        } else if self.0.has_children() {
            NodeKind::Internal
        } else {
            NodeKind::Leaf
        }
    }

    /// Distance to the root.
    pub fn depth(&self) -> usize {
        self.0.depth()
    }

    /// Longest chain of descendants below this node, 0 for a leaf.
    pub fn max_depth(&self) -> usize {
        self.0.height()
    }

    /// Names from the root down to this node, joined by `|`.
    pub fn path(&self) -> String {
        let mut names: Vec<String> = self
            .0
            .ancestors()
            .map(|node| NavNode(node).name())
            .collect();
        names.reverse();
        names.push(self.name());
        names.join("|")
    }

    /// Appends a new child holding `entry`.
    pub fn add_child(&self, entry: NavEntry) -> Result<NavNode, CrawlError> {
        let mut node = self.0.clone();
        Ok(NavNode(node.append(entry)?))
    }

    /// Appends an existing detached node of the same tree.
    ///
    /// A node that already has a parent, or that is an ancestor of `self`, is rejected.
    pub fn attach(&self, child: &NavNode) -> Result<(), CrawlError> {
        let mut node = self.0.clone();
        node.append_id(child.0.id())?;
        Ok(())
    }

    /// First node of this subtree, in depth-first order, whose URL is exactly `url`.
    pub fn find(&self, url: &str) -> Option<NavNode> {
        self.iter_depth_first()
            .find(|node| node.0.map_value(|e| e.url == url).unwrap_or(false))
    }

    pub fn iter_depth_first(&self) -> DepthFirst {
        DepthFirst(self.0.descendants())
    }

    pub fn iter_breadth_first(&self) -> BreadthFirst {
        BreadthFirst(self.0.breadth_first())
    }

    pub fn iter_leaves(&self) -> Leaves {
        Leaves(self.0.descendants())
    }

    /// One line per node of this subtree: `---` per level below this node, then
    /// `name (url) [kind]`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NavNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.depth();
        for node in self.iter_depth_first() {
            let entry = node.entry();
            writeln!(
                f,
                "{}{} ({}) [{}]",
                "---".repeat(node.depth() - base),
                entry.name,
                entry.url,
                node.kind()
            )?;
        }
        Ok(())
    }
}

/// Pre-order iterator over a subtree.
#[derive(Debug, Clone)]
pub struct DepthFirst(Descendants<NavEntry>);

impl Iterator for DepthFirst {
    type Item = NavNode;

    fn next(&mut self) -> Option<NavNode> {
        self.0.next().map(NavNode)
    }
}

/// Level-order iterator over a subtree.
#[derive(Debug, Clone)]
pub struct BreadthFirst(iter::BreadthFirst<NavEntry>);

impl Iterator for BreadthFirst {
    type Item = NavNode;

    fn next(&mut self) -> Option<NavNode> {
        self.0.next().map(NavNode)
    }
}

/// Pre-order iterator over the leaves of a subtree.
#[derive(Debug, Clone)]
pub struct Leaves(Descendants<NavEntry>);

impl Iterator for Leaves {
    type Item = NavNode;

    fn next(&mut self) -> Option<NavNode> {
        self.0
            .by_ref()
            .map(NavNode)
            .find(|node| node.kind() == NodeKind::Leaf)
    }
}
