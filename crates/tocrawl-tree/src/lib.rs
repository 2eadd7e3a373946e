//! [SlotMap](https://crates.io/crates/slotmap)-backed ID-tree.
//!
//! Nodes are stored in an arena and linked through [`NodeId`]s, so parent links
//! never own anything. A [`NodeRef`] only holds a [`Weak`] pointer to its tree.

pub mod iter;

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, Key, SlotMap};

new_key_type! {
    pub struct NodeId;
}

/// Errors raised when linking nodes would break the tree invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("the tree owning this node was dropped")]
    Dropped,
    #[error("node {0:?} does not exist")]
    Missing(NodeId),
    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),
    #[error("attaching node {0:?} would create a cycle")]
    Cycle(NodeId),
}

/// Slotmap-backed ID-tree.
///
/// Always contains at least a root node.
#[derive(Debug)]
pub struct Tree<T> {
    root: NodeId,
    sm: RefCell<SlotMap<NodeId, Node<T>>>,
}

#[derive(Debug)]
pub struct Node<T> {
    parent: NodeId,
    prev_sibling: NodeId,
    next_sibling: NodeId,
    children: (NodeId, NodeId),
    value: Rc<RefCell<T>>,
}

impl<T> Node<T> {
    pub fn new(value: T) -> Self {
        Node {
            parent: NodeId::null(),
            prev_sibling: NodeId::null(),
            next_sibling: NodeId::null(),
            children: (NodeId::null(), NodeId::null()),
            value: Rc::new(RefCell::new(value)),
        }
    }

    pub fn value(&self) -> Ref<'_, T> {
        self.value.borrow()
    }

    pub fn value_mut(&self) -> RefMut<'_, T> {
        self.value.borrow_mut()
    }
}

impl<T> Tree<T> {
    /// Creates a tree with a root node.
    pub fn new(root: T) -> Rc<Self> {
        Self::with_capacity(root, 0)
    }

    /// Creates a tree with a root node and the specified capacity.
    pub fn with_capacity(root: T, capacity: usize) -> Rc<Self> {
        let mut sm = SlotMap::with_capacity_and_key(capacity);
        let root = sm.insert(Node::new(root));
        Rc::new(Tree {
            root,
            sm: RefCell::new(sm),
        })
    }

    /// Returns a reference to the specified node.
    pub fn get(self: &Rc<Self>, id: NodeId) -> Option<NodeRef<T>> {
        self.sm.borrow().contains_key(id).then(|| NodeRef {
            id,
            tree: Rc::downgrade(self),
        })
    }

    /// Returns a reference to the root node.
    pub fn root(self: &Rc<Self>) -> NodeRef<T> {
        NodeRef {
            id: self.root,
            tree: Rc::downgrade(self),
        }
    }

    /// Creates an orphan node.
    pub fn orphan(self: &Rc<Self>, value: T) -> NodeId {
        self.sm.borrow_mut().insert(Node::new(value))
    }

    /// Number of nodes stored in the arena, orphans and detached nodes included.
    pub fn len(&self) -> usize {
        self.sm.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn link(&self, id: NodeId, f: impl FnOnce(&Node<T>) -> NodeId) -> NodeId {
        self.sm.borrow().get(id).map(f).unwrap_or_else(NodeId::null)
    }

    fn update(&self, id: NodeId, f: impl FnOnce(&mut Node<T>)) {
        if let Some(node) = self.sm.borrow_mut().get_mut(id) {
            f(node);
        }
    }
}

/// Node reference.
#[derive(Debug)]
pub struct NodeRef<T> {
    id: NodeId,
    tree: Weak<Tree<T>>,
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            tree: self.tree.clone(),
        }
    }
}

impl<T> PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.tree.strong_count() > 0
            && other.tree.strong_count() > 0
            && Weak::ptr_eq(&self.tree, &other.tree)
    }
}

impl<T> NodeRef<T> {
    /// Returns the ID of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the tree this node belongs to, if it is still alive.
    pub fn tree(&self) -> Option<Rc<Tree<T>>> {
        self.tree.upgrade()
    }

    /// Returns the result of map_fn applied to the value of this node.
    pub fn map_value<F, R>(&self, map_fn: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let tree = self.tree.upgrade()?;
        let value = tree.sm.borrow().get(self.id).map(|node| node.value.clone())?;
        let value = value.borrow();
        Some(map_fn(&*value))
    }

    /// Update the value of this node.
    pub fn update_value<F>(&self, update_fn: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let value = self
            .tree
            .upgrade()
            .and_then(|tree| tree.sm.borrow().get(self.id).map(|node| node.value.clone()));
        match value {
            Some(value) => {
                update_fn(&mut *value.borrow_mut());
                true
            }
            None => false,
        }
    }

    fn relative(&self, f: impl FnOnce(&Node<T>) -> NodeId) -> Option<Self> {
        let tree = self.tree.upgrade()?;
        let id = tree.link(self.id, f);
        tree.get(id)
    }

    /// Returns the parent of this node.
    pub fn parent(&self) -> Option<Self> {
        self.relative(|node| node.parent)
    }

    /// Returns the previous sibling of this node.
    pub fn prev_sibling(&self) -> Option<Self> {
        self.relative(|node| node.prev_sibling)
    }

    /// Returns the next sibling of this node.
    pub fn next_sibling(&self) -> Option<Self> {
        self.relative(|node| node.next_sibling)
    }

    /// Returns the first child of this node.
    pub fn first_child(&self) -> Option<Self> {
        self.relative(|node| node.children.0)
    }

    /// Returns the last child of this node.
    pub fn last_child(&self) -> Option<Self> {
        self.relative(|node| node.children.1)
    }

    /// Returns true if this node has children.
    pub fn has_children(&self) -> bool {
        self.first_child().is_some()
    }

    /// Distance from the root of the subtree this node is attached to.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Length of the longest chain of descendants below this node, 0 for a leaf.
    pub fn height(&self) -> usize {
        let mut current = 0usize;
        let mut highest = 0usize;
        for edge in self.traverse() {
            match edge {
                iter::Edge::Open(_) => {
                    highest = highest.max(current);
                    current += 1;
                }
                iter::Edge::Close(_) => current -= 1,
            }
        }
        highest
    }

    /// Detaches this node from its parent.
    ///
    /// The node and its subtree stay in the arena as an orphan.
    pub fn detach(&mut self) {
        let Some(tree) = self.tree.upgrade() else {
            return;
        };
        let (parent_id, prev_id, next_id) = match tree.sm.borrow().get(self.id) {
            Some(node) => (node.parent, node.prev_sibling, node.next_sibling),
            None => return,
        };
        if parent_id.is_null() {
            return;
        }

        tree.update(self.id, |node| {
            node.parent = NodeId::null();
            node.prev_sibling = NodeId::null();
            node.next_sibling = NodeId::null();
        });
        tree.update(prev_id, |prev| prev.next_sibling = next_id);
        tree.update(next_id, |next| next.prev_sibling = prev_id);
        tree.update(parent_id, |parent| {
            let (first, last) = parent.children;
            if first == self.id {
                parent.children.0 = next_id;
            }
            if last == self.id {
                parent.children.1 = prev_id;
            }
        });
    }

    /// Appends a new child to this node.
    pub fn append(&mut self, value: T) -> Result<NodeRef<T>, TreeError> {
        let tree = self.tree.upgrade().ok_or(TreeError::Dropped)?;
        let new_child_id = tree.orphan(value);
        self.append_id(new_child_id)
    }

    /// Appends an orphan node as the last child of this node.
    ///
    /// Fails if the node already has a parent or is an ancestor of this node.
    pub fn append_id(&mut self, new_child_id: NodeId) -> Result<NodeRef<T>, TreeError> {
        let tree = self.tree.upgrade().ok_or(TreeError::Dropped)?;
        let current_parent = tree
            .sm
            .borrow()
            .get(new_child_id)
            .map(|node| node.parent)
            .ok_or(TreeError::Missing(new_child_id))?;
        if !current_parent.is_null() {
            return Err(TreeError::AlreadyAttached(new_child_id));
        }
        if new_child_id == self.id || self.ancestors().any(|a| a.id == new_child_id) {
            return Err(TreeError::Cycle(new_child_id));
        }

        let last_child_id = tree.link(self.id, |node| node.children.1);
        tree.update(new_child_id, |child| {
            child.parent = self.id;
            child.prev_sibling = last_child_id;
        });
        tree.update(last_child_id, |last| last.next_sibling = new_child_id);
        tree.update(self.id, |this| {
            if this.children.0.is_null() {
                this.children.0 = new_child_id;
            }
            this.children.1 = new_child_id;
        });

        tree.get(new_child_id).ok_or(TreeError::Missing(new_child_id))
    }

    /// Inserts a new sibling before this node.
    pub fn insert_before(&mut self, value: T) -> Result<NodeRef<T>, TreeError> {
        let tree = self.tree.upgrade().ok_or(TreeError::Dropped)?;
        let new_sibling_id = tree.orphan(value);
        self.insert_id_before(new_sibling_id)
    }

    /// Inserts an orphan node as the sibling right before this node.
    ///
    /// A node without parent has no siblings: the call fails with `Missing`.
    pub fn insert_id_before(&mut self, new_sibling_id: NodeId) -> Result<NodeRef<T>, TreeError> {
        let tree = self.tree.upgrade().ok_or(TreeError::Dropped)?;
        let parent = self.parent().ok_or(TreeError::Missing(self.id))?;
        let current_parent = tree
            .sm
            .borrow()
            .get(new_sibling_id)
            .map(|node| node.parent)
            .ok_or(TreeError::Missing(new_sibling_id))?;
        if !current_parent.is_null() {
            return Err(TreeError::AlreadyAttached(new_sibling_id));
        }
        if new_sibling_id == self.id || self.ancestors().any(|a| a.id == new_sibling_id) {
            return Err(TreeError::Cycle(new_sibling_id));
        }

        let prev_sibling_id = tree.link(self.id, |node| node.prev_sibling);
        tree.update(new_sibling_id, |sibling| {
            sibling.parent = parent.id;
            sibling.prev_sibling = prev_sibling_id;
            sibling.next_sibling = self.id;
        });
        tree.update(prev_sibling_id, |prev| prev.next_sibling = new_sibling_id);
        tree.update(self.id, |this| this.prev_sibling = new_sibling_id);
        tree.update(parent.id, |parent| {
            if parent.children.0 == self.id {
                parent.children.0 = new_sibling_id;
            }
        });

        tree.get(new_sibling_id).ok_or(TreeError::Missing(new_sibling_id))
    }

    /// Moves the children of `from_id` to the end of this node's children.
    pub fn reparent_from_id_append(&mut self, from_id: NodeId) {
        let Some(tree) = self.tree.upgrade() else {
            return;
        };
        let moved: Vec<NodeId> = match tree.get(from_id) {
            Some(from) => from.children().map(|child| child.id).collect(),
            None => return,
        };
        for id in moved {
            if let Some(mut child) = tree.get(id) {
                child.detach();
            }
            // Only fails for a `from_id` that is an ancestor of `self`.
            self.append_id(id).ok();
        }
    }
}

/// Creates a tree from expressions.
///
/// # Examples
///
/// ```
/// # use tocrawl_tree::tree;
/// let tree = tree! {
///     "root" => {
///         "child a",
///         "child b" => {
///             "grandchild a",
///             "grandchild b",
///         },
///         "child c",
///     }
/// };
/// assert_eq!(tree.root().height(), 2);
/// ```
#[macro_export]
macro_rules! tree {
    (@ $n:ident { }) => { };

    // Last leaf.
    (@ $n:ident { $value:expr }) => {
        { $n.append($value).unwrap(); }
    };

    // Leaf.
    (@ $n:ident { $value:expr, $($tail:tt)* }) => {
        {
            $n.append($value).unwrap();
            tree!(@ $n { $($tail)* });
        }
    };

    // Last node with children.
    (@ $n:ident { $value:expr => $children:tt }) => {
        {
            let mut node = $n.append($value).unwrap();
            tree!(@ node $children);
        }
    };

    // Node with children.
    (@ $n:ident { $value:expr => $children:tt, $($tail:tt)* }) => {
        {
            {
                let mut node = $n.append($value).unwrap();
                tree!(@ node $children);
            }
            tree!(@ $n { $($tail)* });
        }
    };

    ($root:expr) => { $crate::Tree::new($root) };

    ($root:expr => $children:tt) => {
        {
            let tree = $crate::Tree::new($root);
            {
                let mut node = tree.root();
                tree!(@ node $children);
            }
            tree
        }
    };
}
