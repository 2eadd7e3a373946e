use std::collections::VecDeque;

use crate::NodeRef;

macro_rules! axis_iterators {
    ($(#[$m:meta] $i:ident($f:path);)*) => {
        $(
            #[$m]
            #[derive(Debug, Clone)]
            pub struct $i<T>(Option<NodeRef<T>>);

            impl<T> Iterator for $i<T> {
                type Item = NodeRef<T>;

                fn next(&mut self) -> Option<Self::Item> {
                    let node = self.0.take();
                    self.0 = node.as_ref().and_then($f);
                    node
                }
            }
        )*
    };
}

axis_iterators! {
    /// Iterator over ancestors.
    Ancestors(NodeRef::parent);

    /// Iterator over previous siblings.
    PrevSiblings(NodeRef::prev_sibling);

    /// Iterator over next siblings.
    NextSiblings(NodeRef::next_sibling);
}

/// Iterator over children.
#[derive(Debug)]
pub struct Children<T> {
    front: Option<NodeRef<T>>,
    back: Option<NodeRef<T>>,
}

impl<T> Clone for Children<T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
        }
    }
}

impl<T> Iterator for Children<T> {
    type Item = NodeRef<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front.take();
        if node == self.back {
            self.back = None;
        } else {
            self.front = node.as_ref().and_then(NodeRef::next_sibling);
        }
        node
    }
}

impl<T> DoubleEndedIterator for Children<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.back.take();
        if node == self.front {
            self.front = None;
        } else {
            self.back = node.as_ref().and_then(NodeRef::prev_sibling);
        }
        node
    }
}

/// Open or close edge of a node.
#[derive(Debug)]
pub enum Edge<T> {
    /// Open.
    Open(NodeRef<T>),
    /// Close.
    Close(NodeRef<T>),
}

impl<T> Clone for Edge<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Close(node) => Self::Close(node.clone()),
            Self::Open(node) => Self::Open(node.clone()),
        }
    }
}

impl<T> PartialEq for Edge<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Edge::Open(a), Edge::Open(b)) | (Edge::Close(a), Edge::Close(b)) => a == b,
            _ => false,
        }
    }
}

/// Iterator which traverses a subtree.
#[derive(Debug)]
pub struct Traverse<T> {
    root: NodeRef<T>,
    edge: Option<Edge<T>>,
    done: bool,
}

impl<T> Clone for Traverse<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            edge: self.edge.clone(),
            done: self.done,
        }
    }
}

impl<T> Iterator for Traverse<T> {
    type Item = Edge<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.edge = match self.edge.take() {
            None => Some(Edge::Open(self.root.clone())),
            Some(Edge::Open(node)) => match node.first_child() {
                Some(first_child) => Some(Edge::Open(first_child)),
                None => Some(Edge::Close(node)),
            },
            Some(Edge::Close(node)) => {
                if node == self.root {
                    None
                } else if let Some(next_sibling) = node.next_sibling() {
                    Some(Edge::Open(next_sibling))
                } else {
                    node.parent().map(Edge::Close)
                }
            }
        };

        self.done = self.edge.is_none();
        self.edge.clone()
    }
}

/// Pre-order iterator over a node and its descendants.
#[derive(Debug)]
pub struct Descendants<T>(Traverse<T>);

impl<T> Clone for Descendants<T> {
    fn clone(&self) -> Self {
        Descendants(self.0.clone())
    }
}

impl<T> Iterator for Descendants<T> {
    type Item = NodeRef<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.find_map(|edge| match edge {
            Edge::Open(node) => Some(node),
            Edge::Close(_) => None,
        })
    }
}

/// Level-order iterator over a node and its descendants.
#[derive(Debug)]
pub struct BreadthFirst<T> {
    queue: VecDeque<NodeRef<T>>,
}

impl<T> Clone for BreadthFirst<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<T> Iterator for BreadthFirst<T> {
    type Item = NodeRef<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children());
        Some(node)
    }
}

impl<T> NodeRef<T> {
    /// Returns an iterator over ancestors.
    pub fn ancestors(&self) -> Ancestors<T> {
        Ancestors(self.parent())
    }

    /// Returns an iterator over previous siblings.
    pub fn prev_siblings(&self) -> PrevSiblings<T> {
        PrevSiblings(self.prev_sibling())
    }

    /// Returns an iterator over next siblings.
    pub fn next_siblings(&self) -> NextSiblings<T> {
        NextSiblings(self.next_sibling())
    }

    /// Returns an iterator over children.
    pub fn children(&self) -> Children<T> {
        Children {
            front: self.first_child(),
            back: self.last_child(),
        }
    }

    /// Returns an iterator which traverses the subtree starting at this node.
    pub fn traverse(&self) -> Traverse<T> {
        Traverse {
            root: self.clone(),
            edge: None,
            done: false,
        }
    }

    /// Returns a pre-order iterator over this node and its descendants.
    pub fn descendants(&self) -> Descendants<T> {
        Descendants(self.traverse())
    }

    /// Returns a level-order iterator over this node and its descendants.
    pub fn breadth_first(&self) -> BreadthFirst<T> {
        BreadthFirst {
            queue: VecDeque::from([self.clone()]),
        }
    }
}
