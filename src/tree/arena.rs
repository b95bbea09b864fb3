//! Fixed-capacity node pool backing expression trees
//!
//! Every node a search will ever need is built up front. Nodes move between
//! the free list and a parent's child slot by handle, so attaching and
//! detaching are O(1) and nothing is allocated while enumerating.

use super::{Arity, ContentLabel};

/// Handle of a node inside a [`NodeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A tree node: up to two children, its depth, its postorder position and
/// the label assigned during labeling.
#[derive(Debug, Clone, Default)]
pub struct Node {
    left: Option<NodeId>,
    right: Option<NodeId>,
    depth: usize,
    pos: usize,
    label: Option<ContentLabel>,
}

impl Node {
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Arity follows from the children present.
    pub fn arity(&self) -> Arity {
        match (self.left, self.right) {
            (None, _) => Arity::Leaf,
            (Some(_), None) => Arity::Unary,
            (Some(_), Some(_)) => Arity::Binary,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Postorder position, valid after [`super::Tree::postorder_into`].
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn label(&self) -> Option<ContentLabel> {
        self.label
    }
}

/// Pool of pre-built nodes with an explicit free list
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl NodeArena {
    /// Build `capacity` nodes, all free.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity <= u32::MAX as usize, "arena capacity too large");
        let nodes = vec![Node::default(); capacity];
        // Reverse so the lowest handles are handed out first.
        let free = (0..capacity as u32).rev().map(NodeId).collect();
        Self { nodes, free }
    }

    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Take a free node out of the pool.
    ///
    /// Panics when the pool is empty: the arena is sized for the largest
    /// configured tree, so exhaustion is a broken precondition.
    pub fn acquire(&mut self) -> NodeId {
        match self.free.pop() {
            Some(id) => id,
            None => panic!(
                "node arena exhausted (capacity {})",
                self.nodes.len()
            ),
        }
    }

    /// Return a detached node to the pool.
    pub fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.index()];
        assert!(
            node.left.is_none() && node.right.is_none(),
            "released node {:?} still has children",
            id
        );
        node.depth = 0;
        node.pos = 0;
        node.label = None;
        debug_assert!(self.free.len() < self.nodes.len(), "node released twice");
        self.free.push(id);
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Attach `child` as the next child of `parent` (left first, then right).
    pub fn link(&mut self, parent: NodeId, child: NodeId) {
        let depth = self.nodes[parent.index()].depth + 1;
        let parent_node = &mut self.nodes[parent.index()];
        if parent_node.left.is_none() {
            parent_node.left = Some(child);
        } else if parent_node.right.is_none() {
            parent_node.right = Some(child);
        } else {
            panic!("node {:?} already has two children", parent);
        }
        self.nodes[child.index()].depth = depth;
    }

    /// Detach the most recently attached child of `parent` (right first).
    pub fn unlink(&mut self, parent: NodeId) -> NodeId {
        let parent_node = &mut self.nodes[parent.index()];
        if let Some(child) = parent_node.right.take() {
            child
        } else if let Some(child) = parent_node.left.take() {
            child
        } else {
            panic!("node {:?} has no children", parent);
        }
    }

    pub(crate) fn set_pos(&mut self, id: NodeId, pos: usize) {
        self.nodes[id.index()].pos = pos;
    }

    pub(crate) fn set_label(&mut self, id: NodeId, label: ContentLabel) {
        self.nodes[id.index()].label = Some(label);
    }
}
