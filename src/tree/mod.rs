//! Expression trees over a fixed node pool
//!
//! A [`Tree`] owns a [`NodeArena`] and a permanent root. Besides the nodes it
//! keeps, for every depth, the ordered list of nodes currently at that depth
//! plus running unary/binary counts. The shape enumerator relies on these
//! tables to find legal attachment points without walking the tree.

pub mod arena;
pub mod expression;
pub mod labeling;
pub mod shape;

pub use arena::{Node, NodeArena, NodeId};
pub use expression::Expression;
pub use labeling::LabelAssigner;
pub use shape::{count_shapes, enumerate_shapes, ShapeBudget};

use std::fmt;

/// Number of children a node has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Leaf,
    Unary,
    Binary,
}

impl Arity {
    pub fn child_count(self) -> usize {
        match self {
            Arity::Leaf => 0,
            Arity::Unary => 1,
            Arity::Binary => 2,
        }
    }
}

/// What a label refers to. The declaration order is the order used when
/// label sequences are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelKind {
    Invariant,
    Unary,
    CommutativeBinary,
    NonCommutativeBinary,
}

impl LabelKind {
    /// Arity of the nodes that may carry this kind of label.
    pub fn arity(self) -> Arity {
        match self {
            LabelKind::Invariant => Arity::Leaf,
            LabelKind::Unary => Arity::Unary,
            LabelKind::CommutativeBinary | LabelKind::NonCommutativeBinary => Arity::Binary,
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Invariant => write!(f, "invariant"),
            LabelKind::Unary => write!(f, "unary"),
            LabelKind::CommutativeBinary => write!(f, "commutative-binary"),
            LabelKind::NonCommutativeBinary => write!(f, "noncommutative-binary"),
        }
    }
}

/// Content of a labeled node: an invariant index or an operator id of the
/// given kind. Ordered by kind first, then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentLabel {
    pub kind: LabelKind,
    pub id: usize,
}

impl ContentLabel {
    pub fn new(kind: LabelKind, id: usize) -> Self {
        Self { kind, id }
    }
}

/// Mutable expression tree with per-depth index tables
#[derive(Debug)]
pub struct Tree {
    arena: NodeArena,
    root: NodeId,
    levels: Vec<Vec<NodeId>>,
    depth: usize,
    unary_count: usize,
    binary_count: usize,
}

impl Tree {
    /// Create a bare tree able to hold `max_unary` unary and `max_binary`
    /// binary nodes.
    pub fn new(max_unary: usize, max_binary: usize) -> Self {
        let capacity = max_unary + 2 * max_binary + 1;
        let mut arena = NodeArena::with_capacity(capacity);
        let root = arena.acquire();

        let mut levels: Vec<Vec<NodeId>> =
            (0..capacity).map(|_| Vec::with_capacity(capacity)).collect();
        levels[0].push(root);

        Self {
            arena,
            root,
            levels,
            depth: 0,
            unary_count: 0,
            binary_count: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.node(id)
    }

    /// Deepest occupied level (root is depth 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn unary_count(&self) -> usize {
        self.unary_count
    }

    pub fn binary_count(&self) -> usize {
        self.binary_count
    }

    pub fn node_count(&self) -> usize {
        self.arena.capacity() - self.arena.free_count()
    }

    /// Nodes currently at `depth`, in attachment order.
    pub fn level(&self, depth: usize) -> &[NodeId] {
        &self.levels[depth]
    }

    pub fn budget(&self) -> ShapeBudget {
        ShapeBudget::new(self.unary_count, self.binary_count)
    }

    /// True when only the root is present.
    pub fn is_bare(&self) -> bool {
        self.unary_count == 0 && self.binary_count == 0
    }

    /// Take a node from the pool and attach it as the next child of `parent`.
    pub fn add_child(&mut self, parent: NodeId) -> NodeId {
        let child = self.arena.acquire();
        self.arena.link(parent, child);

        match self.arena.node(parent).arity() {
            Arity::Binary => {
                self.unary_count -= 1;
                self.binary_count += 1;
            }
            Arity::Unary => self.unary_count += 1,
            Arity::Leaf => unreachable!("parent has a child after linking"),
        }

        let depth = self.arena.node(child).depth();
        if depth > self.depth {
            self.depth = depth;
        }
        self.levels[depth].push(child);
        child
    }

    /// Detach the last child of `parent` and return it to the pool.
    pub fn remove_child(&mut self, parent: NodeId) {
        let child = self.arena.unlink(parent);

        match self.arena.node(parent).arity() {
            Arity::Unary => {
                self.binary_count -= 1;
                self.unary_count += 1;
            }
            Arity::Leaf => self.unary_count -= 1,
            Arity::Binary => unreachable!("parent still has two children after unlinking"),
        }

        let depth = self.arena.node(child).depth();
        let popped = self.levels[depth].pop();
        debug_assert_eq!(popped, Some(child), "level list out of sync");
        if self.levels[depth].is_empty() && depth == self.depth {
            self.depth -= 1;
        }
        self.arena.release(child);
    }

    /// Fill `order` with the nodes in postorder and record each node's
    /// position.
    pub fn postorder_into(&mut self, order: &mut Vec<NodeId>) {
        order.clear();
        self.collect_postorder(self.root, order);
        for (pos, &id) in order.iter().enumerate() {
            self.arena.set_pos(id, pos);
        }
    }

    fn collect_postorder(&self, id: NodeId, order: &mut Vec<NodeId>) {
        let node = self.arena.node(id);
        if let Some(left) = node.left() {
            self.collect_postorder(left, order);
        }
        if let Some(right) = node.right() {
            self.collect_postorder(right, order);
        }
        order.push(id);
    }

    /// Arities of all nodes in postorder.
    pub fn postorder_arities(&self) -> Vec<Arity> {
        let mut order = Vec::with_capacity(self.node_count());
        self.collect_postorder(self.root, &mut order);
        order.iter().map(|&id| self.arena.node(id).arity()).collect()
    }

    /// Label a node. The label kind must fit the node's arity.
    pub fn set_label(&mut self, id: NodeId, label: ContentLabel) {
        let arity = self.arena.node(id).arity();
        assert_eq!(
            arity,
            label.kind.arity(),
            "{} label on a {:?} node",
            label.kind,
            arity
        );
        self.arena.set_label(id, label);
    }
}
