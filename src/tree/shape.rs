//! Canonical enumeration of unlabeled tree shapes
//!
//! Shapes are grown level by level. A new child may only go below the
//! trailing part of the level above the deepest one, or below any node of
//! the deepest level. Restricting attachment points this way produces every
//! ordered unary/binary tree exactly once.

use std::fmt;

use super::{Arity, NodeId, Tree};
use crate::cancel::CancellationToken;

/// Number of unary and binary operators in an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShapeBudget {
    pub unary: usize,
    pub binary: usize,
}

impl ShapeBudget {
    pub fn new(unary: usize, binary: usize) -> Self {
        Self { unary, binary }
    }

    /// Total node count of a tree with this budget.
    pub fn node_count(&self) -> usize {
        self.unary + 2 * self.binary + 1
    }

    /// Leaves (invariant slots) of a tree with this budget.
    pub fn leaf_count(&self) -> usize {
        self.binary + 1
    }

    /// Edge count, used to order budgets from simple to complex.
    pub fn complexity(&self) -> usize {
        self.unary + 2 * self.binary
    }
}

impl fmt::Display for ShapeBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} unary, {} binary)", self.unary, self.binary)
    }
}

/// Call `on_shape` once for every distinct shape with exactly the budgeted
/// number of unary and binary nodes.
///
/// The tree must be bare on entry and is bare again on return, including
/// when the search is cancelled part way through.
pub fn enumerate_shapes<F>(
    tree: &mut Tree,
    budget: ShapeBudget,
    cancel: &CancellationToken,
    on_shape: &mut F,
) where
    F: FnMut(&mut Tree),
{
    assert!(tree.is_bare(), "shape enumeration needs a bare tree");

    if budget.unary == 0 && budget.binary == 0 {
        on_shape(tree);
        return;
    }

    let root = tree.root();
    tree.add_child(root);
    grow(tree, budget, cancel, on_shape);
    tree.remove_child(root);
}

fn grow<F>(tree: &mut Tree, target: ShapeBudget, cancel: &CancellationToken, on_shape: &mut F)
where
    F: FnMut(&mut Tree),
{
    // One more unary node is fine: the next attachment can turn it binary.
    if tree.binary_count() > target.binary || tree.unary_count() > target.unary + 1 {
        return;
    }
    if tree.unary_count() == target.unary && tree.binary_count() == target.binary {
        on_shape(tree);
        return;
    }

    let depth = tree.depth();
    let above = depth - 1;
    let first = canonical_start(tree, above);

    for i in first..tree.level(above).len() {
        let parent = tree.level(above)[i];
        if try_attach(tree, parent, target, cancel, on_shape) {
            return;
        }
    }

    for i in 0..tree.level(depth).len() {
        let parent = tree.level(depth)[i];
        if try_attach(tree, parent, target, cancel, on_shape) {
            return;
        }
    }
}

/// Attach a child below `parent`, recurse and detach again.
/// Returns true when the search was cancelled.
fn try_attach<F>(
    tree: &mut Tree,
    parent: NodeId,
    target: ShapeBudget,
    cancel: &CancellationToken,
    on_shape: &mut F,
) -> bool
where
    F: FnMut(&mut Tree),
{
    tree.add_child(parent);
    grow(tree, target, cancel, on_shape);
    tree.remove_child(parent);
    cancel.is_cancelled()
}

/// First index in `level` that may still receive a child: walk back from the
/// right over leaves, then over at most one unary node.
fn canonical_start(tree: &Tree, level: usize) -> usize {
    let nodes = tree.level(level);
    let mut start = nodes.len();
    while start > 0 && tree.node(nodes[start - 1]).arity() == Arity::Leaf {
        start -= 1;
    }
    if start > 0 && tree.node(nodes[start - 1]).arity() == Arity::Unary {
        start -= 1;
    }
    start
}

/// Number of shapes with the given budget.
pub fn count_shapes(budget: ShapeBudget) -> u64 {
    let mut tree = Tree::new(budget.unary, budget.binary);
    let mut count = 0u64;
    enumerate_shapes(&mut tree, budget, &CancellationToken::new(), &mut |_| {
        count += 1;
    });
    count
}
