//! Assignment of invariants and operators to the nodes of a shape
//!
//! Nodes are labeled in postorder. Leaves take distinct invariants, unary
//! nodes any unary operator and binary nodes any noncommutative operator.
//! A commutative operator is only placed when the left operand is the
//! "bigger" one, so each pair of mirrored operands is produced once.

use super::{Arity, ContentLabel, LabelKind, NodeId, Tree};
use crate::cancel::CancellationToken;
use crate::semantics::operators::OperatorSet;

/// Enumerates every labeling of a shape
#[derive(Debug, Clone)]
pub struct LabelAssigner {
    unary: Vec<usize>,
    commutative: Vec<usize>,
    noncommutative: Vec<usize>,
    invariant_count: usize,
    used: Vec<bool>,
    order: Vec<NodeId>,
    sizes: Vec<usize>,
}

impl LabelAssigner {
    /// `excluded_invariant` is never placed on a leaf; the search uses it to
    /// keep the main invariant out of its own bounds.
    pub fn new(
        operators: &OperatorSet,
        invariant_count: usize,
        excluded_invariant: Option<usize>,
    ) -> Self {
        let mut used = vec![false; invariant_count];
        if let Some(excluded) = excluded_invariant {
            if excluded < invariant_count {
                used[excluded] = true;
            }
        }
        Self {
            unary: operators.unary.clone(),
            commutative: operators.commutative.clone(),
            noncommutative: operators.noncommutative.clone(),
            invariant_count,
            used,
            order: Vec::new(),
            sizes: Vec::new(),
        }
    }

    /// Number of invariants that may appear on leaves.
    pub fn available_invariants(&self) -> usize {
        self.used.iter().filter(|used| !**used).count()
    }

    /// Call `on_expression` once per labeling of the current shape.
    pub fn assign<F>(&mut self, tree: &mut Tree, cancel: &CancellationToken, on_expression: &mut F)
    where
        F: FnMut(&Tree),
    {
        tree.postorder_into(&mut self.order);

        self.sizes.clear();
        for &id in &self.order {
            let node = tree.node(id);
            let size = 1
                + node.left().map_or(0, |c| self.sizes[tree.node(c).pos()])
                + node.right().map_or(0, |c| self.sizes[tree.node(c).pos()]);
            self.sizes.push(size);
        }

        self.label_from(0, tree, cancel, on_expression);
    }

    fn label_from<F>(
        &mut self,
        pos: usize,
        tree: &mut Tree,
        cancel: &CancellationToken,
        on_expression: &mut F,
    ) where
        F: FnMut(&Tree),
    {
        if pos == self.order.len() {
            on_expression(tree);
            return;
        }

        let id = self.order[pos];
        match tree.node(id).arity() {
            Arity::Leaf => {
                for invariant in 0..self.invariant_count {
                    if self.used[invariant] {
                        continue;
                    }
                    self.used[invariant] = true;
                    tree.set_label(id, ContentLabel::new(LabelKind::Invariant, invariant));
                    self.label_from(pos + 1, tree, cancel, on_expression);
                    self.used[invariant] = false;
                    if cancel.is_cancelled() {
                        return;
                    }
                }
            }
            Arity::Unary => {
                for i in 0..self.unary.len() {
                    let label = ContentLabel::new(LabelKind::Unary, self.unary[i]);
                    tree.set_label(id, label);
                    self.label_from(pos + 1, tree, cancel, on_expression);
                    if cancel.is_cancelled() {
                        return;
                    }
                }
            }
            Arity::Binary => {
                for i in 0..self.noncommutative.len() {
                    let label =
                        ContentLabel::new(LabelKind::NonCommutativeBinary, self.noncommutative[i]);
                    tree.set_label(id, label);
                    self.label_from(pos + 1, tree, cancel, on_expression);
                    if cancel.is_cancelled() {
                        return;
                    }
                }
                if !self.left_side_biggest(tree, id) {
                    return;
                }
                for i in 0..self.commutative.len() {
                    let label =
                        ContentLabel::new(LabelKind::CommutativeBinary, self.commutative[i]);
                    tree.set_label(id, label);
                    self.label_from(pos + 1, tree, cancel, on_expression);
                    if cancel.is_cancelled() {
                        return;
                    }
                }
            }
        }
    }

    /// Canonical operand order for commutative operators: the left subtree
    /// is at least as large, and on equal size its postorder label sequence
    /// is not smaller.
    fn left_side_biggest(&self, tree: &Tree, id: NodeId) -> bool {
        let node = tree.node(id);
        let (Some(left), Some(right)) = (node.left(), node.right()) else {
            panic!("commutative check on a node without two children");
        };
        let left_end = tree.node(left).pos();
        let right_end = tree.node(right).pos();
        let left_size = self.sizes[left_end];
        let right_size = self.sizes[right_end];

        if left_size != right_size {
            return left_size > right_size;
        }

        let left_start = left_end + 1 - left_size;
        let right_start = right_end + 1 - right_size;
        for offset in 0..left_size {
            let l = tree.node(self.order[left_start + offset]).label();
            let r = tree.node(self.order[right_start + offset]).label();
            if l != r {
                return l > r;
            }
        }
        true
    }
}
