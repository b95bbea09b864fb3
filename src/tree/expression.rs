//! Owned snapshots of labeled trees

use super::{Arity, ContentLabel, LabelKind, NodeId, ShapeBudget, Tree};

/// A labeled tree stored as its postorder label sequence.
///
/// Each label's kind fixes its arity, so the sequence alone determines the
/// tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression {
    labels: Vec<ContentLabel>,
}

impl Expression {
    /// Copy the labels of a fully labeled tree.
    pub fn capture(tree: &Tree) -> Self {
        let mut labels = Vec::with_capacity(tree.node_count());
        push_postorder(tree, tree.root(), &mut labels);
        Self { labels }
    }

    /// Build an expression from a postorder label sequence.
    ///
    /// Panics if the sequence does not describe exactly one tree.
    pub fn from_postorder(labels: Vec<ContentLabel>) -> Self {
        let mut depth = 0usize;
        for label in &labels {
            let arity = label.kind.arity().child_count();
            assert!(depth >= arity, "operator {:?} is missing operands", label);
            depth = depth - arity + 1;
        }
        assert_eq!(depth, 1, "postorder sequence does not form a single tree");
        Self { labels }
    }

    pub fn labels(&self) -> &[ContentLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Operator counts of the expression.
    pub fn budget(&self) -> ShapeBudget {
        let mut budget = ShapeBudget::default();
        for label in &self.labels {
            match label.kind {
                LabelKind::Invariant => {}
                LabelKind::Unary => budget.unary += 1,
                LabelKind::CommutativeBinary | LabelKind::NonCommutativeBinary => {
                    budget.binary += 1
                }
            }
        }
        budget
    }

    /// Rebuild a labeled tree with exactly this expression's nodes.
    pub fn to_tree(&self) -> Tree {
        let budget = self.budget();
        let mut tree = Tree::new(budget.unary, budget.binary);

        // start[i] is the first postorder index of the subtree rooted at i
        let mut start = Vec::with_capacity(self.labels.len());
        for (index, label) in self.labels.iter().enumerate() {
            let first = match label.kind.arity() {
                Arity::Leaf => index,
                Arity::Unary => start[index - 1],
                Arity::Binary => start[start[index - 1] - 1],
            };
            start.push(first);
        }

        let root = tree.root();
        self.attach(&mut tree, root, &start, self.labels.len() - 1);
        tree
    }

    fn attach(&self, tree: &mut Tree, id: NodeId, start: &[usize], index: usize) {
        let label = self.labels[index];
        match label.kind.arity() {
            Arity::Leaf => {}
            Arity::Unary => {
                let child = tree.add_child(id);
                self.attach(tree, child, start, index - 1);
            }
            Arity::Binary => {
                let left = tree.add_child(id);
                let right = tree.add_child(id);
                self.attach(tree, left, start, start[index - 1] - 1);
                self.attach(tree, right, start, index - 1);
            }
        }
        tree.set_label(id, label);
    }

    /// Invariant indices in leaf order.
    pub fn invariants(&self) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .filter(|label| label.kind == LabelKind::Invariant)
            .map(|label| label.id)
    }
}

fn push_postorder(tree: &Tree, id: NodeId, labels: &mut Vec<ContentLabel>) {
    let node = tree.node(id);
    if let Some(left) = node.left() {
        push_postorder(tree, left, labels);
    }
    if let Some(right) = node.right() {
        push_postorder(tree, right, labels);
    }
    match node.label() {
        Some(label) => labels.push(label),
        None => panic!("captured tree has an unlabeled node {:?}", id),
    }
}
