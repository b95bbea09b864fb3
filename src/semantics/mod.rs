//! Evaluation of labeled trees against a dataset
//!
//! The evaluator walks a labeled tree once per object and checks the result
//! against the main invariant. Numeric and property datasets share the same
//! walk; they differ in value type, operator table and comparator, which
//! are supplied through the [`Semantics`] trait.

pub mod dataset;
pub mod numeric;
pub mod operators;
pub mod property;
pub mod tristate;

pub use dataset::{check_dimensions, Dataset, MAX_INVARIANT_COUNT, MAX_OBJECT_COUNT};
pub use numeric::{NumericComparator, NumericSemantics};
pub use operators::{OperatorSet, OperatorTable, NUMERIC_OPERATORS, PROPERTY_OPERATORS};
pub use property::{PropertyComparator, PropertySemantics};
pub use tristate::TriState;

use std::fmt;

use crate::error::{ConjectureError, Result};
use crate::tree::{LabelKind, NodeId, Tree};

/// A per-object invariant value that may be missing
pub trait InvariantValue: Copy + PartialEq + fmt::Debug + fmt::Display {
    fn is_defined(&self) -> bool;
}

impl InvariantValue for f64 {
    fn is_defined(&self) -> bool {
        !self.is_nan()
    }
}

impl InvariantValue for TriState {
    fn is_defined(&self) -> bool {
        TriState::is_defined(*self)
    }
}

/// Outcome of the comparator for one object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Holds,
    Violated,
    /// A value is missing; the object takes no part in the check.
    Skipped,
}

/// Value domain, operators and comparator of one conjecturing mode
pub trait Semantics {
    type Value: InvariantValue + 'static;

    fn operators(&self) -> &'static OperatorTable<Self::Value>;

    /// Compare an expression value with the main invariant of one object.
    fn verdict(&self, value: Self::Value, main: Self::Value) -> Verdict;

    /// Whether a holding bound is exact for this object.
    fn is_exact(&self, value: Self::Value, main: Self::Value) -> bool {
        value == main
    }

    /// Comparator as written between expression and main invariant.
    fn comparator_symbol(&self) -> &'static str;

    /// Name of the mode, used in diagnostics.
    fn mode(&self) -> &'static str;

    /// The known theory must itself satisfy the comparator on every object.
    fn check_theory(&self, dataset: &Dataset<Self::Value>) -> Result<()> {
        let Some(theory) = dataset.theory() else {
            return Ok(());
        };
        for (object, &bound) in theory.iter().enumerate() {
            let main = dataset.main_value(object);
            if self.verdict(bound, main) == Verdict::Violated {
                return Err(ConjectureError::InconsistentTheory(format!(
                    "object {}: theory value {} {} main invariant {} does not hold",
                    object + 1,
                    bound,
                    self.comparator_symbol(),
                    main
                )));
            }
        }
        Ok(())
    }
}

/// Per-object result of evaluating one expression
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<V> {
    values: Vec<V>,
    hits: usize,
    skips: usize,
}

impl<V> Default for Evaluation<V> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            hits: 0,
            skips: 0,
        }
    }
}

impl<V: Copy> Evaluation<V> {
    pub fn with_capacity(object_count: usize) -> Self {
        Self {
            values: Vec::with_capacity(object_count),
            hits: 0,
            skips: 0,
        }
    }

    /// Wrap precomputed per-object values, e.g. to feed a selector directly.
    pub fn from_values(values: Vec<V>) -> Self {
        Self {
            values,
            hits: 0,
            skips: 0,
        }
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Objects where the expression equals the main invariant.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Objects left out because a value was missing.
    pub fn skips(&self) -> usize {
        self.skips
    }

    pub fn skip_fraction(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.skips as f64 / self.values.len() as f64
        }
    }

    fn clear(&mut self) {
        self.values.clear();
        self.hits = 0;
        self.skips = 0;
    }
}

/// Evaluates labeled trees against one dataset
#[derive(Debug)]
pub struct Evaluator<'a, S: Semantics> {
    semantics: S,
    dataset: &'a Dataset<S::Value>,
}

impl<'a, S: Semantics> Evaluator<'a, S> {
    pub fn new(semantics: S, dataset: &'a Dataset<S::Value>) -> Self {
        Self { semantics, dataset }
    }

    pub fn semantics(&self) -> &S {
        &self.semantics
    }

    pub fn dataset(&self) -> &'a Dataset<S::Value> {
        self.dataset
    }

    /// Value of the subtree at `id` for one object's invariant row.
    pub fn evaluate_node(&self, tree: &Tree, id: NodeId, row: &[S::Value]) -> S::Value {
        let node = tree.node(id);
        let Some(label) = node.label() else {
            panic!("evaluating unlabeled node {:?}", id);
        };
        let operators = self.semantics.operators();
        match label.kind {
            LabelKind::Invariant => row[label.id],
            LabelKind::Unary => {
                let operand = self.evaluate_node(tree, child(node.left()), row);
                (operators.unary(label.id).apply)(operand)
            }
            kind => {
                let left = self.evaluate_node(tree, child(node.left()), row);
                let right = self.evaluate_node(tree, child(node.right()), row);
                (operators.binary(kind, label.id).apply)(left, right)
            }
        }
    }

    /// Evaluate the tree for every object and check it against the main
    /// invariant.
    ///
    /// Returns false as soon as one object violates the comparator, or when
    /// every object had to be skipped. On success `evaluation` holds one
    /// value per object.
    pub fn evaluate_tree(&self, tree: &Tree, evaluation: &mut Evaluation<S::Value>) -> bool {
        evaluation.clear();
        let root = tree.root();

        for object in 0..self.dataset.object_count() {
            let value = self.evaluate_node(tree, root, self.dataset.row(object));
            let main = self.dataset.main_value(object);
            evaluation.values.push(value);

            match self.semantics.verdict(value, main) {
                Verdict::Violated => return false,
                Verdict::Skipped => evaluation.skips += 1,
                Verdict::Holds => {
                    if self.semantics.is_exact(value, main) {
                        evaluation.hits += 1;
                    }
                }
            }
        }

        evaluation.skips < evaluation.values.len()
    }
}

fn child(id: Option<NodeId>) -> NodeId {
    match id {
        Some(id) => id,
        None => panic!("operator node is missing an operand"),
    }
}
