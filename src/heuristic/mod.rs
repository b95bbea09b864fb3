//! Conjecture selection
//!
//! The evaluator accepts far more true expressions than anyone wants to
//! read. A selector sees every accepted expression, decides whether to keep
//! it, and tells the search when further expressions cannot help.

pub mod dalmatian;
pub mod grinvin;
pub mod property;

pub use dalmatian::Dalmatian;
pub use grinvin::Grinvin;
pub use property::PropertyDalmatian;

use std::marker::PhantomData;

use crate::error::{ConjectureError, Result};
use crate::search::config::Heuristic;
use crate::semantics::{
    Dataset, Evaluation, NumericComparator, PropertyComparator, TriState,
};
use crate::tree::{Expression, ShapeBudget, Tree};

/// Strategy deciding which true expressions become conjectures
pub trait ConjectureSelector<V> {
    /// Offer an expression the evaluator accepted. Returns true if it was
    /// retained.
    fn consider(&mut self, tree: &Tree, evaluation: &Evaluation<V>) -> bool;

    /// True once no expression of `budget` or beyond can improve the
    /// retained set.
    fn stop_condition_reached(&self, budget: ShapeBudget) -> bool;

    /// Retained conjectures in selector order.
    fn conjectures(&self) -> Vec<Expression>;
}

/// Keeps every accepted expression and never asks to stop.
#[derive(Debug)]
pub struct AllConjectures<V> {
    accepted: Vec<Expression>,
    _value: PhantomData<V>,
}

impl<V> Default for AllConjectures<V> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            _value: PhantomData,
        }
    }
}

impl<V> ConjectureSelector<V> for AllConjectures<V> {
    fn consider(&mut self, tree: &Tree, _evaluation: &Evaluation<V>) -> bool {
        self.accepted.push(Expression::capture(tree));
        true
    }

    fn stop_condition_reached(&self, _budget: ShapeBudget) -> bool {
        false
    }

    fn conjectures(&self) -> Vec<Expression> {
        self.accepted.clone()
    }
}

/// Selectors available for numeric datasets
#[derive(Debug)]
pub enum NumericSelector {
    All(AllConjectures<f64>),
    Dalmatian(Dalmatian),
    Grinvin(Grinvin),
}

impl NumericSelector {
    pub fn new(heuristic: Heuristic, dataset: &Dataset<f64>, comparator: NumericComparator) -> Self {
        match heuristic {
            Heuristic::None => NumericSelector::All(AllConjectures::default()),
            Heuristic::Dalmatian => NumericSelector::Dalmatian(Dalmatian::new(dataset, comparator)),
            Heuristic::Grinvin => NumericSelector::Grinvin(Grinvin::new(dataset)),
        }
    }
}

impl ConjectureSelector<f64> for NumericSelector {
    fn consider(&mut self, tree: &Tree, evaluation: &Evaluation<f64>) -> bool {
        match self {
            NumericSelector::All(selector) => selector.consider(tree, evaluation),
            NumericSelector::Dalmatian(selector) => selector.consider(tree, evaluation),
            NumericSelector::Grinvin(selector) => selector.consider(tree, evaluation),
        }
    }

    fn stop_condition_reached(&self, budget: ShapeBudget) -> bool {
        match self {
            NumericSelector::All(selector) => selector.stop_condition_reached(budget),
            NumericSelector::Dalmatian(selector) => selector.stop_condition_reached(budget),
            NumericSelector::Grinvin(selector) => selector.stop_condition_reached(budget),
        }
    }

    fn conjectures(&self) -> Vec<Expression> {
        match self {
            NumericSelector::All(selector) => selector.conjectures(),
            NumericSelector::Dalmatian(selector) => selector.conjectures(),
            NumericSelector::Grinvin(selector) => selector.conjectures(),
        }
    }
}

/// Selectors available for property datasets
#[derive(Debug)]
pub enum PropertySelector {
    All(AllConjectures<TriState>),
    Dalmatian(PropertyDalmatian),
}

impl PropertySelector {
    /// Grinvin measures numeric distance and has no property counterpart.
    pub fn new(
        heuristic: Heuristic,
        dataset: &Dataset<TriState>,
        comparator: PropertyComparator,
    ) -> Result<Self> {
        match heuristic {
            Heuristic::None => Ok(PropertySelector::All(AllConjectures::default())),
            Heuristic::Dalmatian => Ok(PropertySelector::Dalmatian(PropertyDalmatian::new(
                dataset, comparator,
            ))),
            Heuristic::Grinvin => Err(ConjectureError::Unsupported {
                heuristic: heuristic.to_string(),
                mode: "property",
            }),
        }
    }
}

impl ConjectureSelector<TriState> for PropertySelector {
    fn consider(&mut self, tree: &Tree, evaluation: &Evaluation<TriState>) -> bool {
        match self {
            PropertySelector::All(selector) => selector.consider(tree, evaluation),
            PropertySelector::Dalmatian(selector) => selector.consider(tree, evaluation),
        }
    }

    fn stop_condition_reached(&self, budget: ShapeBudget) -> bool {
        match self {
            PropertySelector::All(selector) => selector.stop_condition_reached(budget),
            PropertySelector::Dalmatian(selector) => selector.stop_condition_reached(budget),
        }
    }

    fn conjectures(&self) -> Vec<Expression> {
        match self {
            PropertySelector::All(selector) => selector.conjectures(),
            PropertySelector::Dalmatian(selector) => selector.conjectures(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tree::{ContentLabel, LabelKind};

    /// Single-leaf tree labeled with `invariant`.
    pub(crate) fn leaf(invariant: usize) -> Tree {
        let mut tree = Tree::new(0, 0);
        let root = tree.root();
        tree.set_label(root, ContentLabel::new(LabelKind::Invariant, invariant));
        tree
    }

    #[test]
    fn test_all_keeps_everything() {
        let mut selector = AllConjectures::<f64>::default();
        let evaluation = Evaluation::default();
        assert!(selector.consider(&leaf(0), &evaluation));
        assert!(selector.consider(&leaf(1), &evaluation));
        assert_eq!(selector.conjectures().len(), 2);
        assert!(!selector.stop_condition_reached(ShapeBudget::new(50, 20)));
    }

    #[test]
    fn test_grinvin_unsupported_for_properties() {
        let dataset = Dataset::new(1, 2, 0, vec![TriState::True, TriState::False]).unwrap();
        let err = PropertySelector::new(Heuristic::Grinvin, &dataset, PropertyComparator::Sufficient)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "heuristic grinvin is not supported in property mode"
        );
    }
}
