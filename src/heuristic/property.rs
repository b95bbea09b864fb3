//! Dalmatian selection for sufficient and necessary conditions
//!
//! Sufficient conditions are combined by union: an object is covered when
//! some kept condition (or the known theory) is true for it. Necessary
//! conditions are combined by intersection: an object stays covered while
//! no kept condition (nor the theory) is false for it. A new condition is
//! kept if it changes the coverage of at least one object; afterwards each
//! kept condition is dropped in turn if the rest cover exactly the same
//! objects. That pass is greedy and need not find the smallest set.

use tracing::debug;

use super::ConjectureSelector;
use crate::semantics::{Dataset, Evaluation, PropertyComparator, TriState};
use crate::tree::{Expression, ShapeBudget, Tree};

#[derive(Debug)]
struct Condition {
    expression: Expression,
    values: Vec<TriState>,
}

#[derive(Debug)]
pub struct PropertyDalmatian {
    comparator: PropertyComparator,
    main: Vec<TriState>,
    theory: Option<Vec<TriState>>,
    decidable: usize,
    conditions: Vec<Condition>,
    covered: Vec<bool>,
    hit_count: usize,
}

impl PropertyDalmatian {
    pub fn new(dataset: &Dataset<TriState>, comparator: PropertyComparator) -> Self {
        let main: Vec<TriState> = dataset.main_values().collect();
        let theory = dataset.theory().map(<[TriState]>::to_vec);
        let mut selector = Self {
            comparator,
            decidable: dataset.decidable_objects(),
            conditions: Vec::new(),
            covered: vec![false; main.len()],
            hit_count: 0,
            main,
            theory,
        };
        selector.covered = selector.coverage(None);
        selector.update_hits();
        selector
    }

    /// Objects whose coverage matches their main property.
    pub fn hit_count(&self) -> usize {
        self.hit_count
    }

    pub fn retained(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_covered(&self, object: usize) -> bool {
        self.covered[object]
    }

    fn theory_covers(&self, object: usize) -> bool {
        match (&self.theory, self.comparator) {
            (None, PropertyComparator::Sufficient) => false,
            (None, PropertyComparator::Necessary) => true,
            (Some(theory), PropertyComparator::Sufficient) => theory[object] == TriState::True,
            (Some(theory), PropertyComparator::Necessary) => theory[object] != TriState::False,
        }
    }

    /// Coverage of every object by the theory and the kept conditions,
    /// leaving out condition `without`.
    fn coverage(&self, without: Option<usize>) -> Vec<bool> {
        let kept = || {
            self.conditions
                .iter()
                .enumerate()
                .filter(move |(index, _)| Some(*index) != without)
                .map(|(_, condition)| &condition.values)
        };
        (0..self.main.len())
            .map(|object| match self.comparator {
                PropertyComparator::Sufficient => {
                    self.theory_covers(object)
                        || kept().any(|values| values[object] == TriState::True)
                }
                PropertyComparator::Necessary => {
                    self.theory_covers(object)
                        && kept().all(|values| values[object] != TriState::False)
                }
            })
            .collect()
    }

    /// Whether `values` would change the coverage of some object.
    fn is_significant(&self, values: &[TriState]) -> bool {
        values
            .iter()
            .zip(&self.covered)
            .any(|(&value, &covered)| match self.comparator {
                PropertyComparator::Sufficient => !covered && value == TriState::True,
                PropertyComparator::Necessary => covered && value == TriState::False,
            })
    }

    fn prune(&mut self) {
        let mut index = 0;
        while index < self.conditions.len() {
            if self.coverage(Some(index)) == self.covered {
                debug!(index, "dropping redundant condition");
                self.conditions.remove(index);
            } else {
                index += 1;
            }
        }
    }

    fn update_hits(&mut self) {
        self.hit_count = self
            .main
            .iter()
            .zip(&self.covered)
            .filter(|&(main, &covered)| main.is_defined() && covered == (*main == TriState::True))
            .count();
    }
}

impl ConjectureSelector<TriState> for PropertyDalmatian {
    fn consider(&mut self, tree: &Tree, evaluation: &Evaluation<TriState>) -> bool {
        let values = evaluation.values();
        if !self.is_significant(values) {
            return false;
        }

        self.conditions.push(Condition {
            expression: Expression::capture(tree),
            values: values.to_vec(),
        });
        self.covered = self.coverage(None);
        self.prune();
        self.update_hits();
        debug!(
            kept = self.conditions.len(),
            hits = self.hit_count,
            "condition accepted"
        );
        true
    }

    fn stop_condition_reached(&self, _budget: ShapeBudget) -> bool {
        !self.conditions.is_empty() && self.hit_count == self.decidable
    }

    fn conjectures(&self) -> Vec<Expression> {
        self.conditions
            .iter()
            .map(|condition| condition.expression.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::tests::leaf;
    use TriState::{False, True, Undefined};

    fn main_only(main: Vec<TriState>) -> Dataset<TriState> {
        let objects = main.len();
        Dataset::new(objects, 1, 0, main).unwrap()
    }

    fn offer(selector: &mut PropertyDalmatian, invariant: usize, values: &[TriState]) -> bool {
        selector.consider(&leaf(invariant), &Evaluation::from_values(values.to_vec()))
    }

    #[test]
    fn test_sufficient_union() {
        let dataset = main_only(vec![True, True, False, True]);
        let mut selector = PropertyDalmatian::new(&dataset, PropertyComparator::Sufficient);
        assert_eq!(selector.hit_count(), 1);

        assert!(offer(&mut selector, 1, &[True, False, False, False]));
        assert!(selector.is_covered(0));
        assert!(!offer(&mut selector, 2, &[True, False, False, Undefined]));
        assert!(offer(&mut selector, 3, &[False, True, False, True]));
        assert_eq!(selector.retained(), 2);
        assert_eq!(selector.hit_count(), 4);
        assert!(selector.stop_condition_reached(ShapeBudget::default()));
    }

    #[test]
    fn test_sufficient_prunes_subsumed_condition() {
        let dataset = main_only(vec![True, True, False]);
        let mut selector = PropertyDalmatian::new(&dataset, PropertyComparator::Sufficient);

        assert!(offer(&mut selector, 1, &[True, False, False]));
        assert!(offer(&mut selector, 2, &[True, True, False]));
        assert_eq!(selector.retained(), 1);
        assert_eq!(
            selector.conjectures()[0].invariants().collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn test_necessary_intersection() {
        let dataset = main_only(vec![True, False, False]);
        let mut selector = PropertyDalmatian::new(&dataset, PropertyComparator::Necessary);
        // everything is covered before any condition is known
        assert_eq!(selector.hit_count(), 1);

        assert!(offer(&mut selector, 1, &[True, False, True]));
        assert!(!selector.is_covered(1));
        assert!(!offer(&mut selector, 2, &[True, False, Undefined]));
        assert!(offer(&mut selector, 3, &[True, True, False]));
        assert_eq!(selector.hit_count(), 3);
    }

    #[test]
    fn test_necessary_prunes_subsumed_condition() {
        let dataset = main_only(vec![True, False, False]);
        let mut selector = PropertyDalmatian::new(&dataset, PropertyComparator::Necessary);

        assert!(offer(&mut selector, 1, &[True, False, True]));
        assert!(offer(&mut selector, 2, &[True, False, False]));
        assert_eq!(selector.retained(), 1);
        assert_eq!(
            selector.conjectures()[0].invariants().collect::<Vec<_>>(),
            vec![2]
        );
        assert!(!selector.is_covered(2));
    }

    #[test]
    fn test_theory_seeds_coverage() {
        let dataset = main_only(vec![True, True])
            .with_theory(vec![True, False])
            .unwrap();
        let mut selector = PropertyDalmatian::new(&dataset, PropertyComparator::Sufficient);

        assert!(!offer(&mut selector, 1, &[True, False]));
        assert!(offer(&mut selector, 1, &[True, True]));
        assert!(selector.stop_condition_reached(ShapeBudget::default()));
    }
}
