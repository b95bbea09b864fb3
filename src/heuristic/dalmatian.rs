//! Dalmatian selection for numeric bounds
//!
//! Every object is owned by the conjecture that currently gives it the
//! tightest bound. A new expression is kept only if it is strictly tighter
//! for some object. It takes the objects it improves, and conjectures left
//! owning nothing are dropped. With one slot per object plus a spare there
//! is always room for the newcomer.

use tracing::debug;

use super::ConjectureSelector;
use crate::semantics::{Dataset, Evaluation, NumericComparator};
use crate::tree::{Expression, ShapeBudget, Tree};

#[derive(Debug, Clone, Default)]
struct Slot {
    expression: Option<Expression>,
    values: Vec<f64>,
}

#[derive(Debug)]
pub struct Dalmatian {
    comparator: NumericComparator,
    main: Vec<f64>,
    theory: Option<Vec<f64>>,
    decidable: usize,
    slots: Vec<Slot>,
    best_for_object: Vec<usize>,
    hit_count: usize,
    needs_reassignment: Vec<bool>,
    owned: Vec<usize>,
}

impl Dalmatian {
    pub fn new(dataset: &Dataset<f64>, comparator: NumericComparator) -> Self {
        let objects = dataset.object_count();
        Self {
            comparator,
            main: dataset.main_values().collect(),
            theory: dataset.theory().map(<[f64]>::to_vec),
            decidable: dataset.decidable_objects(),
            slots: vec![Slot::default(); objects + 1],
            best_for_object: vec![0; objects],
            hit_count: 0,
            needs_reassignment: vec![false; objects],
            owned: vec![0; objects + 1],
        }
    }

    /// Objects whose tightest bound equals the main invariant.
    pub fn hit_count(&self) -> usize {
        self.hit_count
    }

    /// Number of conjectures currently kept.
    pub fn retained(&self) -> usize {
        self.slots.iter().filter(|s| s.expression.is_some()).count()
    }

    /// Current tightest bound for `object`, if any conjecture is kept.
    pub fn best_value(&self, object: usize) -> Option<f64> {
        let slot = &self.slots[self.best_for_object[object]];
        slot.expression.as_ref().map(|_| slot.values[object])
    }

    /// Objects owned by each kept conjecture, in slot order.
    pub fn ownership(&self) -> Vec<usize> {
        let mut owned = vec![0; self.slots.len()];
        for &slot in &self.best_for_object {
            owned[slot] += 1;
        }
        self.slots
            .iter()
            .zip(owned)
            .filter(|(slot, _)| slot.expression.is_some())
            .map(|(_, count)| count)
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.expression.is_none())
    }

    fn beats_theory(&self, values: &[f64]) -> bool {
        match &self.theory {
            None => true,
            Some(theory) => values
                .iter()
                .zip(theory)
                .any(|(&new, &known)| self.comparator.tighter(new, known)),
        }
    }

    fn store(&mut self, slot: usize, tree: &Tree, values: &[f64]) {
        let target = &mut self.slots[slot];
        target.expression = Some(Expression::capture(tree));
        target.values.clear();
        target.values.extend_from_slice(values);
    }

    fn update_hits(&mut self) {
        self.hit_count = self
            .main
            .iter()
            .enumerate()
            .filter(|(object, main)| {
                !main.is_nan() && self.slots[self.best_for_object[*object]].values[*object] == **main
            })
            .count();
    }
}

impl ConjectureSelector<f64> for Dalmatian {
    fn consider(&mut self, tree: &Tree, evaluation: &Evaluation<f64>) -> bool {
        let values = evaluation.values();
        if !self.beats_theory(values) {
            return false;
        }

        if self.is_empty() {
            self.store(0, tree, values);
            self.best_for_object.fill(0);
            self.update_hits();
            debug!(hits = self.hit_count, "first conjecture");
            return true;
        }

        self.needs_reassignment.fill(false);
        self.owned.fill(0);
        let mut more_significant = false;
        for object in 0..self.main.len() {
            let best = self.best_for_object[object];
            if self
                .comparator
                .tighter(values[object], self.slots[best].values[object])
            {
                self.needs_reassignment[object] = true;
                more_significant = true;
            } else {
                self.owned[best] += 1;
            }
        }
        if !more_significant {
            return false;
        }

        // At least one object moves, so at most objectCount - 1 slots keep
        // an owner and a free slot always exists.
        let target = self
            .owned
            .iter()
            .position(|&count| count == 0)
            .unwrap_or_else(|| unreachable!("no free conjecture slot"));

        for (slot, &count) in self.owned.iter().enumerate() {
            if count == 0 && slot != target && self.slots[slot].expression.is_some() {
                debug!(slot, "evicting conjecture without objects");
                self.slots[slot].expression = None;
            }
        }

        self.store(target, tree, values);
        for object in 0..self.main.len() {
            if self.needs_reassignment[object] {
                self.best_for_object[object] = target;
            }
        }
        self.update_hits();
        debug!(slot = target, hits = self.hit_count, "conjecture accepted");
        true
    }

    fn stop_condition_reached(&self, _budget: ShapeBudget) -> bool {
        !self.is_empty() && self.hit_count == self.decidable
    }

    fn conjectures(&self) -> Vec<Expression> {
        self.slots
            .iter()
            .filter_map(|slot| slot.expression.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::tests::leaf;

    fn main_only(main: Vec<f64>) -> Dataset<f64> {
        let objects = main.len();
        Dataset::new(objects, 1, 0, main).unwrap()
    }

    fn offer(selector: &mut Dalmatian, invariant: usize, values: &[f64]) -> bool {
        selector.consider(&leaf(invariant), &Evaluation::from_values(values.to_vec()))
    }

    #[test]
    fn test_first_expression_is_kept() {
        let dataset = main_only(vec![3.0, 5.0, 10.0]);
        let mut selector = Dalmatian::new(&dataset, NumericComparator::Leq);

        assert!(offer(&mut selector, 1, &[3.0, 5.0, 5.0]));
        assert_eq!(selector.retained(), 1);
        assert_eq!(selector.hit_count(), 2);
        assert!(!selector.stop_condition_reached(ShapeBudget::default()));
    }

    #[test]
    fn test_rejects_expression_that_improves_nothing() {
        let dataset = main_only(vec![3.0, 5.0, 10.0]);
        let mut selector = Dalmatian::new(&dataset, NumericComparator::Leq);

        assert!(offer(&mut selector, 1, &[3.0, 5.0, 5.0]));
        assert!(!offer(&mut selector, 2, &[2.0, 5.0, 5.0]));
        assert_eq!(selector.retained(), 1);
    }

    #[test]
    fn test_evicts_dominated_conjecture() {
        let dataset = main_only(vec![3.0, 5.0, 10.0]);
        let mut selector = Dalmatian::new(&dataset, NumericComparator::Leq);

        assert!(offer(&mut selector, 1, &[1.0, 1.0, 8.0]));
        assert!(offer(&mut selector, 2, &[2.0, 2.0, 1.0]));
        assert_eq!(selector.retained(), 2);
        assert_eq!(selector.ownership(), vec![1, 2]);

        // better everywhere: both older conjectures go
        assert!(offer(&mut selector, 3, &[3.0, 5.0, 10.0]));
        assert_eq!(selector.retained(), 1);
        assert_eq!(selector.hit_count(), 3);
        assert!(selector.stop_condition_reached(ShapeBudget::default()));
        assert_eq!(
            selector.conjectures()[0].invariants().collect::<Vec<_>>(),
            vec![3]
        );
    }

    #[test]
    fn test_upper_bounds_improve_downwards() {
        let dataset = main_only(vec![2.0, 2.0]);
        let mut selector = Dalmatian::new(&dataset, NumericComparator::Geq);

        assert!(offer(&mut selector, 1, &[4.0, 4.0]));
        assert!(offer(&mut selector, 2, &[2.0, 5.0]));
        assert_eq!(selector.best_value(0), Some(2.0));
        assert_eq!(selector.best_value(1), Some(4.0));
        assert_eq!(selector.hit_count(), 1);
    }

    #[test]
    fn test_theory_filter() {
        let dataset = main_only(vec![3.0, 5.0])
            .with_theory(vec![3.0, 4.0])
            .unwrap();
        let mut selector = Dalmatian::new(&dataset, NumericComparator::Leq);

        assert!(!offer(&mut selector, 1, &[3.0, 4.0]));
        assert!(offer(&mut selector, 1, &[2.0, 5.0]));
    }

    #[test]
    fn test_undefined_values_are_replaced() {
        let dataset = main_only(vec![3.0, f64::NAN]);
        let mut selector = Dalmatian::new(&dataset, NumericComparator::Leq);

        assert!(offer(&mut selector, 1, &[f64::NAN, 1.0]));
        assert_eq!(selector.hit_count(), 0);
        assert!(offer(&mut selector, 2, &[3.0, f64::NAN]));
        assert_eq!(selector.retained(), 2);
        // only object 0 has a known main value
        assert!(selector.stop_condition_reached(ShapeBudget::default()));
    }
}
