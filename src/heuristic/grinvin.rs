//! Grinvin selection: the single bound closest to the main invariant

use tracing::debug;

use super::ConjectureSelector;
use crate::semantics::{Dataset, Evaluation};
use crate::tree::{Expression, ShapeBudget, Tree};

#[derive(Debug)]
pub struct Grinvin {
    main: Vec<f64>,
    best: Option<Expression>,
    best_error: f64,
}

impl Grinvin {
    pub fn new(dataset: &Dataset<f64>) -> Self {
        Self {
            main: dataset.main_values().collect(),
            best: None,
            best_error: f64::INFINITY,
        }
    }

    pub fn best_error(&self) -> f64 {
        self.best_error
    }

    /// Sum of squared distances to the main invariant over the objects where
    /// both values are known. Equal values, infinite ones included, add
    /// nothing.
    pub fn error(&self, values: &[f64]) -> f64 {
        values
            .iter()
            .zip(&self.main)
            .filter(|(value, main)| !value.is_nan() && !main.is_nan())
            .map(|(&value, &main)| {
                if value == main {
                    0.0
                } else {
                    (value - main) * (value - main)
                }
            })
            .sum()
    }
}

impl ConjectureSelector<f64> for Grinvin {
    fn consider(&mut self, tree: &Tree, evaluation: &Evaluation<f64>) -> bool {
        let error = self.error(evaluation.values());
        if error < self.best_error {
            debug!(error, previous = self.best_error, "closer conjecture");
            self.best = Some(Expression::capture(tree));
            self.best_error = error;
            true
        } else {
            false
        }
    }

    /// Expressions grow about exponentially in count with their operators,
    /// so stop once `2^(2b+u) * objects` reaches the best error.
    fn stop_condition_reached(&self, budget: ShapeBudget) -> bool {
        let exponent = (2 * budget.binary + budget.unary) as i32;
        2f64.powi(exponent) * self.main.len() as f64 >= self.best_error
    }

    fn conjectures(&self) -> Vec<Expression> {
        self.best.iter().cloned().collect()
    }
}
