//! Order in which operator budgets are searched

use crate::tree::ShapeBudget;

/// Budgets by increasing complexity `unary + 2 * binary`; within one
/// complexity, fewer binary operators first:
/// `(0,0) (1,0) (2,0) (0,1) (3,0) (1,1) (4,0) (2,1) (0,2) ...`
///
/// Budgets above the maxima, or needing more leaves than there are usable
/// invariants, are left out.
#[derive(Debug, Clone)]
pub struct BudgetSchedule {
    max_unary: usize,
    max_binary: usize,
    leaves_available: usize,
    complexity: usize,
    binary: usize,
}

impl BudgetSchedule {
    pub fn new(max_unary: usize, max_binary: usize, leaves_available: usize) -> Self {
        Self {
            max_unary,
            max_binary,
            leaves_available,
            complexity: 0,
            binary: 0,
        }
    }

    fn fits(&self, budget: ShapeBudget) -> bool {
        budget.unary <= self.max_unary
            && budget.binary <= self.max_binary
            && budget.leaf_count() <= self.leaves_available
    }
}

impl Iterator for BudgetSchedule {
    type Item = ShapeBudget;

    fn next(&mut self) -> Option<ShapeBudget> {
        let max_complexity = self.max_unary + 2 * self.max_binary;
        while self.complexity <= max_complexity {
            if 2 * self.binary > self.complexity {
                self.complexity += 1;
                self.binary = 0;
                continue;
            }
            let budget = ShapeBudget::new(self.complexity - 2 * self.binary, self.binary);
            self.binary += 1;
            if self.fits(budget) {
                return Some(budget);
            }
        }
        None
    }
}
