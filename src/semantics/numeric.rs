//! Numeric conjectures: bounds on a real-valued main invariant

use std::fmt;

use super::operators::{OperatorTable, NUMERIC_OPERATORS};
use super::{Semantics, Verdict};

/// Relation required between expression and main invariant.
///
/// `Leq` and `Less` make the expression a lower bound on the main
/// invariant, `Geq` and `Greater` an upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericComparator {
    Leq,
    Less,
    Geq,
    Greater,
}

impl NumericComparator {
    pub fn holds(self, value: f64, main: f64) -> bool {
        match self {
            NumericComparator::Leq => value <= main,
            NumericComparator::Less => value < main,
            NumericComparator::Geq => value >= main,
            NumericComparator::Greater => value > main,
        }
    }

    /// True if `new` is a strictly tighter bound than `old`.
    ///
    /// A missing new value is never tighter; any defined value beats a
    /// missing old one.
    pub fn tighter(self, new: f64, old: f64) -> bool {
        if new.is_nan() {
            return false;
        }
        if old.is_nan() {
            return true;
        }
        match self {
            NumericComparator::Leq | NumericComparator::Less => new > old,
            NumericComparator::Geq | NumericComparator::Greater => new < old,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            NumericComparator::Leq => "<=",
            NumericComparator::Less => "<",
            NumericComparator::Geq => ">=",
            NumericComparator::Greater => ">",
        }
    }
}

impl fmt::Display for NumericComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NumericSemantics {
    comparator: NumericComparator,
}

impl NumericSemantics {
    pub fn new(comparator: NumericComparator) -> Self {
        Self { comparator }
    }

    pub fn comparator(&self) -> NumericComparator {
        self.comparator
    }
}

impl Semantics for NumericSemantics {
    type Value = f64;

    fn operators(&self) -> &'static OperatorTable<f64> {
        &NUMERIC_OPERATORS
    }

    fn verdict(&self, value: f64, main: f64) -> Verdict {
        if value.is_nan() || main.is_nan() {
            Verdict::Skipped
        } else if self.comparator.holds(value, main) {
            Verdict::Holds
        } else {
            Verdict::Violated
        }
    }

    fn comparator_symbol(&self) -> &'static str {
        self.comparator.symbol()
    }

    fn mode(&self) -> &'static str {
        "numeric"
    }
}
