//! Property conjectures: sufficient and necessary conditions

use std::fmt;

use super::operators::{OperatorTable, PROPERTY_OPERATORS};
use super::tristate::TriState;
use super::{Semantics, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyComparator {
    /// `expression -> main`
    Sufficient,
    /// `main -> expression`
    Necessary,
}

impl PropertyComparator {
    pub fn holds(self, value: TriState, main: TriState) -> TriState {
        match self {
            PropertyComparator::Sufficient => (!value).or(main),
            PropertyComparator::Necessary => (!main).or(value),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            PropertyComparator::Sufficient => "->",
            PropertyComparator::Necessary => "<-",
        }
    }
}

impl fmt::Display for PropertyComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PropertySemantics {
    comparator: PropertyComparator,
}

impl PropertySemantics {
    pub fn new(comparator: PropertyComparator) -> Self {
        Self { comparator }
    }

    pub fn comparator(&self) -> PropertyComparator {
        self.comparator
    }
}

impl Semantics for PropertySemantics {
    type Value = TriState;

    fn operators(&self) -> &'static OperatorTable<TriState> {
        &PROPERTY_OPERATORS
    }

    fn verdict(&self, value: TriState, main: TriState) -> Verdict {
        match self.comparator.holds(value, main) {
            TriState::True => Verdict::Holds,
            TriState::False => Verdict::Violated,
            TriState::Undefined => Verdict::Skipped,
        }
    }

    fn comparator_symbol(&self) -> &'static str {
        self.comparator.symbol()
    }

    fn mode(&self) -> &'static str {
        "property"
    }
}
