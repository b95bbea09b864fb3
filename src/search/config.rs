//! Configuration types for conjecture searches

use std::time::Duration;

use crate::error::{ConjectureError, Result};
use crate::semantics::{NumericComparator, OperatorSet, PropertyComparator};

/// Largest number of unary operators in one expression
pub const MAX_UNARY_LIMIT: usize = 50;
/// Largest number of binary operators in one expression
pub const MAX_BINARY_LIMIT: usize = 20;

/// Relation between expression and main invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparator {
    /// expression <= main
    #[default]
    Leq,
    /// expression < main
    Less,
    /// expression >= main
    Geq,
    /// expression > main
    Greater,
    /// expression -> main (property mode)
    Sufficient,
    /// main -> expression (property mode)
    Necessary,
}

impl Comparator {
    pub fn is_property(self) -> bool {
        matches!(self, Comparator::Sufficient | Comparator::Necessary)
    }

    pub fn numeric(self) -> Option<NumericComparator> {
        match self {
            Comparator::Leq => Some(NumericComparator::Leq),
            Comparator::Less => Some(NumericComparator::Less),
            Comparator::Geq => Some(NumericComparator::Geq),
            Comparator::Greater => Some(NumericComparator::Greater),
            Comparator::Sufficient | Comparator::Necessary => None,
        }
    }

    pub fn property(self) -> Option<PropertyComparator> {
        match self {
            Comparator::Sufficient => Some(PropertyComparator::Sufficient),
            Comparator::Necessary => Some(PropertyComparator::Necessary),
            _ => None,
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparator::Leq => write!(f, "leq"),
            Comparator::Less => write!(f, "less"),
            Comparator::Geq => write!(f, "geq"),
            Comparator::Greater => write!(f, "greater"),
            Comparator::Sufficient => write!(f, "sufficient"),
            Comparator::Necessary => write!(f, "necessary"),
        }
    }
}

impl std::str::FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leq" | "<=" => Ok(Comparator::Leq),
            "less" | "lt" | "<" => Ok(Comparator::Less),
            "geq" | ">=" => Ok(Comparator::Geq),
            "greater" | "gt" | ">" => Ok(Comparator::Greater),
            "sufficient" | "->" | "=>" => Ok(Comparator::Sufficient),
            "necessary" | "<-" => Ok(Comparator::Necessary),
            _ => Err(format!(
                "Unknown comparator: '{}'. Valid options: leq, less, geq, greater, sufficient, necessary",
                s
            )),
        }
    }
}

/// Conjecture selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    /// Keep every true expression
    None,
    /// Keep the expressions that are tightest for some object
    #[default]
    Dalmatian,
    /// Keep the single expression closest to the main invariant
    Grinvin,
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Heuristic::None => write!(f, "none"),
            Heuristic::Dalmatian => write!(f, "dalmatian"),
            Heuristic::Grinvin => write!(f, "grinvin"),
        }
    }
}

impl std::str::FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "all" => Ok(Heuristic::None),
            "dalmatian" => Ok(Heuristic::Dalmatian),
            "grinvin" => Ok(Heuristic::Grinvin),
            _ => Err(format!(
                "Unknown heuristic: '{}'. Valid options: none, dalmatian, grinvin",
                s
            )),
        }
    }
}

/// Main search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Most unary operators tried in one expression
    pub max_unary: usize,
    /// Most binary operators tried in one expression
    pub max_binary: usize,
    pub comparator: Comparator,
    pub heuristic: Heuristic,
    /// Overall time limit (None = run until the schedule or heuristic ends)
    pub timeout: Option<Duration>,
    /// Whether the main invariant may appear inside its own bounds
    pub allow_main_invariant: bool,
    /// Largest share of skipped objects an expression may have and still
    /// reach the heuristic
    pub allowed_skip_fraction: f64,
    /// Operators to use (None = every operator of the mode)
    pub operators: Option<OperatorSet>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_unary: MAX_UNARY_LIMIT,
            max_binary: MAX_BINARY_LIMIT,
            comparator: Comparator::default(),
            heuristic: Heuristic::default(),
            timeout: None,
            allow_main_invariant: false,
            allowed_skip_fraction: 0.2,
            operators: None,
        }
    }
}

impl SearchConfig {
    pub fn with_max_unary(mut self, max_unary: usize) -> Self {
        self.max_unary = max_unary;
        self
    }

    pub fn with_max_binary(mut self, max_binary: usize) -> Self {
        self.max_binary = max_binary;
        self
    }

    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// A zero duration disables the time limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout).filter(|t| !t.is_zero());
        self
    }

    pub fn with_main_invariant_allowed(mut self, allowed: bool) -> Self {
        self.allow_main_invariant = allowed;
        self
    }

    pub fn with_allowed_skip_fraction(mut self, fraction: f64) -> Self {
        self.allowed_skip_fraction = fraction;
        self
    }

    pub fn with_operators(mut self, operators: OperatorSet) -> Self {
        self.operators = Some(operators);
        self
    }

    /// Check ranges before a search starts.
    pub fn validate(&self) -> Result<()> {
        if self.max_unary > MAX_UNARY_LIMIT {
            return Err(ConjectureError::invalid_config(format!(
                "max_unary {} exceeds limit {}",
                self.max_unary, MAX_UNARY_LIMIT
            )));
        }
        if self.max_binary > MAX_BINARY_LIMIT {
            return Err(ConjectureError::invalid_config(format!(
                "max_binary {} exceeds limit {}",
                self.max_binary, MAX_BINARY_LIMIT
            )));
        }
        if !(0.0..=1.0).contains(&self.allowed_skip_fraction) {
            return Err(ConjectureError::invalid_config(format!(
                "allowed skip fraction {} is not within [0, 1]",
                self.allowed_skip_fraction
            )));
        }
        Ok(())
    }
}
