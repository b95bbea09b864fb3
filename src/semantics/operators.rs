//! Operator tables: id to function and display form
//!
//! Operator ids are positions in these tables, so an operator file line
//! `U 7` means `NUMERIC_OPERATORS.unary[7]` (square root).

use std::fmt;

use super::tristate::TriState;
use crate::error::{ConjectureError, Result};
use crate::tree::{ContentLabel, LabelKind};

/// How an operator is written.
///
/// `token` is the single-word form used by the stack output. The infix form
/// of a unary operator is `open operand close`; of a binary operator
/// `open left middle right close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notation {
    pub token: &'static str,
    pub open: &'static str,
    pub middle: &'static str,
    pub close: &'static str,
}

impl Notation {
    const fn prefix(token: &'static str, open: &'static str) -> Self {
        Self { token, open, middle: "", close: ")" }
    }

    const fn postfix(token: &'static str, close: &'static str) -> Self {
        Self { token, open: "(", middle: "", close }
    }

    const fn infix(token: &'static str, middle: &'static str) -> Self {
        Self { token, open: "(", middle, close: ")" }
    }

    const fn call(token: &'static str, open: &'static str) -> Self {
        Self { token, open, middle: ", ", close: ")" }
    }
}

pub struct UnaryOperator<V> {
    pub notation: Notation,
    pub apply: fn(V) -> V,
}

pub struct BinaryOperator<V> {
    pub notation: Notation,
    pub apply: fn(V, V) -> V,
}

impl<V> fmt::Debug for UnaryOperator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnaryOperator({})", self.notation.token)
    }
}

impl<V> fmt::Debug for BinaryOperator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryOperator({})", self.notation.token)
    }
}

/// All operators of one value domain, indexed by operator id
#[derive(Debug)]
pub struct OperatorTable<V: 'static> {
    pub unary: &'static [UnaryOperator<V>],
    pub commutative: &'static [BinaryOperator<V>],
    pub noncommutative: &'static [BinaryOperator<V>],
}

impl<V: 'static> OperatorTable<V> {
    /// Number of operators of the given kind.
    pub fn count(&self, kind: LabelKind) -> usize {
        match kind {
            LabelKind::Invariant => 0,
            LabelKind::Unary => self.unary.len(),
            LabelKind::CommutativeBinary => self.commutative.len(),
            LabelKind::NonCommutativeBinary => self.noncommutative.len(),
        }
    }

    #[inline]
    pub fn unary(&self, id: usize) -> &UnaryOperator<V> {
        match self.unary.get(id) {
            Some(op) => op,
            None => panic!("unary operator id {} out of range", id),
        }
    }

    /// Binary operator for a commutative or noncommutative label kind.
    #[inline]
    pub fn binary(&self, kind: LabelKind, id: usize) -> &BinaryOperator<V> {
        let ops = match kind {
            LabelKind::CommutativeBinary => self.commutative,
            LabelKind::NonCommutativeBinary => self.noncommutative,
            _ => panic!("{} label is not a binary operator", kind),
        };
        match ops.get(id) {
            Some(op) => op,
            None => panic!("{} operator id {} out of range", kind, id),
        }
    }

    /// Display form of an operator label.
    pub fn notation(&self, label: ContentLabel) -> &Notation {
        match label.kind {
            LabelKind::Unary => &self.unary(label.id).notation,
            LabelKind::Invariant => panic!("invariants have no operator notation"),
            kind => &self.binary(kind, label.id).notation,
        }
    }

    /// Look up an operator by its stack token.
    pub fn find_token(&self, token: &str) -> Option<ContentLabel> {
        let unary = self
            .unary
            .iter()
            .position(|op| op.notation.token == token)
            .map(|id| ContentLabel::new(LabelKind::Unary, id));
        let commutative = || {
            self.commutative
                .iter()
                .position(|op| op.notation.token == token)
                .map(|id| ContentLabel::new(LabelKind::CommutativeBinary, id))
        };
        let noncommutative = || {
            self.noncommutative
                .iter()
                .position(|op| op.notation.token == token)
                .map(|id| ContentLabel::new(LabelKind::NonCommutativeBinary, id))
        };
        unary.or_else(commutative).or_else(noncommutative)
    }
}

/// The operator ids a search may use, per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorSet {
    pub unary: Vec<usize>,
    pub commutative: Vec<usize>,
    pub noncommutative: Vec<usize>,
}

impl OperatorSet {
    /// Every operator in `table`.
    pub fn all<V: 'static>(table: &OperatorTable<V>) -> Self {
        Self {
            unary: (0..table.unary.len()).collect(),
            commutative: (0..table.commutative.len()).collect(),
            noncommutative: (0..table.noncommutative.len()).collect(),
        }
    }

    /// Add an operator id; duplicates are ignored.
    pub fn insert(&mut self, kind: LabelKind, id: usize) {
        let ids = match kind {
            LabelKind::Unary => &mut self.unary,
            LabelKind::CommutativeBinary => &mut self.commutative,
            LabelKind::NonCommutativeBinary => &mut self.noncommutative,
            LabelKind::Invariant => panic!("invariants are not operators"),
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.unary.len() + self.commutative.len() + self.noncommutative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_unary(&self) -> bool {
        !self.unary.is_empty()
    }

    pub fn has_binary(&self) -> bool {
        !self.commutative.is_empty() || !self.noncommutative.is_empty()
    }

    /// Check every id against `table`.
    pub fn validate<V: 'static>(&self, table: &OperatorTable<V>) -> Result<()> {
        let groups = [
            (LabelKind::Unary, &self.unary),
            (LabelKind::CommutativeBinary, &self.commutative),
            (LabelKind::NonCommutativeBinary, &self.noncommutative),
        ];
        for (kind, ids) in groups {
            if let Some(&id) = ids.iter().find(|&&id| id >= table.count(kind)) {
                return Err(ConjectureError::UnknownOperator { kind, id });
            }
        }
        Ok(())
    }
}

fn minus_one(x: f64) -> f64 {
    x - 1.0
}

fn plus_one(x: f64) -> f64 {
    x + 1.0
}

fn times_two(x: f64) -> f64 {
    x * 2.0
}

fn divide_by_two(x: f64) -> f64 {
    x / 2.0
}

fn square(x: f64) -> f64 {
    x * x
}

fn negate(x: f64) -> f64 {
    -x
}

fn reciprocal(x: f64) -> f64 {
    if x == 0.0 {
        f64::INFINITY
    } else {
        1.0 / x
    }
}

fn add(x: f64, y: f64) -> f64 {
    x + y
}

fn multiply(x: f64, y: f64) -> f64 {
    x * y
}

// f64::max and f64::min drop a NaN operand; an undefined operand must stay
// undefined.
fn maximum(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() {
        f64::NAN
    } else {
        x.max(y)
    }
}

fn minimum(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() {
        f64::NAN
    } else {
        x.min(y)
    }
}

fn subtract(x: f64, y: f64) -> f64 {
    x - y
}

fn divide(x: f64, y: f64) -> f64 {
    x / y
}

macro_rules! numeric_unary {
    ($($notation:expr => $apply:expr),* $(,)?) => {
        &[$(UnaryOperator { notation: $notation, apply: $apply }),*]
    };
}

macro_rules! binary_ops {
    ($($notation:expr => $apply:expr),* $(,)?) => {
        &[$(BinaryOperator { notation: $notation, apply: $apply }),*]
    };
}

/// Operators over `f64` invariants
pub static NUMERIC_OPERATORS: OperatorTable<f64> = OperatorTable {
    unary: numeric_unary![
        Notation::postfix("-1", " - 1)") => minus_one,
        Notation::postfix("+1", " + 1)") => plus_one,
        Notation::postfix("*2", " * 2)") => times_two,
        Notation::postfix("/2", " / 2)") => divide_by_two,
        Notation::postfix("^2", " ^ 2)") => square,
        Notation::prefix("-()", "-(") => negate,
        Notation::prefix("1/", "1/(") => reciprocal,
        Notation::prefix("sqrt", "sqrt(") => f64::sqrt,
        Notation::prefix("ln", "ln(") => f64::ln,
        Notation::prefix("log10", "log10(") => f64::log10,
        Notation::prefix("exp", "exp(") => f64::exp,
        Notation::prefix("ceil", "ceil(") => f64::ceil,
        Notation::prefix("floor", "floor(") => f64::floor,
        Notation::prefix("abs", "abs(") => f64::abs,
        Notation::prefix("sin", "sin(") => f64::sin,
        Notation::prefix("cos", "cos(") => f64::cos,
        Notation::prefix("tan", "tan(") => f64::tan,
        Notation::prefix("asin", "asin(") => f64::asin,
        Notation::prefix("acos", "acos(") => f64::acos,
        Notation::prefix("atan", "atan(") => f64::atan,
        Notation::prefix("sinh", "sinh(") => f64::sinh,
        Notation::prefix("cosh", "cosh(") => f64::cosh,
        Notation::prefix("tanh", "tanh(") => f64::tanh,
        Notation::prefix("asinh", "asinh(") => f64::asinh,
        Notation::prefix("acosh", "acosh(") => f64::acosh,
        Notation::prefix("atanh", "atanh(") => f64::atanh,
    ],
    commutative: binary_ops![
        Notation::infix("+", " + ") => add,
        Notation::infix("*", " * ") => multiply,
        Notation::call("max", "max(") => maximum,
        Notation::call("min", "min(") => minimum,
    ],
    noncommutative: binary_ops![
        Notation::infix("-", " - ") => subtract,
        Notation::infix("/", " / ") => divide,
        Notation::infix("^", " ^ ") => f64::powf,
    ],
};

fn tri_not(x: TriState) -> TriState {
    !x
}

/// Operators over tri-state invariants
pub static PROPERTY_OPERATORS: OperatorTable<TriState> = OperatorTable {
    unary: &[UnaryOperator {
        notation: Notation::prefix("!", "!("),
        apply: tri_not,
    }],
    commutative: binary_ops![
        Notation::infix("&", " & ") => TriState::and,
        Notation::infix("|", " | ") => TriState::or,
        Notation::infix("^", " ^ ") => TriState::xor,
    ],
    noncommutative: binary_ops![
        Notation::infix("=>", " => ") => TriState::implies,
    ],
};
