//! Three-valued booleans for property datasets

use std::fmt;
use std::ops::Not;
use std::str::FromStr;

/// A boolean that may be unknown for an object.
///
/// Every operation is strict: if any operand is `Undefined`, so is the
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    False,
    True,
    Undefined,
}

impl TriState {
    pub fn is_defined(self) -> bool {
        self != TriState::Undefined
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::False => Some(false),
            TriState::True => Some(true),
            TriState::Undefined => None,
        }
    }

    fn lift(self, other: Self, op: impl Fn(bool, bool) -> bool) -> Self {
        match (self.as_bool(), other.as_bool()) {
            (Some(a), Some(b)) => op(a, b).into(),
            _ => TriState::Undefined,
        }
    }

    pub fn and(self, other: Self) -> Self {
        self.lift(other, |a, b| a && b)
    }

    pub fn or(self, other: Self) -> Self {
        self.lift(other, |a, b| a || b)
    }

    pub fn xor(self, other: Self) -> Self {
        self.lift(other, |a, b| a != b)
    }

    /// Material implication `self => other`.
    pub fn implies(self, other: Self) -> Self {
        self.lift(other, |a, b| !a || b)
    }
}

impl Not for TriState {
    type Output = TriState;

    fn not(self) -> TriState {
        match self {
            TriState::False => TriState::True,
            TriState::True => TriState::False,
            TriState::Undefined => TriState::Undefined,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::True
        } else {
            TriState::False
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriState::False => write!(f, "F"),
            TriState::True => write!(f, "T"),
            TriState::Undefined => write!(f, "?"),
        }
    }
}

impl FromStr for TriState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "true" | "t" => Ok(TriState::True),
            "0" | "false" | "f" => Ok(TriState::False),
            "-1" | "undefined" | "?" => Ok(TriState::Undefined),
            _ => Err(format!("'{}' is not a tri-state value", s)),
        }
    }
}
