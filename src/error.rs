//! Error types for loading inputs and configuring a search

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;
use crate::tree::LabelKind;

/// Result type for fallible conjecturing operations
pub type Result<T> = std::result::Result<T, ConjectureError>;

/// Errors reported before a search starts.
///
/// Broken internal invariants (arena exhaustion, a third child, ...) are not
/// represented here; they panic.
#[derive(Debug, Error)]
pub enum ConjectureError {
    /// Input file could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed operator table or dataset
    #[error("parse error at {0}")]
    Parse(#[from] ParseError),

    /// Dataset dimensions or contents do not fit together
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Operator id outside the active operator table
    #[error("unknown {kind} operator id {id}")]
    UnknownOperator { kind: LabelKind, id: usize },

    /// Known theory is false for some object under the chosen comparator
    #[error("inconsistent known theory: {0}")]
    InconsistentTheory(String),

    /// Out-of-range or contradictory search settings
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Heuristic not available for the selected mode
    #[error("heuristic {heuristic} is not supported in {mode} mode")]
    Unsupported {
        heuristic: String,
        mode: &'static str,
    },
}

impl ConjectureError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConjectureError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_dataset(message: impl Into<String>) -> Self {
        ConjectureError::InvalidDataset(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        ConjectureError::InvalidConfig(message.into())
    }
}
