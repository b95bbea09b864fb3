//! Automated conjecturing over object invariants.
//!
//! Given a table of objects and their invariant values, the search builds
//! every expression tree over the invariants up to a size limit, keeps the
//! expressions that bound a chosen main invariant on every object, and lets
//! a heuristic pick the few that are worth reporting.

pub mod cancel;
pub mod error;
pub mod heuristic;
pub mod parser;
pub mod printer;
pub mod search;
pub mod semantics;
pub mod tree;

pub use cancel::{CancellationToken, StopReason};
pub use error::{ConjectureError, Result};
pub use search::{conjecture_numeric, conjecture_property, SearchConfig, SearchResult};
