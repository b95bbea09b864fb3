//! Search result types and statistics

use std::time::Duration;

use crate::cancel::StopReason;
use crate::search::config::Heuristic;
use crate::tree::{Expression, ShapeBudget};

/// Result of a conjecture search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Conjectures retained by the heuristic when the search ended
    pub conjectures: Vec<Expression>,
    /// Why the search ended early (None = the schedule ran out)
    pub stop_reason: Option<StopReason>,
    /// Statistics from the search
    pub statistics: SearchStatistics,
}

impl SearchResult {
    /// Whether every budget of the schedule was searched.
    pub fn is_exhaustive(&self) -> bool {
        self.stop_reason.is_none()
    }
}

/// Statistics from a conjecture search
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Heuristic used for the search
    pub heuristic: Heuristic,
    /// Total time spent searching
    pub elapsed_time: Duration,
    /// Budgets enumerated to the end
    pub budgets_completed: u64,
    /// Last budget the search worked on
    pub last_budget: Option<ShapeBudget>,
    /// Unlabeled shapes produced
    pub shapes_generated: u64,
    /// Labeled expressions evaluated
    pub expressions_labeled: u64,
    /// Expressions true for every object (within the skip allowance)
    pub expressions_valid: u64,
    /// Expressions kept by the heuristic at the time they were offered
    pub conjectures_accepted: u64,
}

impl SearchStatistics {
    pub fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            ..Default::default()
        }
    }

    /// Share of labeled expressions that were true (0.0 to 1.0)
    pub fn validity_rate(&self) -> f64 {
        if self.expressions_labeled == 0 {
            0.0
        } else {
            self.expressions_valid as f64 / self.expressions_labeled as f64
        }
    }

    /// Share of true expressions the heuristic kept (0.0 to 1.0)
    pub fn acceptance_rate(&self) -> f64 {
        if self.expressions_valid == 0 {
            0.0
        } else {
            self.conjectures_accepted as f64 / self.expressions_valid as f64
        }
    }

    /// Labeled expressions per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.expressions_labeled as f64 / secs
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Heuristic: {}\n", self.heuristic));
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Budgets completed: {}\n", self.budgets_completed));
        if let Some(budget) = self.last_budget {
            s.push_str(&format!("Last budget: {}\n", budget));
        }
        s.push_str(&format!("Shapes generated: {}\n", self.shapes_generated));
        s.push_str(&format!(
            "Expressions labeled: {}\n",
            self.expressions_labeled
        ));
        s.push_str(&format!(
            "Throughput: {:.0} expressions/sec\n",
            self.throughput()
        ));

        if self.expressions_labeled > 0 {
            s.push_str(&format!(
                "Valid expressions: {} ({:.2}%)\n",
                self.expressions_valid,
                self.validity_rate() * 100.0
            ));
        }

        if self.expressions_valid > 0 {
            s.push_str(&format!(
                "Conjectures accepted: {} ({:.2}% of valid)\n",
                self.conjectures_accepted,
                self.acceptance_rate() * 100.0
            ));
        } else {
            s.push_str(&format!(
                "Conjectures accepted: {}\n",
                self.conjectures_accepted
            ));
        }

        s
    }
}
