//! Search controller
//!
//! Walks the budget schedule, enumerates every shape of each budget,
//! labels it every possible way, evaluates each labeled tree and offers the
//! true ones to the selected heuristic. All loops poll one
//! [`CancellationToken`], so a timeout, an interrupt or a satisfied
//! heuristic ends the search within one loop iteration.

pub mod config;
pub mod result;
pub mod schedule;

pub use config::{Comparator, Heuristic, SearchConfig, MAX_BINARY_LIMIT, MAX_UNARY_LIMIT};
pub use result::{SearchResult, SearchStatistics};
pub use schedule::BudgetSchedule;

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cancel::{CancellationToken, StopReason};
use crate::error::{ConjectureError, Result};
use crate::heuristic::{ConjectureSelector, NumericSelector, PropertySelector};
use crate::semantics::{
    Dataset, Evaluation, Evaluator, NumericSemantics, OperatorSet, PropertySemantics, Semantics,
    TriState, NUMERIC_OPERATORS, PROPERTY_OPERATORS,
};
use crate::tree::{enumerate_shapes, LabelAssigner, Tree};

/// Conjecture bounds on the main invariant of a numeric dataset.
pub fn conjecture_numeric(
    dataset: &Dataset<f64>,
    config: &SearchConfig,
    cancel: &CancellationToken,
) -> Result<SearchResult> {
    config.validate()?;
    let comparator = config.comparator.numeric().ok_or_else(|| {
        ConjectureError::invalid_config(format!(
            "comparator {} needs a property dataset",
            config.comparator
        ))
    })?;

    let operators = match &config.operators {
        Some(operators) => operators.clone(),
        None => OperatorSet::all(&NUMERIC_OPERATORS),
    };
    operators.validate(&NUMERIC_OPERATORS)?;

    let semantics = NumericSemantics::new(comparator);
    semantics.check_theory(dataset)?;
    let selector = NumericSelector::new(config.heuristic, dataset, comparator);

    Ok(run(
        Evaluator::new(semantics, dataset),
        selector,
        &operators,
        config,
        cancel,
    ))
}

/// Conjecture sufficient or necessary conditions for the main property of
/// a property dataset.
pub fn conjecture_property(
    dataset: &Dataset<TriState>,
    config: &SearchConfig,
    cancel: &CancellationToken,
) -> Result<SearchResult> {
    config.validate()?;
    let comparator = config.comparator.property().ok_or_else(|| {
        ConjectureError::invalid_config(format!(
            "comparator {} needs a numeric dataset",
            config.comparator
        ))
    })?;

    let operators = match &config.operators {
        Some(operators) => operators.clone(),
        None => OperatorSet::all(&PROPERTY_OPERATORS),
    };
    operators.validate(&PROPERTY_OPERATORS)?;

    let semantics = PropertySemantics::new(comparator);
    semantics.check_theory(dataset)?;
    let selector = PropertySelector::new(config.heuristic, dataset, comparator)?;

    Ok(run(
        Evaluator::new(semantics, dataset),
        selector,
        &operators,
        config,
        cancel,
    ))
}

/// Run the full pipeline with an already checked configuration.
///
/// `cancel` is consumed by the run: a configured timeout arms a watchdog on
/// it, and a satisfied heuristic cancels it.
pub fn run<S, H>(
    evaluator: Evaluator<'_, S>,
    mut selector: H,
    operators: &OperatorSet,
    config: &SearchConfig,
    cancel: &CancellationToken,
) -> SearchResult
where
    S: Semantics,
    H: ConjectureSelector<S::Value>,
{
    let start = Instant::now();
    if let Some(timeout) = config.timeout {
        cancel.cancel_after(timeout);
    }

    let dataset = evaluator.dataset();
    let excluded = if config.allow_main_invariant {
        None
    } else {
        Some(dataset.main_invariant())
    };
    let mut labeler = LabelAssigner::new(operators, dataset.invariant_count(), excluded);

    // budgets with operators of a missing kind have no labeling
    let max_unary = if operators.has_unary() { config.max_unary } else { 0 };
    let max_binary = if operators.has_binary() { config.max_binary } else { 0 };
    let schedule = BudgetSchedule::new(max_unary, max_binary, labeler.available_invariants());

    info!(
        mode = evaluator.semantics().mode(),
        objects = dataset.object_count(),
        invariants = dataset.invariant_count(),
        heuristic = %config.heuristic,
        "starting conjecture search"
    );

    let mut tree = Tree::new(max_unary, max_binary);
    let mut evaluation = Evaluation::with_capacity(dataset.object_count());
    let mut stats = SearchStatistics::new(config.heuristic);

    for budget in schedule {
        if cancel.is_cancelled() {
            break;
        }
        if selector.stop_condition_reached(budget) {
            cancel.cancel(StopReason::HeuristicSatisfied);
            break;
        }

        info!(%budget, "searching budget");
        stats.last_budget = Some(budget);

        enumerate_shapes(&mut tree, budget, cancel, &mut |tree: &mut Tree| {
            stats.shapes_generated += 1;
            labeler.assign(tree, cancel, &mut |tree: &Tree| {
                stats.expressions_labeled += 1;
                if !evaluator.evaluate_tree(tree, &mut evaluation) {
                    return;
                }
                if evaluation.skip_fraction() > config.allowed_skip_fraction {
                    return;
                }
                stats.expressions_valid += 1;
                if selector.consider(tree, &evaluation) {
                    stats.conjectures_accepted += 1;
                    if selector.stop_condition_reached(budget) {
                        cancel.cancel(StopReason::HeuristicSatisfied);
                    }
                }
            });
        });

        if cancel.is_cancelled() {
            break;
        }
        stats.budgets_completed += 1;
        debug!(
            %budget,
            shapes = stats.shapes_generated,
            valid = stats.expressions_valid,
            accepted = stats.conjectures_accepted,
            "budget exhausted"
        );
    }

    stats.elapsed_time = start.elapsed();
    let stop_reason = cancel.reason();
    match stop_reason {
        Some(reason @ (StopReason::Timeout | StopReason::Interrupted)) => {
            warn!(%reason, "search stopped early, reporting conjectures found so far")
        }
        Some(StopReason::HeuristicSatisfied) => {
            info!("heuristic cannot improve its conjectures any further")
        }
        None => {}
    }

    let conjectures = selector.conjectures();
    info!(
        conjectures = conjectures.len(),
        labeled = stats.expressions_labeled,
        elapsed = ?stats.elapsed_time,
        "search finished"
    );

    SearchResult {
        conjectures,
        stop_reason,
        statistics: stats,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::heuristic::AllConjectures;
    use crate::semantics::NumericComparator;
    use crate::tree::{Expression, LabelKind, ShapeBudget};

    /// Keeps everything and presses the interrupt on its `limit`-th offer.
    struct InterruptAfter {
        kept: AllConjectures<f64>,
        cancel: CancellationToken,
        limit: usize,
        offers: usize,
    }

    impl ConjectureSelector<f64> for InterruptAfter {
        fn consider(&mut self, tree: &Tree, evaluation: &Evaluation<f64>) -> bool {
            self.offers += 1;
            if self.offers == self.limit {
                self.cancel.cancel(StopReason::Interrupted);
            }
            self.kept.consider(tree, evaluation)
        }

        fn stop_condition_reached(&self, _budget: ShapeBudget) -> bool {
            false
        }

        fn conjectures(&self) -> Vec<Expression> {
            self.kept.conjectures()
        }
    }

    /// C3, C5 and K5: vertices, edges, max degree, min degree.
    fn graphs() -> Dataset<f64> {
        Dataset::new(
            3,
            4,
            1,
            vec![
                3.0, 3.0, 2.0, 2.0, //
                5.0, 5.0, 2.0, 2.0, //
                5.0, 10.0, 4.0, 4.0,
            ],
        )
        .unwrap()
    }

    fn small_config() -> SearchConfig {
        SearchConfig::default().with_max_unary(2).with_max_binary(1)
    }

    #[test]
    fn test_graph_upper_bounds_dalmatian() {
        let dataset = graphs();
        let cancel = CancellationToken::new();
        let result = conjecture_numeric(&dataset, &small_config(), &cancel).unwrap();

        assert!(!result.conjectures.is_empty());
        assert_eq!(result.stop_reason, Some(StopReason::HeuristicSatisfied));

        // every retained bound really is a lower bound on the edge count
        let evaluator = Evaluator::new(NumericSemantics::new(NumericComparator::Leq), &dataset);
        let mut evaluation = Evaluation::default();
        for conjecture in &result.conjectures {
            assert!(conjecture.invariants().all(|invariant| invariant != 1));
            let tree = conjecture.to_tree();
            assert!(evaluator.evaluate_tree(&tree, &mut evaluation));
        }
    }

    #[test]
    fn test_none_heuristic_keeps_every_true_expression() {
        let dataset = graphs();
        let config = SearchConfig::default()
            .with_max_unary(0)
            .with_max_binary(0)
            .with_heuristic(Heuristic::None);
        let result = conjecture_numeric(&dataset, &config, &CancellationToken::new()).unwrap();

        // vertices, max degree and min degree are all <= edges
        assert_eq!(result.conjectures.len(), 3);
        assert!(result.is_exhaustive());
        assert_eq!(result.statistics.budgets_completed, 1);
        assert_eq!(result.statistics.expressions_labeled, 3);
    }

    #[test]
    fn test_precancelled_search_returns_nothing() {
        let dataset = graphs();
        let cancel = CancellationToken::new();
        cancel.cancel(StopReason::Interrupted);

        let result = conjecture_numeric(&dataset, &small_config(), &cancel).unwrap();
        assert!(result.conjectures.is_empty());
        assert_eq!(result.stop_reason, Some(StopReason::Interrupted));
        assert_eq!(result.statistics.expressions_labeled, 0);
    }

    #[test]
    fn test_interrupt_keeps_accepted_conjectures() {
        let dataset = graphs();
        let cancel = CancellationToken::new();
        let selector = InterruptAfter {
            kept: AllConjectures::default(),
            cancel: cancel.clone(),
            limit: 5,
            offers: 0,
        };
        let operators = OperatorSet::all(&NUMERIC_OPERATORS);
        let evaluator = Evaluator::new(NumericSemantics::new(NumericComparator::Leq), &dataset);

        let result = run(evaluator, selector, &operators, &small_config(), &cancel);

        // three leaves in (0, 0), then two of (1, 0)
        assert_eq!(result.conjectures.len(), 5);
        assert_eq!(result.stop_reason, Some(StopReason::Interrupted));
        assert_eq!(result.statistics.conjectures_accepted, 5);
        assert_eq!(result.statistics.budgets_completed, 1);
        assert_eq!(result.statistics.last_budget, Some(ShapeBudget::new(1, 0)));
    }

    #[test]
    fn test_timeout_reports_partial_result() {
        let dataset = graphs();
        let config = SearchConfig::default()
            .with_heuristic(Heuristic::None)
            .with_timeout(Duration::from_millis(50));
        let result = conjecture_numeric(&dataset, &config, &CancellationToken::new()).unwrap();

        assert_eq!(result.stop_reason, Some(StopReason::Timeout));
        assert!(!result.conjectures.is_empty());
        assert_eq!(
            result.conjectures.len() as u64,
            result.statistics.conjectures_accepted
        );
    }

    #[test]
    fn test_main_invariant_allowed() {
        let dataset = graphs();
        let config = SearchConfig::default()
            .with_max_unary(0)
            .with_max_binary(0)
            .with_heuristic(Heuristic::None)
            .with_main_invariant_allowed(true);
        let result = conjecture_numeric(&dataset, &config, &CancellationToken::new()).unwrap();

        assert_eq!(result.conjectures.len(), 4);
    }

    #[test]
    fn test_unary_only_operator_set() {
        let dataset = graphs();
        let mut operators = OperatorSet::default();
        operators.insert(LabelKind::Unary, 4);
        let config = SearchConfig::default()
            .with_heuristic(Heuristic::None)
            .with_operators(operators);
        let result = conjecture_numeric(&dataset, &config, &CancellationToken::new()).unwrap();

        // no binary operators, so the largest expression is x^2^2^...
        assert!(result.is_exhaustive());
        assert!(result
            .conjectures
            .iter()
            .all(|expression| expression.budget().binary == 0));
    }

    #[test]
    fn test_comparator_mode_mismatch() {
        let dataset = graphs();
        let config = small_config().with_comparator(Comparator::Sufficient);
        let err = conjecture_numeric(&dataset, &config, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, ConjectureError::InvalidConfig(_)));
    }

    #[test]
    fn test_property_sufficient_conditions() {
        use TriState::{False, True};
        // invariants: regular, cycle, complete; main = regular
        let dataset = Dataset::new(
            3,
            3,
            0,
            vec![
                True, True, True, //
                True, True, False, //
                True, False, True,
            ],
        )
        .unwrap();
        let config = SearchConfig::default()
            .with_max_unary(1)
            .with_max_binary(1)
            .with_comparator(Comparator::Sufficient);
        let result = conjecture_property(&dataset, &config, &CancellationToken::new()).unwrap();

        assert_eq!(result.stop_reason, Some(StopReason::HeuristicSatisfied));
        assert!(!result.conjectures.is_empty());
    }

    #[test]
    fn test_property_grinvin_rejected() {
        let dataset = Dataset::new(1, 2, 0, vec![TriState::True, TriState::True]).unwrap();
        let config = small_config()
            .with_comparator(Comparator::Necessary)
            .with_heuristic(Heuristic::Grinvin);
        let err = conjecture_property(&dataset, &config, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, ConjectureError::Unsupported { .. }));
    }
}
