//! Property-based tests for shape enumeration, tri-state logic and the
//! numeric heuristics.

use std::collections::HashSet;

use proptest::prelude::*;

use conjecturing::cancel::CancellationToken;
use conjecturing::heuristic::{ConjectureSelector, Dalmatian, Grinvin};
use conjecturing::search::BudgetSchedule;
use conjecturing::semantics::{Dataset, Evaluation, NumericComparator, TriState};
use conjecturing::tree::{
    count_shapes, enumerate_shapes, ContentLabel, Expression, LabelKind, ShapeBudget, Tree,
};

// ============================================================================
// Helper functions
// ============================================================================

fn binomial(n: u64, k: u64) -> u64 {
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

fn catalan(n: u64) -> u64 {
    binomial(2 * n, n) / (n + 1)
}

fn leaf(invariant: usize) -> Tree {
    let mut tree = Tree::new(0, 0);
    let root = tree.root();
    tree.set_label(root, ContentLabel::new(LabelKind::Invariant, invariant));
    tree
}

fn tristate() -> impl Strategy<Value = TriState> {
    prop_oneof![
        Just(TriState::False),
        Just(TriState::True),
        Just(TriState::Undefined)
    ]
}

/// Main values and a list of offers that are all valid lower bounds.
fn lower_bound_offers() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<f64>>)> {
    prop::collection::vec(0u32..50, 1..8).prop_flat_map(|main| {
        let n = main.len();
        let offers = prop::collection::vec(prop::collection::vec(0u32..6, n), 1..30);
        (Just(main), offers).prop_map(|(main, offers)| {
            let bounds = offers
                .into_iter()
                .map(|gaps| {
                    main.iter()
                        .zip(gaps)
                        .map(|(&m, gap)| m as f64 - gap as f64)
                        .collect()
                })
                .collect();
            (main.into_iter().map(f64::from).collect(), bounds)
        })
    })
}

// ============================================================================
// Shape enumeration
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn shape_count_matches_closed_form(unary in 0usize..5, binary in 0usize..4) {
        let expected = binomial((unary + 2 * binary) as u64, unary as u64) * catalan(binary as u64);
        prop_assert_eq!(count_shapes(ShapeBudget::new(unary, binary)), expected);
    }

    #[test]
    fn shapes_are_distinct_and_tree_is_restored(unary in 0usize..5, binary in 0usize..4) {
        let budget = ShapeBudget::new(unary, binary);
        let mut tree = Tree::new(unary, binary);
        let mut seen = HashSet::new();
        let mut duplicates = 0;
        enumerate_shapes(&mut tree, budget, &CancellationToken::new(), &mut |tree: &mut Tree| {
            if !seen.insert(tree.postorder_arities()) {
                duplicates += 1;
            }
        });
        prop_assert_eq!(duplicates, 0);
        prop_assert!(tree.is_bare());
    }

    #[test]
    fn schedule_is_ordered_by_complexity(max_unary in 0usize..6, max_binary in 0usize..4, leaves in 0usize..6) {
        let budgets: Vec<ShapeBudget> = BudgetSchedule::new(max_unary, max_binary, leaves).collect();
        for pair in budgets.windows(2) {
            prop_assert!(pair[0].complexity() <= pair[1].complexity());
        }
        for budget in &budgets {
            prop_assert!(budget.unary <= max_unary);
            prop_assert!(budget.binary <= max_binary);
            prop_assert!(budget.leaf_count() <= leaves);
        }
    }
}

// ============================================================================
// Tri-state logic
// ============================================================================

proptest! {
    #[test]
    fn implication_is_not_a_or_b(a in tristate(), b in tristate()) {
        prop_assert_eq!(a.implies(b), (!a).or(b));
    }

    #[test]
    fn undefined_is_absorbing(a in tristate()) {
        prop_assert_eq!(a.and(TriState::Undefined), TriState::Undefined);
        prop_assert_eq!(TriState::Undefined.or(a), TriState::Undefined);
        prop_assert_eq!(a.xor(TriState::Undefined), TriState::Undefined);
    }

    #[test]
    fn binary_operators_commute(a in tristate(), b in tristate()) {
        prop_assert_eq!(a.and(b), b.and(a));
        prop_assert_eq!(a.or(b), b.or(a));
        prop_assert_eq!(a.xor(b), b.xor(a));
    }
}

// ============================================================================
// Heuristics
// ============================================================================

proptest! {
    #[test]
    fn dalmatian_keeps_at_most_one_owner_per_object((main, offers) in lower_bound_offers()) {
        let n = main.len();
        let dataset = Dataset::new(n, 1, 0, main).unwrap();
        let mut selector = Dalmatian::new(&dataset, NumericComparator::Leq);
        let mut previous: Vec<Option<f64>> = vec![None; n];

        for (index, values) in offers.into_iter().enumerate() {
            selector.consider(&leaf(index), &Evaluation::from_values(values));

            let ownership = selector.ownership();
            prop_assert!(selector.retained() <= n + 1);
            prop_assert!(ownership.iter().all(|&owned| owned >= 1));
            prop_assert_eq!(ownership.iter().sum::<usize>(), n);

            // lower bounds only ever get tighter
            for object in 0..n {
                let best = selector.best_value(object);
                if let (Some(old), Some(new)) = (previous[object], best) {
                    prop_assert!(new >= old);
                }
                previous[object] = best;
            }
        }
        prop_assert!(selector.hit_count() <= n);
    }

    #[test]
    fn grinvin_error_never_increases((main, offers) in lower_bound_offers()) {
        let n = main.len();
        let dataset = Dataset::new(n, 1, 0, main).unwrap();
        let mut selector = Grinvin::new(&dataset);
        let mut best = f64::INFINITY;

        for (index, values) in offers.into_iter().enumerate() {
            let error = selector.error(&values);
            let kept = selector.consider(&leaf(index), &Evaluation::from_values(values));
            prop_assert_eq!(kept, error < best);
            prop_assert!(selector.best_error() <= best);
            best = selector.best_error();
        }
        prop_assert_eq!(selector.conjectures().len(), 1);
    }

    #[test]
    fn expression_tree_round_trip(unary in 0usize..4, binary in 0usize..3) {
        let budget = ShapeBudget::new(unary, binary);
        let mut tree = Tree::new(unary, binary);
        let mut failures = 0;
        enumerate_shapes(&mut tree, budget, &CancellationToken::new(), &mut |tree: &mut Tree| {
            let mut order = Vec::new();
            tree.postorder_into(&mut order);
            for &id in &order {
                let kind = match tree.node(id).arity() {
                    conjecturing::tree::Arity::Leaf => LabelKind::Invariant,
                    conjecturing::tree::Arity::Unary => LabelKind::Unary,
                    conjecturing::tree::Arity::Binary => LabelKind::NonCommutativeBinary,
                };
                tree.set_label(id, ContentLabel::new(kind, 0));
            }
            let expression = Expression::capture(tree);
            if Expression::capture(&expression.to_tree()) != expression {
                failures += 1;
            }
        });
        prop_assert_eq!(failures, 0);
    }
}
