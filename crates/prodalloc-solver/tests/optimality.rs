//! Exhausted searches agree with exhaustive enumeration.

use prodalloc_config::{OptimizationMode, OptimizerConfig, PlanningStrategy};
use prodalloc_core::Precision;
use prodalloc_solver::{solve, AllocationModel, SolveStatus};
use prodalloc_test::{brute_force, load, row, scenarios};

const STRATEGIES: [PlanningStrategy; 3] = [
    PlanningStrategy::Aggressive,
    PlanningStrategy::Balanced,
    PlanningStrategy::Cautious,
];

fn check_against_brute_force(records: &[prodalloc_core::Record], config: &OptimizerConfig) {
    let domain = load(records, Precision::ZERO);
    let expected = brute_force(&domain, config);

    let model = AllocationModel::build(&domain, config).unwrap();
    let outcome = solve(&model, config).unwrap();

    match expected {
        Some(optimum) => {
            assert_eq!(outcome.status, SolveStatus::Optimal);
            let solution = outcome.solution.unwrap();
            assert_eq!(solution.objective(), Some(optimum.objective));
            assert!(model.model().is_feasible(solution.values()));
        }
        None => {
            assert_eq!(outcome.status, SolveStatus::Infeasible);
            assert!(outcome.solution.is_none());
        }
    }
}

#[test]
fn test_min_cost_matches_brute_force() {
    for strategy in STRATEGIES {
        let config = OptimizerConfig::default()
            .with_optimization_mode(OptimizationMode::Min)
            .with_planning_strategy(strategy)
            .with_value_bounds(0, 4);
        check_against_brute_force(&scenarios::tiny(), &config);
    }
}

#[test]
fn test_max_utilization_matches_brute_force() {
    for strategy in STRATEGIES {
        let config = OptimizerConfig::default()
            .with_optimization_mode(OptimizationMode::Max)
            .with_planning_strategy(strategy)
            .with_value_bounds(0, 4);
        check_against_brute_force(&scenarios::tiny(), &config);
    }
}

#[test]
fn test_multi_step_products_match_brute_force() {
    for mode in [OptimizationMode::Min, OptimizationMode::Max] {
        for strategy in STRATEGIES {
            let config = OptimizerConfig::default()
                .with_optimization_mode(mode)
                .with_planning_strategy(strategy)
                .with_value_bounds(0, 2);
            check_against_brute_force(&scenarios::tiny_two_steps(), &config);
        }
    }
}

#[test]
fn test_fixed_and_bounded_rows_match_brute_force() {
    let mut records = scenarios::tiny();
    records[1] = row("P1", 1, "M2")
        .plan(4)
        .capacity(5)
        .unit_value(1_i64)
        .unit_cost(5_i64)
        .fixed(1_i64)
        .build();
    records[2] = row("P2", 1, "M1")
        .plan(3)
        .capacity(9)
        .unit_value(1_i64)
        .unit_cost(2_i64)
        .bounds(1_i64, 2_i64)
        .build();

    for mode in [OptimizationMode::Min, OptimizationMode::Max] {
        for strategy in STRATEGIES {
            let config = OptimizerConfig::default()
                .with_optimization_mode(mode)
                .with_planning_strategy(strategy)
                .with_value_bounds(0, 4);
            check_against_brute_force(&records, &config);
        }
    }
}

#[test]
fn test_infeasible_bounds_match_brute_force() {
    let config = OptimizerConfig::default()
        .with_optimization_mode(OptimizationMode::Min)
        .with_value_bounds(0, 1);
    check_against_brute_force(&scenarios::tiny(), &config);
}
