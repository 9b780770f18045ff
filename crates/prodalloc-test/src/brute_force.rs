//! Exhaustive reference optimizer for tiny instances.
//!
//! Enumerates every allocation vector in the bound domains and applies the
//! same constraints the solver models. Only `DomainOption::Bound` is supported.

use prodalloc_config::{CapacityBound, OptimizationMode, OptimizerConfig, PlanningStrategy};
use prodalloc_core::DomainModel;

/// Largest number of assignments enumerated before giving up.
pub const MAX_ASSIGNMENTS: u64 = 5_000_000;

/// The best objective and how many feasible assignments exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BruteForceOptimum {
    /// Scaled objective value (cost or utilization).
    pub objective: i64,
    /// One assignment reaching it, in record order.
    pub values: Vec<i64>,
    pub feasible_count: u64,
}

/// Returns the optimum, or `None` if no assignment is feasible.
///
/// # Panics
///
/// Panics if the instance has more than [`MAX_ASSIGNMENTS`] assignments.
pub fn brute_force(domain: &DomainModel, config: &OptimizerConfig) -> Option<BruteForceOptimum> {
    let s = domain.precision.factor();
    let s2 = domain.precision.capacity_factor();

    let ranges: Vec<(i64, i64)> = domain
        .beans
        .iter()
        .map(|bean| {
            let lo = bean.low_value.unwrap_or(config.global_low_value * s);
            let hi = bean.high_value.unwrap_or(config.global_high_value * s);
            if bean.fixed {
                if bean.current_value < lo || bean.current_value > hi {
                    (1, 0)
                } else {
                    (bean.current_value, bean.current_value)
                }
            } else {
                (lo, hi)
            }
        })
        .collect();

    if ranges.iter().any(|&(lo, hi)| lo > hi) {
        return None;
    }
    let space = ranges
        .iter()
        .try_fold(1_u64, |acc, &(lo, hi)| acc.checked_mul((hi - lo + 1) as u64));
    match space {
        Some(n) if n <= MAX_ASSIGNMENTS => {}
        _ => panic!("instance too large for brute force: {space:?} assignments"),
    }

    let groups = domain.groups();
    let machines = domain.machine_beans();
    let capacities: Vec<(i64, i64)> = machines
        .keys()
        .map(|id| {
            let machine = &domain.machines[*id];
            let capacity = match config.capacity_bound {
                CapacityBound::UpperBound => machine.upper_bound,
                CapacityBound::ResourceTotal => machine.resource_total,
            };
            (machine.low_bound, capacity)
        })
        .collect();
    let utilization_hi: i64 = capacities.iter().map(|&(_, c)| c.max(0)).sum();

    let mut values: Vec<i64> = ranges.iter().map(|&(lo, _)| lo).collect();
    let mut best: Option<BruteForceOptimum> = None;
    let mut feasible_count = 0;

    loop {
        let plan_ok = groups.iter().all(|(group, members)| {
            let total: i64 = members.iter().map(|&i| values[i]).sum();
            let plan = domain.products[&group.product_id].production_value;
            match config.planning_strategy {
                PlanningStrategy::Aggressive => total >= plan,
                PlanningStrategy::Balanced => total == plan,
                PlanningStrategy::Cautious => total <= plan,
            }
        });
        let usage: Vec<i64> = machines
            .values()
            .map(|members| {
                members
                    .iter()
                    .map(|&i| values[i] * domain.beans[i].unit_value)
                    .sum()
            })
            .collect();
        let capacity_ok = usage
            .iter()
            .zip(&capacities)
            .all(|(&used, &(low, cap))| used >= low && used <= cap);

        if plan_ok && capacity_ok {
            let objective = match config.optimization_mode {
                OptimizationMode::Min => {
                    let cost: i64 = values
                        .iter()
                        .zip(&domain.beans)
                        .map(|(v, bean)| v * bean.unit_cost)
                        .sum();
                    let in_range = cost >= config.global_low_cost * s2
                        && cost <= config.global_high_cost * s2;
                    in_range.then_some(cost)
                }
                OptimizationMode::Max => {
                    let total: i64 = usage.iter().sum();
                    let in_range = total >= utilization_hi.min(1) && total <= utilization_hi;
                    in_range.then_some(total)
                }
            };
            if let Some(objective) = objective {
                feasible_count += 1;
                let improves = best.as_ref().map_or(true, |b| match config.optimization_mode {
                    OptimizationMode::Min => objective < b.objective,
                    OptimizationMode::Max => objective > b.objective,
                });
                if improves {
                    best = Some(BruteForceOptimum {
                        objective,
                        values: values.clone(),
                        feasible_count: 0,
                    });
                }
            }
        }

        // Odometer increment
        let mut i = 0;
        loop {
            if i == values.len() {
                return best.map(|b| BruteForceOptimum {
                    feasible_count,
                    ..b
                });
            }
            if values[i] < ranges[i].1 {
                values[i] += 1;
                break;
            }
            values[i] = ranges[i].0;
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{load, scenarios};
    use prodalloc_core::Precision;

    #[test]
    fn test_tiny_minimum_cost() {
        let domain = load(&scenarios::tiny(), Precision::ZERO);
        let config = OptimizerConfig::default()
            .with_optimization_mode(OptimizationMode::Min)
            .with_value_bounds(0, 4);
        let optimum = brute_force(&domain, &config).unwrap();
        // M1 is the cheaper machine for P1, but filling it leaves room for
        // only one unit of P2 there; M2 takes the other two.
        assert_eq!(optimum.objective, 16);
        assert_eq!(optimum.values, vec![4, 0, 1, 2]);
        assert!(optimum.feasible_count > 1);
    }

    #[test]
    fn test_infeasible_returns_none() {
        let domain = load(&scenarios::tiny(), Precision::ZERO);
        let config = OptimizerConfig::default()
            .with_optimization_mode(OptimizationMode::Min)
            .with_value_bounds(0, 1);
        assert!(brute_force(&domain, &config).is_none());
    }
}
