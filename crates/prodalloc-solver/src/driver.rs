//! Solver driver: runs the search under a deadline and classifies the result.
//!
//! A fresh search is built on every call; nothing is kept between runs.

use std::fmt;
use std::time::Duration;

use prodalloc_config::OptimizerConfig;
use tracing::{info, warn};

use crate::builder::AllocationModel;
use crate::error::Result;
use crate::model::CpModel;
use crate::search::{BranchAndBound, SearchOutcome};
use crate::solution::Solution;
use crate::statistics::SolverStatistics;
use crate::termination::{NodeCountTermination, OrTermination, TimeTermination};

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Best solution, proven by exhausting the search tree.
    Optimal,
    /// A solution found before the deadline, not proven optimal.
    Feasible,
    /// No solution exists.
    Infeasible,
    /// The deadline elapsed before any solution was found.
    NoSolutionFound,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::NoSolutionFound => "NO_SOLUTION_FOUND",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal findings reported alongside a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Initial propagation proved a constraint unsatisfiable.
    RootInfeasible { constraint: String },
    /// A variable had no admissible value.
    EmptyDomain { variable: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RootInfeasible { constraint } => {
                write!(f, "initial propagation is infeasible at constraint '{constraint}'")
            }
            Diagnostic::EmptyDomain { variable } => {
                write!(f, "variable '{variable}' has no admissible value")
            }
        }
    }
}

/// Result of one solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub solution: Option<Solution>,
    pub statistics: SolverStatistics,
    pub diagnostics: Vec<Diagnostic>,
}

/// Solver settings for one run.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use prodalloc_solver::driver::{SolveStatus, Solver};
/// use prodalloc_solver::model::{CpModel, Domain, LinearExpr, Objective, Relation};
///
/// let mut model = CpModel::new();
/// let x = model.new_int_var("x", Domain::interval(0, 10));
/// model.add_constraint("cap", LinearExpr::sum([x]), Relation::Le, 7).unwrap();
/// model.set_objective(Objective::Maximize(x));
///
/// let outcome = Solver::new(Duration::from_secs(5)).solve(&model).unwrap();
/// assert_eq!(outcome.status, SolveStatus::Optimal);
/// assert_eq!(outcome.solution.unwrap().value(x), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solver {
    time_limit: Duration,
    node_limit: Option<u64>,
}

impl Solver {
    pub fn new(time_limit: Duration) -> Self {
        Self {
            time_limit,
            node_limit: None,
        }
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            time_limit: config.time_limit(),
            node_limit: config.node_limit,
        }
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn node_limit(&self) -> Option<u64> {
        self.node_limit
    }

    /// Searches `model` until it is solved to optimality or a limit is hit.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`](crate::SolverError) if an intermediate value
    /// overflows during propagation.
    pub fn solve(&self, model: &CpModel) -> Result<SolveOutcome> {
        info!(
            event = "solve_start",
            variables = model.num_vars(),
            constraints = model.constraints().len(),
            time_limit_ms = self.time_limit.as_millis() as u64,
            node_limit = ?self.node_limit,
        );

        let termination = OrTermination::new((
            TimeTermination::new(self.time_limit),
            self.node_limit.map(NodeCountTermination::new),
        ));
        let outcome = BranchAndBound::new(model, termination).search()?;
        let result = classify(model, outcome);

        info!(
            event = "solve_end",
            status = %result.status,
            objective = ?result.solution.as_ref().and_then(Solution::objective),
            nodes = result.statistics.nodes,
            failures = result.statistics.failures,
            solutions = result.statistics.solutions,
            elapsed_ms = result.statistics.elapsed.as_millis() as u64,
        );
        Ok(result)
    }
}

/// Solves a built allocation model with the run's limits.
pub fn solve(model: &AllocationModel, config: &OptimizerConfig) -> Result<SolveOutcome> {
    Solver::from_config(config).solve(model.model())
}

fn classify(model: &CpModel, outcome: SearchOutcome) -> SolveOutcome {
    let mut diagnostics = Vec::new();

    if outcome.empty_domain {
        for var in model.vars().iter().filter(|v| v.domain.is_empty()) {
            warn!(event = "empty_domain", variable = %var.name);
            diagnostics.push(Diagnostic::EmptyDomain {
                variable: var.name.clone(),
            });
        }
    }
    if let Some(idx) = outcome.root_conflict {
        let constraint = model.constraints()[idx].name.clone();
        warn!(event = "root_infeasible", constraint = %constraint);
        diagnostics.push(Diagnostic::RootInfeasible { constraint });
    }

    let status = match (&outcome.best, outcome.exhausted()) {
        (Some(_), true) => SolveStatus::Optimal,
        (Some(_), false) => SolveStatus::Feasible,
        (None, true) => SolveStatus::Infeasible,
        (None, false) if outcome.root_conflict.is_some() => SolveStatus::Infeasible,
        (None, false) => SolveStatus::NoSolutionFound,
    };

    SolveOutcome {
        status,
        solution: outcome.best,
        statistics: outcome.statistics,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Domain, LinearExpr, Objective, Relation};

    fn bounded_max() -> CpModel {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::interval(0, 50));
        let y = model.new_int_var("y", Domain::interval(0, 50));
        model
            .add_constraint("cap", LinearExpr::new().with_term(x, 2).with_term(y, 3), Relation::Le, 60)
            .unwrap();
        let obj = model.new_int_var("obj", Domain::interval(0, 1000));
        model
            .add_equality("obj", &LinearExpr::new().with_term(x, 3).with_term(y, 4), obj)
            .unwrap();
        model.set_objective(Objective::Maximize(obj));
        model
    }

    #[test]
    fn test_status_helpers() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::NoSolutionFound.has_solution());
        assert_eq!(SolveStatus::NoSolutionFound.to_string(), "NO_SOLUTION_FOUND");
    }

    #[test]
    fn test_optimal_when_exhausted() {
        let outcome = Solver::new(Duration::from_secs(10))
            .solve(&bounded_max())
            .unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        // x = 30, y = 0 uses the whole capacity at the best ratio
        assert_eq!(outcome.solution.unwrap().objective(), Some(90));
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_node_limit_yields_feasible_or_nothing() {
        let outcome = Solver::new(Duration::from_secs(10))
            .with_node_limit(3)
            .solve(&bounded_max())
            .unwrap();
        assert!(matches!(
            outcome.status,
            SolveStatus::Feasible | SolveStatus::NoSolutionFound
        ));
        assert!(!outcome.statistics.exhausted);
    }

    #[test]
    fn test_zero_deadline_is_no_solution() {
        let outcome = Solver::new(Duration::ZERO).solve(&bounded_max()).unwrap();
        assert_eq!(outcome.status, SolveStatus::NoSolutionFound);
        assert!(outcome.solution.is_none());
    }

    #[test]
    fn test_root_infeasibility_is_diagnosed() {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::interval(0, 5));
        model
            .add_constraint("too_much", LinearExpr::sum([x]), Relation::Ge, 9)
            .unwrap();
        let outcome = Solver::new(Duration::from_secs(5)).solve(&model).unwrap();
        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::RootInfeasible {
                constraint: "too_much".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_domain_is_diagnosed() {
        let mut model = CpModel::new();
        model.new_int_var("x", Domain::interval(0, 5));
        model.new_int_var("y", Domain::interval(3, 1));
        let outcome = Solver::new(Duration::from_secs(5)).solve(&model).unwrap();
        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::EmptyDomain {
                variable: "y".to_string()
            }]
        );
    }
}
