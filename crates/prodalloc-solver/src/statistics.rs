//! Solver statistics.

use std::time::Duration;

use crate::scope::SearchScope;

/// Statistics for one solve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverStatistics {
    /// Branching decisions taken.
    pub nodes: u64,
    /// Branches closed by a propagation conflict or the objective bound.
    pub failures: u64,
    /// Improving solutions found.
    pub solutions: u64,
    /// Total time spent in search.
    pub elapsed: Duration,
    /// Time at which the final incumbent was found.
    pub time_to_best: Option<Duration>,
    /// Whether the search tree was fully explored.
    pub exhausted: bool,
}

impl SolverStatistics {
    pub(crate) fn from_scope(scope: &SearchScope, exhausted: bool) -> Self {
        Self {
            nodes: scope.node_count(),
            failures: scope.failure_count(),
            solutions: scope.solution_count(),
            elapsed: scope.elapsed(),
            time_to_best: scope.time_to_best(),
            exhausted,
        }
    }

    /// Nodes explored per second.
    pub fn nodes_per_second(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.nodes as f64 / secs) as u64
        } else {
            0
        }
    }
}
