//! Search-level scope.

use std::time::{Duration, Instant};

/// Counters and timing for one branch-and-bound run.
///
/// Terminations read this scope; the search updates it.
#[derive(Debug, Clone)]
pub struct SearchScope {
    start_time: Instant,
    node_count: u64,
    failure_count: u64,
    solution_count: u64,
    best_objective: Option<i64>,
    time_to_best: Option<Duration>,
}

impl SearchScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            node_count: 0,
            failure_count: 0,
            solution_count: 0,
            best_objective: None,
            time_to_best: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    pub fn solution_count(&self) -> u64 {
        self.solution_count
    }

    pub fn best_objective(&self) -> Option<i64> {
        self.best_objective
    }

    pub fn time_to_best(&self) -> Option<Duration> {
        self.time_to_best
    }

    pub(crate) fn record_node(&mut self) {
        self.node_count += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failure_count += 1;
    }

    pub(crate) fn record_solution(&mut self, objective: Option<i64>) {
        self.solution_count += 1;
        self.best_objective = objective;
        self.time_to_best = Some(self.elapsed());
    }
}

impl Default for SearchScope {
    fn default() -> Self {
        Self::new()
    }
}
