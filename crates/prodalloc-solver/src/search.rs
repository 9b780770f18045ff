//! Depth-first branch-and-bound.
//!
//! Branching is binary on the first unfixed variable in model order: the left
//! child fixes it to the largest value left in its window, the right branch
//! lowers its upper bound below that value. The left child is explored first,
//! so values are effectively tried in decreasing order.
//!
//! Every improving solution tightens the objective variable (`<= best - 1`
//! when minimizing, `>= best + 1` when maximizing) on every open frame before
//! that frame branches again.

use tracing::debug;

use crate::error::Result;
use crate::model::{CpModel, Objective, VarId};
use crate::propagation::{DomainState, Propagation, Propagator, Wipeout};
use crate::scope::SearchScope;
use crate::solution::Solution;
use crate::statistics::SolverStatistics;
use crate::termination::Termination;

/// What one search run produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best solution found, if any.
    pub best: Option<Solution>,
    /// Index of the constraint that failed during root propagation.
    pub root_conflict: Option<usize>,
    /// Whether some variable had an empty static domain.
    pub empty_domain: bool,
    pub statistics: SolverStatistics,
}

impl SearchOutcome {
    /// Whether the whole tree was explored.
    pub fn exhausted(&self) -> bool {
        self.statistics.exhausted
    }
}

/// An open node: a propagated state and the variable it branches on.
#[derive(Debug)]
struct Frame {
    state: DomainState,
    var: Option<VarId>,
}

/// Branch-and-bound search over one model.
///
/// # Examples
///
/// ```
/// use prodalloc_solver::model::{CpModel, Domain, LinearExpr, Objective, Relation};
/// use prodalloc_solver::search::BranchAndBound;
/// use prodalloc_solver::termination::TimeTermination;
///
/// let mut model = CpModel::new();
/// let x = model.new_int_var("x", Domain::interval(0, 4));
/// let y = model.new_int_var("y", Domain::interval(0, 4));
/// model.add_constraint("sum", LinearExpr::sum([x, y]), Relation::Le, 5).unwrap();
/// let obj = model.new_int_var("obj", Domain::interval(0, 100));
/// model
///     .add_equality("obj", &LinearExpr::new().with_term(x, 1).with_term(y, 3), obj)
///     .unwrap();
/// model.set_objective(Objective::Maximize(obj));
///
/// let outcome = BranchAndBound::new(&model, TimeTermination::seconds(5)).search().unwrap();
/// let best = outcome.best.as_ref().unwrap();
/// assert_eq!(best.objective(), Some(13));
/// assert!(outcome.exhausted());
/// ```
#[derive(Debug)]
pub struct BranchAndBound<'m, T> {
    propagator: Propagator<'m>,
    termination: T,
}

impl<'m, T: Termination> BranchAndBound<'m, T> {
    pub fn new(model: &'m CpModel, termination: T) -> Self {
        Self {
            propagator: Propagator::new(model),
            termination,
        }
    }

    /// Runs the search until the tree is exhausted or the termination fires.
    ///
    /// A conflict during root propagation does not abort the run: it is
    /// reported in [`SearchOutcome::root_conflict`] and the search starts from
    /// the unpropagated domains.
    pub fn search(&self) -> Result<SearchOutcome> {
        let model = self.propagator.model();
        let mut scope = SearchScope::new();

        let Some(initial) = DomainState::initial(model) else {
            return Ok(SearchOutcome {
                best: None,
                root_conflict: None,
                empty_domain: true,
                statistics: SolverStatistics::from_scope(&scope, true),
            });
        };

        let mut root = initial.clone();
        let root_conflict = match self.propagator.propagate_all(&mut root)? {
            Propagation::Fixpoint => None,
            Propagation::Conflict(idx) => {
                root = initial;
                Some(idx)
            }
        };

        let objective = model.objective();
        let mut best: Option<Solution> = None;
        let mut stack = vec![Frame {
            state: root,
            var: None,
        }];

        let exhausted = loop {
            if self.termination.is_terminated(&scope) {
                break false;
            }
            let Some(frame) = stack.last_mut() else {
                break true;
            };

            if let (Some(objective), Some(bound)) =
                (objective, best.as_ref().and_then(Solution::objective))
            {
                if !self.apply_bound(&mut frame.state, objective, bound)? {
                    scope.record_failure();
                    stack.pop();
                    continue;
                }
            }

            let var = match frame.var.or_else(|| select_var(model, &frame.state)) {
                Some(var) => {
                    frame.var = Some(var);
                    var
                }
                None => {
                    // Every variable is fixed
                    let values = frame.state.values();
                    stack.pop();
                    if !model.is_feasible(&values) {
                        scope.record_failure();
                        continue;
                    }
                    let value = objective.map(|o| values[o.var().index()]);
                    scope.record_solution(value);
                    debug!(
                        event = "incumbent",
                        objective = ?value,
                        nodes = scope.node_count(),
                        elapsed_ms = scope.elapsed().as_millis() as u64,
                    );
                    best = Some(Solution::new(values, value));
                    if objective.is_none() {
                        break true;
                    }
                    continue;
                }
            };

            scope.record_node();
            let value = frame.state.hi(var);

            let mut child = frame.state.clone();
            let child_ok = child.assign(model, var, value).is_ok()
                && !self.propagator.propagate_from(&mut child, var)?.is_conflict();

            let parent_ok = match frame.state.tighten_hi(model, var, value as i128 - 1) {
                Ok(_) => !self
                    .propagator
                    .propagate_from(&mut frame.state, var)?
                    .is_conflict(),
                Err(Wipeout) => false,
            };
            if !parent_ok {
                stack.pop();
            }

            if child_ok {
                stack.push(Frame {
                    state: child,
                    var: None,
                });
            } else {
                scope.record_failure();
            }
        };

        Ok(SearchOutcome {
            best,
            root_conflict,
            empty_domain: false,
            statistics: SolverStatistics::from_scope(&scope, exhausted),
        })
    }

    /// Restricts the objective to strictly improving values; `false` if none remain.
    fn apply_bound(
        &self,
        state: &mut DomainState,
        objective: Objective,
        incumbent: i64,
    ) -> Result<bool> {
        let model = self.propagator.model();
        let var = objective.var();
        let tightened = match objective {
            Objective::Minimize(_) => state.tighten_hi(model, var, incumbent as i128 - 1),
            Objective::Maximize(_) => state.tighten_lo(model, var, incumbent as i128 + 1),
        };
        match tightened {
            Ok(true) => Ok(!self.propagator.propagate_from(state, var)?.is_conflict()),
            Ok(false) => Ok(true),
            Err(Wipeout) => Ok(false),
        }
    }
}

/// First variable in model order whose window is not a single value.
fn select_var(model: &CpModel, state: &DomainState) -> Option<VarId> {
    model.var_ids().find(|&var| !state.is_fixed(var))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Domain, LinearExpr, Relation};
    use crate::termination::NodeCountTermination;
    use crate::termination::TimeTermination;

    fn knapsack() -> (CpModel, Vec<VarId>) {
        let mut model = CpModel::new();
        let vars: Vec<VarId> = (0..3)
            .map(|i| model.new_int_var(format!("x{i}"), Domain::interval(0, 3)))
            .collect();
        let weight = LinearExpr::new()
            .with_term(vars[0], 3)
            .with_term(vars[1], 4)
            .with_term(vars[2], 5);
        model
            .add_constraint("weight", weight, Relation::Le, 17)
            .unwrap();
        let value = LinearExpr::new()
            .with_term(vars[0], 4)
            .with_term(vars[1], 6)
            .with_term(vars[2], 7);
        let obj = model.new_int_var("value", Domain::interval(0, 1000));
        model.add_equality("value", &value, obj).unwrap();
        model.set_objective(Objective::Maximize(obj));
        (model, vars)
    }

    fn brute_force_best(model: &CpModel) -> i64 {
        let mut best = i64::MIN;
        for a in 0..=3 {
            for b in 0..=3 {
                for c in 0..=3 {
                    let value = 4 * a + 6 * b + 7 * c;
                    if model.is_feasible(&[a, b, c, value]) {
                        best = best.max(value);
                    }
                }
            }
        }
        best
    }

    #[test]
    fn test_finds_optimum() {
        let (model, _) = knapsack();
        let outcome = BranchAndBound::new(&model, TimeTermination::seconds(10))
            .search()
            .unwrap();
        assert!(outcome.exhausted());
        let best = outcome.best.unwrap();
        assert_eq!(best.objective(), Some(brute_force_best(&model)));
        assert!(model.is_feasible(best.values()));
    }

    #[test]
    fn test_minimize() {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::interval(0, 10));
        let y = model.new_int_var("y", Domain::interval(0, 10));
        model
            .add_constraint("demand", LinearExpr::sum([x, y]), Relation::Ge, 7)
            .unwrap();
        let cost = model.new_int_var("cost", Domain::interval(0, 1000));
        model
            .add_equality("cost", &LinearExpr::new().with_term(x, 5).with_term(y, 2), cost)
            .unwrap();
        model.set_objective(Objective::Minimize(cost));

        let outcome = BranchAndBound::new(&model, TimeTermination::seconds(10))
            .search()
            .unwrap();
        let best = outcome.best.unwrap();
        assert_eq!(best.objective(), Some(14));
        assert_eq!((best.value(x), best.value(y)), (0, 7));
        assert!(outcome.statistics.solutions >= 1);
    }

    #[test]
    fn test_first_solution_takes_largest_values() {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::interval(0, 9));
        let y = model.new_int_var("y", Domain::interval(0, 9));
        model
            .add_constraint("sum", LinearExpr::sum([x, y]), Relation::Le, 12)
            .unwrap();

        let outcome = BranchAndBound::new(&model, TimeTermination::seconds(10))
            .search()
            .unwrap();
        let best = outcome.best.unwrap();
        assert_eq!((best.value(x), best.value(y)), (9, 3));
    }

    #[test]
    fn test_infeasible_model_is_exhausted_without_solution() {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::interval(0, 3));
        model
            .add_constraint("impossible", LinearExpr::sum([x]), Relation::Ge, 4)
            .unwrap();
        model.set_objective(Objective::Maximize(x));

        let outcome = BranchAndBound::new(&model, TimeTermination::seconds(10))
            .search()
            .unwrap();
        assert!(outcome.best.is_none());
        assert_eq!(outcome.root_conflict, Some(0));
        assert!(outcome.exhausted());
    }

    #[test]
    fn test_node_limit_stops_early() {
        let (model, _) = knapsack();
        let outcome = BranchAndBound::new(&model, NodeCountTermination::new(1))
            .search()
            .unwrap();
        assert!(!outcome.exhausted());
        assert_eq!(outcome.statistics.nodes, 1);
    }

    #[test]
    fn test_empty_static_domain() {
        let mut model = CpModel::new();
        model.new_int_var("x", Domain::values(Vec::new()));
        let outcome = BranchAndBound::new(&model, TimeTermination::seconds(1))
            .search()
            .unwrap();
        assert!(outcome.empty_domain);
        assert!(outcome.best.is_none());
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let (model, _) = knapsack();
        let run = || {
            BranchAndBound::new(&model, TimeTermination::seconds(10))
                .search()
                .unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.best, b.best);
        assert_eq!(a.statistics.nodes, b.statistics.nodes);
    }
}
