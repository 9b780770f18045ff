//! Bounds-consistency propagation for linear constraints.
//!
//! Every variable is tracked as a `[lo, hi]` window over its static
//! [`Domain`](crate::model::Domain); tightening a bound snaps it to the
//! nearest admissible value. Sums are accumulated in `i128`, so any product
//! of two `i64` values is exact.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::error::{Result, SolverError};
use crate::model::{CpModel, LinearConstraint, Relation, VarId};

/// Current `[lo, hi]` window of every variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainState {
    bounds: Vec<(i64, i64)>,
}

/// A bound update emptied a variable's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wipeout;

impl DomainState {
    /// Initial windows from the model's static domains.
    ///
    /// Returns `None` if some variable has an empty domain.
    pub fn initial(model: &CpModel) -> Option<Self> {
        model
            .vars()
            .iter()
            .map(|v| Some((v.domain.min()?, v.domain.max()?)))
            .collect::<Option<Vec<_>>>()
            .map(|bounds| Self { bounds })
    }

    #[inline]
    pub fn lo(&self, var: VarId) -> i64 {
        self.bounds[var.index()].0
    }

    #[inline]
    pub fn hi(&self, var: VarId) -> i64 {
        self.bounds[var.index()].1
    }

    #[inline]
    pub fn is_fixed(&self, var: VarId) -> bool {
        let (lo, hi) = self.bounds[var.index()];
        lo == hi
    }

    pub fn all_fixed(&self) -> bool {
        self.bounds.iter().all(|(lo, hi)| lo == hi)
    }

    /// Lower bounds of all variables; the assignment once everything is fixed.
    pub fn values(&self) -> Vec<i64> {
        self.bounds.iter().map(|(lo, _)| *lo).collect()
    }

    /// Raises the lower bound to the first admissible value `>= value`.
    pub fn tighten_lo(
        &mut self,
        model: &CpModel,
        var: VarId,
        value: i128,
    ) -> std::result::Result<bool, Wipeout> {
        let (lo, hi) = self.bounds[var.index()];
        if value <= lo as i128 {
            return Ok(false);
        }
        if value > hi as i128 {
            return Err(Wipeout);
        }
        let snapped = model
            .var(var)
            .domain
            .ceil_value(value as i64)
            .filter(|v| *v <= hi)
            .ok_or(Wipeout)?;
        self.bounds[var.index()].0 = snapped;
        Ok(true)
    }

    /// Lowers the upper bound to the last admissible value `<= value`.
    pub fn tighten_hi(
        &mut self,
        model: &CpModel,
        var: VarId,
        value: i128,
    ) -> std::result::Result<bool, Wipeout> {
        let (lo, hi) = self.bounds[var.index()];
        if value >= hi as i128 {
            return Ok(false);
        }
        if value < lo as i128 {
            return Err(Wipeout);
        }
        let snapped = model
            .var(var)
            .domain
            .floor_value(value as i64)
            .filter(|v| *v >= lo)
            .ok_or(Wipeout)?;
        self.bounds[var.index()].1 = snapped;
        Ok(true)
    }

    /// Fixes a variable to `value`.
    pub fn assign(
        &mut self,
        model: &CpModel,
        var: VarId,
        value: i64,
    ) -> std::result::Result<(), Wipeout> {
        self.tighten_lo(model, var, value as i128)?;
        self.tighten_hi(model, var, value as i128)?;
        if self.lo(var) != value {
            return Err(Wipeout);
        }
        Ok(())
    }
}

/// Result of a propagation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Fixpoint reached; every window is non-empty.
    Fixpoint,
    /// Constraint at the given index cannot be satisfied.
    Conflict(usize),
}

impl Propagation {
    pub fn is_conflict(self) -> bool {
        matches!(self, Propagation::Conflict(_))
    }
}

/// Queue-driven bounds propagator over one model.
#[derive(Debug)]
pub struct Propagator<'m> {
    model: &'m CpModel,
    watches: Vec<SmallVec<[usize; 4]>>,
}

impl<'m> Propagator<'m> {
    pub fn new(model: &'m CpModel) -> Self {
        let mut watches = vec![SmallVec::new(); model.num_vars()];
        for (idx, constraint) in model.constraints().iter().enumerate() {
            for &(var, _) in &constraint.terms {
                watches[var.index()].push(idx);
            }
        }
        Self { model, watches }
    }

    pub fn model(&self) -> &'m CpModel {
        self.model
    }

    /// Propagates every constraint to a fixpoint.
    pub fn propagate_all(&self, state: &mut DomainState) -> Result<Propagation> {
        self.run(state, (0..self.model.constraints().len()).collect())
    }

    /// Propagates the constraints watching `var` and everything they touch.
    pub fn propagate_from(&self, state: &mut DomainState, var: VarId) -> Result<Propagation> {
        self.run(state, self.watches[var.index()].iter().copied().collect())
    }

    fn run(&self, state: &mut DomainState, mut queue: VecDeque<usize>) -> Result<Propagation> {
        let constraints = self.model.constraints();
        let mut queued = vec![false; constraints.len()];
        for &idx in &queue {
            queued[idx] = true;
        }

        let mut changed = SmallVec::<[VarId; 8]>::new();
        while let Some(idx) = queue.pop_front() {
            queued[idx] = false;
            changed.clear();
            if !self.revise(&constraints[idx], state, &mut changed)? {
                return Ok(Propagation::Conflict(idx));
            }
            for var in &changed {
                for &watcher in &self.watches[var.index()] {
                    if !queued[watcher] {
                        queued[watcher] = true;
                        queue.push_back(watcher);
                    }
                }
            }
        }
        Ok(Propagation::Fixpoint)
    }

    /// Returns `false` on conflict.
    fn revise(
        &self,
        constraint: &LinearConstraint,
        state: &mut DomainState,
        changed: &mut SmallVec<[VarId; 8]>,
    ) -> Result<bool> {
        let rhs = constraint.rhs as i128;
        let ok = match constraint.relation {
            Relation::Le => self.revise_le(constraint, 1, rhs, state, changed)?,
            Relation::Ge => self.revise_le(constraint, -1, -rhs, state, changed)?,
            Relation::Eq => {
                self.revise_le(constraint, 1, rhs, state, changed)?
                    && self.revise_le(constraint, -1, -rhs, state, changed)?
            }
        };
        Ok(ok)
    }

    /// Enforces `Σ sign * a_i * x_i <= rhs`.
    fn revise_le(
        &self,
        constraint: &LinearConstraint,
        sign: i128,
        rhs: i128,
        state: &mut DomainState,
        changed: &mut SmallVec<[VarId; 8]>,
    ) -> Result<bool> {
        let overflow = || SolverError::Overflow(constraint.name.clone());

        let mut min_sum: i128 = 0;
        for &(var, coef) in &constraint.terms {
            let term = min_term(sign * coef as i128, state, var);
            min_sum = min_sum.checked_add(term).ok_or_else(overflow)?;
        }
        if min_sum > rhs {
            return Ok(false);
        }

        for &(var, coef) in &constraint.terms {
            let a = sign * coef as i128;
            let rest = min_sum - min_term(a, state, var);
            let slack = rhs.checked_sub(rest).ok_or_else(overflow)?;
            let tightened = if a > 0 {
                state.tighten_hi(self.model, var, floor_div(slack, a))
            } else {
                state.tighten_lo(self.model, var, ceil_div(slack, a))
            };
            match tightened {
                Ok(true) => changed.push(var),
                Ok(false) => {}
                Err(Wipeout) => return Ok(false),
            }
        }
        Ok(true)
    }
}

/// Smallest value of `a * x` over the window of `x`.
#[inline]
fn min_term(a: i128, state: &DomainState, var: VarId) -> i128 {
    if a >= 0 {
        a * state.lo(var) as i128
    } else {
        a * state.hi(var) as i128
    }
}

fn floor_div(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d != 0 && ((n < 0) != (d < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d != 0 && ((n < 0) == (d < 0)) {
        q + 1
    } else {
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Domain, LinearExpr};

    #[test]
    fn test_division_rounding() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(ceil_div(7, 2), 4);
        assert_eq!(ceil_div(-7, 2), -3);
        assert_eq!(ceil_div(7, -2), -3);
        assert_eq!(floor_div(6, -2), -3);
    }

    #[test]
    fn test_sum_le_tightens_upper_bounds() {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::interval(2, 10));
        let y = model.new_int_var("y", Domain::interval(0, 10));
        model
            .add_constraint("cap", LinearExpr::new().with_term(x, 1).with_term(y, 2), Relation::Le, 8)
            .unwrap();

        let mut state = DomainState::initial(&model).unwrap();
        let propagator = Propagator::new(&model);
        assert_eq!(propagator.propagate_all(&mut state).unwrap(), Propagation::Fixpoint);
        assert_eq!(state.hi(x), 8);
        assert_eq!(state.hi(y), 3);
    }

    #[test]
    fn test_equality_chains_through_watchers() {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::interval(0, 10));
        let y = model.new_int_var("y", Domain::interval(0, 10));
        let total = model.new_int_var("total", Domain::interval(0, 100));
        model
            .add_constraint("plan", LinearExpr::sum([x, y]), Relation::Eq, 12)
            .unwrap();
        model
            .add_equality("link", &LinearExpr::new().with_term(x, 3).with_term(y, 1), total)
            .unwrap();

        let mut state = DomainState::initial(&model).unwrap();
        let propagator = Propagator::new(&model);
        assert_eq!(propagator.propagate_all(&mut state).unwrap(), Propagation::Fixpoint);
        assert_eq!((state.lo(x), state.lo(y)), (2, 2));

        state.assign(&model, x, 10).unwrap();
        assert_eq!(propagator.propagate_from(&mut state, x).unwrap(), Propagation::Fixpoint);
        assert!(state.all_fixed());
        assert_eq!(state.values(), vec![10, 2, 32]);
    }

    #[test]
    fn test_conflict_is_reported() {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::interval(0, 5));
        let y = model.new_int_var("y", Domain::interval(0, 5));
        model
            .add_constraint("too_much", LinearExpr::sum([x, y]), Relation::Ge, 11)
            .unwrap();

        let mut state = DomainState::initial(&model).unwrap();
        let propagator = Propagator::new(&model);
        assert_eq!(propagator.propagate_all(&mut state).unwrap(), Propagation::Conflict(0));
    }

    #[test]
    fn test_bounds_snap_to_admissible_values() {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::stepped(0, 100, 10));
        let y = model.new_int_var("y", Domain::values([0, 7, 30]));
        model
            .add_constraint("limit", LinearExpr::sum([x, y]), Relation::Le, 45)
            .unwrap();
        model
            .add_constraint("floor", LinearExpr::sum([x]), Relation::Ge, 11)
            .unwrap();

        let mut state = DomainState::initial(&model).unwrap();
        let propagator = Propagator::new(&model);
        assert_eq!(propagator.propagate_all(&mut state).unwrap(), Propagation::Fixpoint);
        assert_eq!((state.lo(x), state.hi(x)), (20, 40));
        assert_eq!((state.lo(y), state.hi(y)), (0, 7));
    }

    #[test]
    fn test_negative_coefficients() {
        let mut model = CpModel::new();
        let x = model.new_int_var("x", Domain::interval(0, 10));
        let y = model.new_int_var("y", Domain::interval(0, 10));
        // x - y >= 4
        model
            .add_constraint("gap", LinearExpr::new().with_term(x, 1).with_term(y, -1), Relation::Ge, 4)
            .unwrap();

        let mut state = DomainState::initial(&model).unwrap();
        let propagator = Propagator::new(&model);
        assert_eq!(propagator.propagate_all(&mut state).unwrap(), Propagation::Fixpoint);
        assert_eq!(state.lo(x), 4);
        assert_eq!(state.hi(y), 6);
    }

    #[test]
    fn test_empty_domain_has_no_initial_state() {
        let mut model = CpModel::new();
        model.new_int_var("x", Domain::interval(3, 1));
        assert!(DomainState::initial(&model).is_none());
    }
}
