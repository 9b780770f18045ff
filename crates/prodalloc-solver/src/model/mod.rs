//! Integer constraint model.
//!
//! A deliberately small vocabulary: bounded integer variables, linear
//! constraints with `<=`, `==` or `>=`, and a single variable to minimize or
//! maximize.

mod domain;
mod expr;

use std::fmt;

pub use domain::Domain;
pub use expr::{LinearConstraint, LinearExpr, Relation};

use crate::error::BuildError;

/// Index of a variable in its [`CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A named integer decision variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVar {
    pub name: String,
    pub domain: Domain,
}

/// Optimization direction over one objective variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Minimize(VarId),
    Maximize(VarId),
}

impl Objective {
    pub fn var(self) -> VarId {
        match self {
            Objective::Minimize(v) | Objective::Maximize(v) => v,
        }
    }
}

/// Variables, constraints and objective of one solve.
///
/// # Examples
///
/// ```
/// use prodalloc_solver::model::{CpModel, Domain, LinearExpr, Objective, Relation};
///
/// let mut model = CpModel::new();
/// let x = model.new_int_var("x", Domain::interval(0, 10));
/// let y = model.new_int_var("y", Domain::interval(0, 10));
/// model
///     .add_constraint("sum", LinearExpr::sum([x, y]), Relation::Le, 12)
///     .unwrap();
/// model.set_objective(Objective::Maximize(x));
///
/// assert_eq!(model.num_vars(), 2);
/// assert_eq!(model.constraints().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    vars: Vec<IntVar>,
    constraints: Vec<LinearConstraint>,
    objective: Option<Objective>,
}

impl CpModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable; variables are branched on in creation order.
    pub fn new_int_var(&mut self, name: impl Into<String>, domain: Domain) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(IntVar {
            name: name.into(),
            domain,
        });
        id
    }

    /// Adds `expr relation rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Overflow`] if the expression overflowed while it
    /// was assembled, or if folding its constant into `rhs` overflows.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        relation: Relation,
        rhs: i64,
    ) -> Result<usize, BuildError> {
        let name = name.into();
        if expr.is_overflowed() {
            return Err(BuildError::Overflow(format!("coefficients of {name}")));
        }
        let rhs = rhs
            .checked_sub(expr.constant())
            .ok_or_else(|| BuildError::Overflow(format!("right-hand side of {name}")))?;
        self.constraints.push(LinearConstraint {
            name,
            terms: expr.terms().iter().copied().collect(),
            relation,
            rhs,
        });
        Ok(self.constraints.len() - 1)
    }

    /// Adds `expr == var`.
    pub fn add_equality(
        &mut self,
        name: impl Into<String>,
        expr: &LinearExpr,
        var: VarId,
    ) -> Result<usize, BuildError> {
        let mut lhs = expr.clone();
        lhs.add_term(var, -1);
        self.add_constraint(name, lhs, Relation::Eq, 0)
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    pub fn objective(&self) -> Option<Objective> {
        self.objective
    }

    pub fn var(&self, id: VarId) -> &IntVar {
        &self.vars[id.0]
    }

    pub fn vars(&self) -> &[IntVar] {
        &self.vars
    }

    pub fn var_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.vars.len()).map(VarId)
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Checks a full assignment against every domain and constraint.
    pub fn is_feasible(&self, values: &[i64]) -> bool {
        values.len() == self.vars.len()
            && self
                .vars
                .iter()
                .zip(values)
                .all(|(var, &v)| var.domain.contains(v))
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied(|id| values[id.0]))
    }
}
