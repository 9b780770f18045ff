//! Linear expressions and constraints.

use std::fmt;

use smallvec::SmallVec;

use super::VarId;

/// `Σ coef * var + constant`.
///
/// Merging terms or constants that overflow an i64 marks the expression as
/// overflowed; [`CpModel::add_constraint`](super::CpModel::add_constraint)
/// rejects such expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: SmallVec<[(VarId, i64); 8]>,
    constant: i64,
    overflowed: bool,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        let mut expr = Self::new();
        for var in vars {
            expr.add_term(var, 1);
        }
        expr
    }

    /// Builder-style [`add_term`](Self::add_term).
    pub fn with_term(mut self, var: VarId, coef: i64) -> Self {
        self.add_term(var, coef);
        self
    }

    pub fn with_constant(mut self, constant: i64) -> Self {
        self.constant = constant;
        self
    }

    /// Adds `coef * var`, merging with an existing term on the same variable.
    pub fn add_term(&mut self, var: VarId, coef: i64) {
        if coef == 0 {
            return;
        }
        match self.terms.iter_mut().find(|(v, _)| *v == var) {
            Some((_, c)) => match c.checked_add(coef) {
                Some(merged) => *c = merged,
                None => self.overflowed = true,
            },
            None => self.terms.push((var, coef)),
        }
        self.terms.retain(|(_, c)| *c != 0);
    }

    /// Adds all terms and the constant of `other`.
    pub fn add_expr(&mut self, other: &LinearExpr) {
        for &(var, coef) in &other.terms {
            self.add_term(var, coef);
        }
        match self.constant.checked_add(other.constant) {
            Some(constant) => self.constant = constant,
            None => self.overflowed = true,
        }
        self.overflowed |= other.overflowed;
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    pub fn constant(&self) -> i64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether a merge overflowed an i64 coefficient or constant.
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Evaluates the expression; `None` on overflow.
    pub fn evaluate(&self, value_of: impl Fn(VarId) -> i64) -> Option<i128> {
        if self.overflowed {
            return None;
        }
        self.terms
            .iter()
            .try_fold(self.constant as i128, |acc, &(var, coef)| {
                acc.checked_add(coef as i128 * value_of(var) as i128)
            })
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{}", self.constant);
        }
        for (i, (var, coef)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{coef}*{var}")?;
        }
        if self.constant != 0 {
            write!(f, " + {}", self.constant)?;
        }
        Ok(())
    }
}

/// Comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Le,
    Eq,
    Ge,
}

impl Relation {
    pub fn holds(self, lhs: i128, rhs: i128) -> bool {
        match self {
            Relation::Le => lhs <= rhs,
            Relation::Eq => lhs == rhs,
            Relation::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Le => "<=",
            Relation::Eq => "==",
            Relation::Ge => ">=",
        })
    }
}

/// `expr relation rhs`, with the expression constant folded into `rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: SmallVec<[(VarId, i64); 8]>,
    pub relation: Relation,
    pub rhs: i64,
}

impl LinearConstraint {
    /// Checks the constraint against a full assignment.
    pub fn is_satisfied(&self, value_of: impl Fn(VarId) -> i64) -> bool {
        let lhs = self
            .terms
            .iter()
            .try_fold(0_i128, |acc, &(var, coef)| {
                acc.checked_add(coef as i128 * value_of(var) as i128)
            });
        lhs.is_some_and(|lhs| self.relation.holds(lhs, self.rhs as i128))
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.name)?;
        for (i, (var, coef)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{coef}*{var}")?;
        }
        write!(f, " {} {}", self.relation, self.rhs)
    }
}
