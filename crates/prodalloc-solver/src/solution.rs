//! Solved assignments.

use crate::error::{Result, SolverError};
use crate::model::{LinearExpr, VarId};

/// A full assignment of a model's variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    values: Vec<i64>,
    objective: Option<i64>,
}

impl Solution {
    pub fn new(values: Vec<i64>, objective: Option<i64>) -> Self {
        Self { values, objective }
    }

    #[inline]
    pub fn value(&self, var: VarId) -> i64 {
        self.values[var.index()]
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Objective value, if the model had an objective.
    pub fn objective(&self) -> Option<i64> {
        self.objective
    }

    /// Evaluates an expression under this assignment.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::ValueOutOfRange`] if the value does not fit in an i64.
    pub fn evaluate(&self, expr: &LinearExpr, what: &str) -> Result<i64> {
        expr.evaluate(|v| self.value(v))
            .and_then(|v| i64::try_from(v).ok())
            .ok_or_else(|| SolverError::ValueOutOfRange(what.to_string()))
    }
}
