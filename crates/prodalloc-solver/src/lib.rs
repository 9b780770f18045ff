//! Constraint model, search and extraction for prodalloc.
//!
//! - [`builder`] - turns a loaded domain model into an integer model
//! - [`model`] - integer variables, linear constraints and the objective
//! - [`propagation`] - bounds-consistency propagation
//! - [`search`] - depth-first branch-and-bound
//! - [`termination`] - deadline and node-count limits
//! - [`driver`] - runs the search and classifies the outcome
//! - [`extractor`] - writes solved values back into the records
//!
//! # Example
//!
//! ```
//! use prodalloc_config::{OptimizationMode, OptimizerConfig};
//! use prodalloc_core::{load, AttributeDictionary, Precision, Record};
//! use prodalloc_solver::{extract, solve, AllocationModel, SolveStatus};
//!
//! let records = vec![
//!     Record::new()
//!         .with("productId", "P1")
//!         .with("stepNumber", 1_i64)
//!         .with("machineId", "M1")
//!         .with("unitValue", 1_i64)
//!         .with("unitCost", 2_i64)
//!         .with("productionValue", 40_i64)
//!         .with("machineUpper", 100_i64),
//! ];
//! let dictionary = AttributeDictionary::new();
//! let config = OptimizerConfig::default().with_optimization_mode(OptimizationMode::Min);
//!
//! let domain = load(&records, &dictionary, Precision::ZERO).unwrap();
//! let model = AllocationModel::build(&domain, &config).unwrap();
//! let outcome = solve(&model, &config).unwrap();
//! assert_eq!(outcome.status, SolveStatus::Optimal);
//!
//! let out = extract(&records, &model, outcome.solution.as_ref(), &dictionary);
//! assert_eq!(out.resolved, 1);
//! ```

pub mod builder;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod model;
pub mod propagation;
pub mod scope;
pub mod search;
pub mod solution;
pub mod statistics;
pub mod termination;

pub use builder::{AllocationModel, MachineUsage};
pub use driver::{solve, Diagnostic, SolveOutcome, SolveStatus, Solver};
pub use error::{BuildError, SolverError};
pub use extractor::{extract, Extraction};
pub use model::{CpModel, Domain, LinearExpr, Objective, Relation, VarId};
pub use solution::Solution;
pub use statistics::SolverStatistics;
