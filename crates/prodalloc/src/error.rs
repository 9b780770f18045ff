//! Top-level error type.

use prodalloc_config::ConfigError;
use prodalloc_core::LoadError;
use prodalloc_solver::{BuildError, SolverError};
use thiserror::Error;

/// Any failure of an optimization run.
///
/// Load, configuration and build failures abort the run before search.
/// "No solution" is not an error; it is reported through
/// [`SolveStatus`](prodalloc_solver::SolveStatus).
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("model build error: {0}")]
    Build(#[from] BuildError),

    #[error("solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("record source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("record sink failed: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for optimization runs.
pub type Result<T> = std::result::Result<T, Error>;
