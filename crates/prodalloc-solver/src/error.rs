//! Error types for model building and solving.

use prodalloc_core::ScaleError;
use thiserror::Error;

/// Errors raised while turning a domain model into an integer model.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A configured bound or admissible value could not be scaled.
    #[error("cannot scale {what}: {source}")]
    Scale {
        what: String,
        #[source]
        source: ScaleError,
    },

    /// A derived bound does not fit in an i64.
    #[error("arithmetic overflow while computing {0}")]
    Overflow(String),

    /// A variable ended up with no admissible value.
    #[error("variable {0} has an empty domain")]
    EmptyDomain(String),

    /// The domain model references a machine that was not loaded.
    #[error("allocation {key} references unknown machine '{machine}'")]
    UnknownMachine { key: String, machine: String },

    /// The domain model references a product that was not loaded.
    #[error("allocation {key} references unknown product '{product}'")]
    UnknownProduct { key: String, product: String },
}

/// Errors raised during propagation or search.
#[derive(Debug, Error)]
pub enum SolverError {
    /// An intermediate sum exceeded the representable range.
    #[error("arithmetic overflow in constraint '{0}'")]
    Overflow(String),

    /// An expression value does not fit in an i64.
    #[error("value of {0} does not fit in a 64-bit integer")]
    ValueOutOfRange(String),
}

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;
