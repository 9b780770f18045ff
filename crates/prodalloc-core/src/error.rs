//! Error types for loading and scaling input data.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::dictionary::Attribute;
use crate::domain::TripleKey;

/// Errors raised while converting decimal inputs to solver integers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleError {
    /// The precision would make `10^(2 * precision)` overflow an i64.
    #[error("precision {0} is too large (maximum is 9)")]
    PrecisionTooLarge(u32),

    /// The scaled value does not fit in an i64.
    #[error("value {value} overflows after scaling by 10^{exponent}")]
    Overflow { value: Decimal, exponent: u32 },

    /// The scaled value still has a fractional part.
    #[error("value {value} has more decimal places than allowed by 10^{exponent} scaling")]
    NotIntegral { value: Decimal, exponent: u32 },
}

/// Errors raised while parsing an attribute map or resolving a canonical key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictionaryError {
    /// An entry of the `KEY=value` list has no `=` or an empty side.
    #[error("malformed attribute map entry '{0}', expected KEY=value")]
    MalformedEntry(String),

    /// The canonical key is not one of the known attributes.
    #[error("unknown canonical attribute '{0}'")]
    UnknownAttribute(String),
}

/// Errors raised by the domain model loader.
///
/// Loading is fail-fast: the first error aborts the run and no model is built.
/// Row indexes are zero-based positions in the input sequence.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input sequence contained no records.
    #[error("no records to load")]
    NoRecords,

    /// A required field is absent or blank.
    #[error("row {row}: missing required field '{field}' ({attribute})")]
    MissingField {
        row: usize,
        attribute: Attribute,
        field: String,
    },

    /// A field is present but cannot be parsed as the expected type.
    #[error("row {row}: field '{field}' has invalid value '{value}', expected {expected}")]
    InvalidValue {
        row: usize,
        field: String,
        value: String,
        expected: &'static str,
    },

    /// A per-unit rate is negative.
    #[error("row {row}: field '{field}' must not be negative")]
    NegativeRate { row: usize, field: String },

    /// A lower capacity bound is negative.
    #[error("row {row}: lower bound '{field}' must not be negative")]
    NegativeBound { row: usize, field: String },

    /// A low bound exceeds its high bound.
    #[error("{entity} '{id}': low bound {low} exceeds upper bound {high}")]
    InvertedBounds {
        entity: &'static str,
        id: String,
        low: Decimal,
        high: Decimal,
    },

    /// A fixed record has no current value.
    #[error("row {row}: fixed allocation {key} has no current value")]
    MissingCurrentValue { row: usize, key: TripleKey },

    /// A fixed record's current value lies outside its admissible range.
    #[error("row {row}: fixed allocation {key} has value {value} outside [{low}, {high}]")]
    FixedOutOfRange {
        row: usize,
        key: TripleKey,
        value: Decimal,
        low: Decimal,
        high: Decimal,
    },

    /// Two records share the same (product, step, machine) key.
    #[error("row {row}: duplicate allocation {key} (first seen at row {first_row})")]
    DuplicateKey {
        row: usize,
        first_row: usize,
        key: TripleKey,
    },

    /// Two rows describe the same product or machine with different attributes.
    #[error("row {row}: {entity} '{id}' has conflicting value for '{field}'")]
    Inconsistent {
        row: usize,
        entity: &'static str,
        id: String,
        field: String,
    },

    /// A value could not be scaled to a solver integer.
    #[error("row {row}: field '{field}': {source}")]
    Scale {
        row: usize,
        field: String,
        #[source]
        source: ScaleError,
    },
}

/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;
