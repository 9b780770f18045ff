//! prodalloc Core - records, domain model and loading
//!
//! This crate provides the input side of the production-allocation pipeline:
//! - Flat [`Record`]s as produced by external loaders
//! - The [`AttributeDictionary`] mapping canonical attributes to source fields
//! - Typed domain objects ([`Product`], [`TechnologyStep`], [`MachineResource`], [`OptiBean`])
//! - [`Precision`] scaling between decimal inputs and solver integers
//! - The fail-fast [`load`] operation that validates and builds a [`DomainModel`]

pub mod dictionary;
pub mod domain;
pub mod error;
pub mod loader;
pub mod record;
pub mod scale;

pub use dictionary::{Attribute, AttributeDictionary};
pub use domain::{
    DomainModel, GroupKey, MachineResource, OptiBean, Product, StepStatus, TechnologyStep,
    TripleKey,
};
pub use error::{DictionaryError, LoadError, ScaleError};
pub use loader::{load, load_with, LoadOptions};
pub use record::{FieldValue, Record};
pub use scale::Precision;
