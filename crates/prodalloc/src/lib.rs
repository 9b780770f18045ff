//! prodalloc - production allocation optimizer.
//!
//! Takes flat records describing products, technology steps and machines,
//! decides how much of each product step runs on each machine, and writes the
//! result back into the records.
//!
//! # Example
//!
//! ```
//! use prodalloc::{run, InMemorySink, InMemorySource, OptimizerConfig, Record};
//!
//! let records = vec![
//!     Record::new()
//!         .with("productId", "P1")
//!         .with("stepNumber", 1_i64)
//!         .with("machineId", "M1")
//!         .with("unitValue", 1_i64)
//!         .with("productionValue", 40_i64)
//!         .with("machineUpper", 100_i64),
//! ];
//! let mut source = InMemorySource::new(records);
//! let mut sink = InMemorySink::new();
//!
//! let report = run(&mut source, &mut sink, &OptimizerConfig::default()).unwrap();
//! assert!(report.has_solution());
//! assert_eq!(sink.persist_count(), 1);
//! ```

pub mod boundary;
pub mod console;
pub mod error;
pub mod pipeline;

pub use boundary::{InMemorySink, InMemorySource, RecordSink, RecordSource};
pub use error::{Error, Result};
pub use pipeline::{optimize, run, MachineUtilization, OptimizationReport};

pub use prodalloc_config::{
    CapacityBound, ConfigError, DomainOption, OptimizationMode, OptimizerConfig,
    PlanningStrategy,
};
pub use prodalloc_core::{
    Attribute, AttributeDictionary, FieldValue, LoadError, Precision, Record,
};
pub use prodalloc_solver::{Diagnostic, SolveStatus, SolverStatistics};
