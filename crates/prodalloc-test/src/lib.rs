//! Shared test fixtures for prodalloc crates.
//!
//! This crate provides record builders, reference instances and a
//! brute-force reference optimizer. It does NOT depend on `prodalloc-solver`,
//! so the solver's own unit tests can use it.
//!
//! - [`fixtures`] - [`RowBuilder`] for flat input records
//! - [`scenarios`] - small reference instances
//! - [`brute_force`] - exhaustive optimum for tiny instances
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! prodalloc-test = { workspace = true }
//! ```

pub mod brute_force;
pub mod fixtures;
pub mod scenarios;

pub use brute_force::{brute_force, BruteForceOptimum};
pub use fixtures::{load, row, RowBuilder};
