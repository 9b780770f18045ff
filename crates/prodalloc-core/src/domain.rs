//! Typed domain objects built by the loader.
//!
//! All quantities are stored already scaled by the run's [`Precision`]; see
//! [`crate::scale`] for which values use `s` and which use `s²`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;

use crate::scale::Precision;

/// Identity of one allocation: (product, step number, machine).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripleKey {
    pub product_id: String,
    pub step_number: u32,
    pub machine_id: String,
}

impl TripleKey {
    pub fn new(product_id: impl Into<String>, step_number: u32, machine_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            step_number,
            machine_id: machine_id.into(),
        }
    }

    /// The (product, step) grouping this allocation belongs to.
    pub fn group(&self) -> GroupKey {
        GroupKey {
            product_id: self.product_id.clone(),
            step_number: self.step_number,
        }
    }
}

impl fmt::Display for TripleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.product_id, self.step_number, self.machine_id)
    }
}

/// Identity of a (product, step) grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub product_id: String,
    pub step_number: u32,
}

impl GroupKey {
    pub fn new(product_id: impl Into<String>, step_number: u32) -> Self {
        Self {
            product_id: product_id.into(),
            step_number,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product_id, self.step_number)
    }
}

/// A product with its production bounds and plan target.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    /// Lower bound on total production (scaled by `s`).
    pub production_low: i64,
    /// Upper bound on total production (scaled by `s`).
    pub production_upper: i64,
    /// Externally supplied plan target (scaled by `s`).
    pub production_value: i64,
}

/// Whether a step's allocation is free for the optimizer or pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepStatus {
    #[default]
    Free,
    Fixed,
}

/// A production stage of one product executed on one machine.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologyStep {
    pub id: String,
    pub product_id: String,
    pub machine_id: String,
    pub step_number: u32,
    /// Resource consumed per produced unit (scaled by `s`).
    pub resource_required_per_unit: i64,
    pub status: StepStatus,
    /// Pinned production when `status` is [`StepStatus::Fixed`] (scaled by `s`).
    pub fixed_production: Option<i64>,
    /// Process-ordering bookkeeping only; not a scheduling precedence.
    pub predecessor_step_ids: BTreeSet<String>,
}

impl TechnologyStep {
    pub fn is_fixed(&self) -> bool {
        self.status == StepStatus::Fixed
    }

    pub fn key(&self) -> TripleKey {
        TripleKey::new(self.product_id.clone(), self.step_number, self.machine_id.clone())
    }
}

/// A machine or resource with its capacity range.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineResource {
    pub id: String,
    pub name: String,
    /// Minimum utilization (scaled by `s²`).
    pub low_bound: i64,
    /// Maximum utilization (scaled by `s²`).
    pub upper_bound: i64,
    /// Total available resource (scaled by `s²`).
    pub resource_total: i64,
    pub resource_unit_cost: Decimal,
    pub measure_unit: String,
}

/// One flat allocation row ready for modeling.
#[derive(Debug, Clone, PartialEq)]
pub struct OptiBean {
    pub key: TripleKey,
    /// Position of the source record in the input sequence.
    pub row: usize,
    /// Resource per unit (scaled by `s`).
    pub unit_value: i64,
    /// Cost per unit (scaled by `s`).
    pub unit_cost: i64,
    /// Present allocation (scaled by `s`).
    pub current_value: i64,
    pub fixed: bool,
    /// Per-record allocation lower bound override (scaled by `s`).
    pub low_value: Option<i64>,
    /// Per-record allocation upper bound override (scaled by `s`).
    pub high_value: Option<i64>,
}

/// Everything the loader produces for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainModel {
    pub products: BTreeMap<String, Product>,
    pub steps: Vec<TechnologyStep>,
    pub machines: BTreeMap<String, MachineResource>,
    pub beans: Vec<OptiBean>,
    pub precision: Precision,
}

impl DomainModel {
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn machine(&self, id: &str) -> Option<&MachineResource> {
        self.machines.get(id)
    }

    /// Bean indexes grouped by (product, step), in key order.
    pub fn groups(&self) -> BTreeMap<GroupKey, Vec<usize>> {
        let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
        for (idx, bean) in self.beans.iter().enumerate() {
            groups.entry(bean.key.group()).or_default().push(idx);
        }
        groups
    }

    /// Bean indexes grouped by machine; every known machine has an entry.
    pub fn machine_beans(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut by_machine: BTreeMap<&str, Vec<usize>> = self
            .machines
            .keys()
            .map(|id| (id.as_str(), Vec::new()))
            .collect();
        for (idx, bean) in self.beans.iter().enumerate() {
            by_machine
                .entry(bean.key.machine_id.as_str())
                .or_default()
                .push(idx);
        }
        by_machine
    }

    pub fn fixed_count(&self) -> usize {
        self.beans.iter().filter(|b| b.fixed).count()
    }
}
