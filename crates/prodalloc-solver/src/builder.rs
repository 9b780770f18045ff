//! Constraint model builder.
//!
//! Turns a loaded [`DomainModel`] into a [`CpModel`]:
//!
//! 1. one allocation variable per record, over the global or per-record bounds
//! 2. an equality pinning every fixed allocation to its current value
//! 3. per (product, step): `Σ alloc` related to the plan value by the planning strategy
//! 4. per machine: `Σ alloc * unit_value == utilization`, with utilization bounded
//!    by the machine's capacity
//! 5. per (product, step): `Σ alloc * unit_cost`, summed into the total cost
//! 6. one objective variable, either total cost (minimized) or total
//!    utilization (maximized)
//!
//! Allocation variables are created first, in record order, so the search
//! branches on them before the auxiliary variables.

use std::collections::{BTreeMap, HashMap};

use prodalloc_config::{CapacityBound, DomainOption, OptimizationMode, OptimizerConfig, PlanningStrategy};
use prodalloc_core::{DomainModel, GroupKey, Precision, TripleKey};
use tracing::info;

use crate::error::{self, BuildError};
use crate::model::{CpModel, Domain, LinearExpr, Objective, Relation, VarId};
use crate::solution::Solution;

impl From<PlanningStrategy> for Relation {
    fn from(strategy: PlanningStrategy) -> Self {
        match strategy {
            PlanningStrategy::Aggressive => Relation::Ge,
            PlanningStrategy::Balanced => Relation::Eq,
            PlanningStrategy::Cautious => Relation::Le,
        }
    }
}

/// The decision variable of one (product, step, machine) record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub key: TripleKey,
    /// Position of the source record.
    pub row: usize,
    pub var: VarId,
    pub fixed: bool,
}

/// Expressions of one (product, step) grouping.
#[derive(Debug, Clone)]
pub struct GroupTerms {
    /// `Σ alloc` over the grouping's machines.
    pub total: LinearExpr,
    /// `Σ alloc * unit_cost` (scaled by `s²`).
    pub cost: LinearExpr,
    /// Plan value (scaled by `s`).
    pub plan: i64,
}

/// Expressions of one machine.
#[derive(Debug, Clone)]
pub struct MachineTerms {
    /// Utilization variable (scaled by `s²`).
    pub utilization: VarId,
    /// `Σ alloc * unit_value` over the machine's records.
    pub used: LinearExpr,
    /// Capacity used as the utilization upper bound (scaled by `s²`).
    pub capacity: i64,
}

/// Resolved figures of one machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineUsage {
    pub machine_id: String,
    pub used: i64,
    pub capacity: i64,
}

/// A built model together with the mapping back to the domain.
#[derive(Debug, Clone)]
pub struct AllocationModel {
    model: CpModel,
    allocations: Vec<Allocation>,
    index: HashMap<TripleKey, usize>,
    groups: BTreeMap<GroupKey, GroupTerms>,
    machines: BTreeMap<String, MachineTerms>,
    cost: LinearExpr,
    utilization: LinearExpr,
    objective: Objective,
    mode: OptimizationMode,
    strategy: PlanningStrategy,
    precision: Precision,
}

impl AllocationModel {
    /// Builds the integer model for one run.
    ///
    /// # Errors
    ///
    /// Fails if a configured bound cannot be scaled, a derived bound overflows,
    /// or an allocation ends up with no admissible value.
    pub fn build(domain: &DomainModel, config: &OptimizerConfig) -> Result<Self, BuildError> {
        let precision = domain.precision;
        let mut model = CpModel::new();

        let global_lo = scale_quantity(precision, config.global_low_value, "global_low_value")?;
        let global_hi = scale_quantity(precision, config.global_high_value, "global_high_value")?;
        let admissible = AdmissibleValues::from_config(config, precision)?;

        let mut allocations = Vec::with_capacity(domain.beans.len());
        let mut index = HashMap::with_capacity(domain.beans.len());
        for bean in &domain.beans {
            let lo = bean.low_value.unwrap_or(global_lo);
            let hi = bean.high_value.unwrap_or(global_hi);
            let var_domain = if bean.fixed {
                Domain::interval(lo, hi)
            } else {
                admissible.domain(lo, hi)
            };
            if var_domain.is_empty() {
                return Err(BuildError::EmptyDomain(format!("alloc[{}]", bean.key)));
            }

            let var = model.new_int_var(format!("alloc[{}]", bean.key), var_domain);
            if bean.fixed {
                model.add_constraint(
                    format!("fixed[{}]", bean.key),
                    LinearExpr::sum([var]),
                    Relation::Eq,
                    bean.current_value,
                )?;
            }
            index.insert(bean.key.clone(), allocations.len());
            allocations.push(Allocation {
                key: bean.key.clone(),
                row: bean.row,
                var,
                fixed: bean.fixed,
            });
        }

        let relation = Relation::from(config.planning_strategy);
        let mut groups = BTreeMap::new();
        for (group, members) in domain.groups() {
            let product = domain
                .product(&group.product_id)
                .ok_or_else(|| BuildError::UnknownProduct {
                    key: group.to_string(),
                    product: group.product_id.clone(),
                })?;

            let mut total = LinearExpr::new();
            let mut cost = LinearExpr::new();
            for &i in &members {
                total.add_term(allocations[i].var, 1);
                cost.add_term(allocations[i].var, domain.beans[i].unit_cost);
            }
            model.add_constraint(
                format!("plan[{group}]"),
                total.clone(),
                relation,
                product.production_value,
            )?;
            groups.insert(
                group,
                GroupTerms {
                    total,
                    cost,
                    plan: product.production_value,
                },
            );
        }

        let mut machines = BTreeMap::new();
        for (machine_id, members) in domain.machine_beans() {
            let machine = domain.machine(machine_id).ok_or_else(|| {
                let key = members
                    .first()
                    .map(|&i| domain.beans[i].key.to_string())
                    .unwrap_or_default();
                BuildError::UnknownMachine {
                    key,
                    machine: machine_id.to_string(),
                }
            })?;
            let capacity = match config.capacity_bound {
                CapacityBound::UpperBound => machine.upper_bound,
                CapacityBound::ResourceTotal => machine.resource_total,
            };
            let util_domain = Domain::interval(machine.low_bound, capacity);
            if util_domain.is_empty() {
                return Err(BuildError::EmptyDomain(format!("utilization[{machine_id}]")));
            }

            let utilization = model.new_int_var(format!("utilization[{machine_id}]"), util_domain);
            let mut used = LinearExpr::new();
            for &i in &members {
                used.add_term(allocations[i].var, domain.beans[i].unit_value);
            }
            model.add_equality(format!("capacity[{machine_id}]"), &used, utilization)?;
            machines.insert(
                machine_id.to_string(),
                MachineTerms {
                    utilization,
                    used,
                    capacity,
                },
            );
        }

        let mut cost = LinearExpr::new();
        for terms in groups.values() {
            cost.add_expr(&terms.cost);
        }
        let utilization = LinearExpr::sum(machines.values().map(|m| m.utilization));

        let objective = match config.optimization_mode {
            OptimizationMode::Min => {
                let lo = scale_capacity(precision, config.global_low_cost, "global_low_cost")?;
                let hi = scale_capacity(precision, config.global_high_cost, "global_high_cost")?;
                let var = model.new_int_var("total_cost", Domain::interval(lo, hi));
                model.add_equality("objective[total_cost]", &cost, var)?;
                Objective::Minimize(var)
            }
            OptimizationMode::Max => {
                let hi = machines
                    .values()
                    .try_fold(0_i64, |acc, m| acc.checked_add(m.capacity.max(0)))
                    .ok_or_else(|| BuildError::Overflow("total machine capacity".to_string()))?;
                let var = model.new_int_var("total_utilization", Domain::interval(hi.min(1), hi));
                model.add_equality("objective[total_utilization]", &utilization, var)?;
                Objective::Maximize(var)
            }
        };
        model.set_objective(objective);

        info!(
            event = "model_built",
            variables = model.num_vars(),
            constraints = model.constraints().len(),
            allocations = allocations.len(),
            groups = groups.len(),
            machines = machines.len(),
            mode = %config.optimization_mode,
            strategy = %config.planning_strategy,
        );

        Ok(Self {
            model,
            allocations,
            index,
            groups,
            machines,
            cost,
            utilization,
            objective,
            mode: config.optimization_mode,
            strategy: config.planning_strategy,
            precision,
        })
    }

    pub fn model(&self) -> &CpModel {
        &self.model
    }

    /// Allocations in record order.
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn allocation(&self, key: &TripleKey) -> Option<&Allocation> {
        self.index.get(key).map(|&i| &self.allocations[i])
    }

    pub fn groups(&self) -> &BTreeMap<GroupKey, GroupTerms> {
        &self.groups
    }

    pub fn machines(&self) -> &BTreeMap<String, MachineTerms> {
        &self.machines
    }

    /// Total cost expression (scaled by `s²`).
    pub fn cost(&self) -> &LinearExpr {
        &self.cost
    }

    /// Total utilization expression (scaled by `s²`).
    pub fn utilization(&self) -> &LinearExpr {
        &self.utilization
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn mode(&self) -> OptimizationMode {
        self.mode
    }

    pub fn strategy(&self) -> PlanningStrategy {
        self.strategy
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Resolved allocation of a record, if it has a variable.
    pub fn value(&self, solution: &Solution, key: &TripleKey) -> Option<i64> {
        self.allocation(key).map(|a| solution.value(a.var))
    }

    /// `Σ alloc` of every grouping under a solution.
    pub fn group_totals(
        &self,
        solution: &Solution,
    ) -> error::Result<BTreeMap<GroupKey, i64>> {
        self.groups
            .iter()
            .map(|(group, terms)| {
                let total = solution.evaluate(&terms.total, &format!("plan[{group}]"))?;
                Ok((group.clone(), total))
            })
            .collect()
    }

    /// Used resource and capacity of every machine under a solution.
    pub fn machine_usage(&self, solution: &Solution) -> error::Result<Vec<MachineUsage>> {
        self.machines
            .iter()
            .map(|(id, terms)| {
                Ok(MachineUsage {
                    machine_id: id.clone(),
                    used: solution.evaluate(&terms.used, &format!("capacity[{id}]"))?,
                    capacity: terms.capacity,
                })
            })
            .collect()
    }

    pub fn total_cost(&self, solution: &Solution) -> error::Result<i64> {
        solution.evaluate(&self.cost, "total cost")
    }

    pub fn total_utilization(&self, solution: &Solution) -> error::Result<i64> {
        solution.evaluate(&self.utilization, "total utilization")
    }
}

/// Admissible allocation values for free records.
enum AdmissibleValues {
    Bound,
    Explicit(Domain),
    Stepped(i64),
}

impl AdmissibleValues {
    fn from_config(config: &OptimizerConfig, precision: Precision) -> Result<Self, BuildError> {
        match config.domain_option {
            DomainOption::Bound => Ok(AdmissibleValues::Bound),
            DomainOption::List => match &config.admissible_values {
                Some(values) => {
                    let scaled = values
                        .iter()
                        .map(|&v| {
                            precision.scale_quantity(v).map_err(|source| BuildError::Scale {
                                what: format!("admissible value {v}"),
                                source,
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(AdmissibleValues::Explicit(Domain::values(scaled)))
                }
                None => Ok(AdmissibleValues::Stepped(scale_quantity(
                    precision,
                    config.list_step,
                    "list_step",
                )?)),
            },
        }
    }

    fn domain(&self, lo: i64, hi: i64) -> Domain {
        match self {
            AdmissibleValues::Bound => Domain::interval(lo, hi),
            AdmissibleValues::Explicit(values) => values.clamp(lo, hi),
            AdmissibleValues::Stepped(step) => Domain::stepped(lo, hi, *step),
        }
    }
}

fn scale_quantity(precision: Precision, value: i64, what: &str) -> Result<i64, BuildError> {
    precision
        .scale_int_quantity(value)
        .map_err(|source| BuildError::Scale {
            what: what.to_string(),
            source,
        })
}

fn scale_capacity(precision: Precision, value: i64, what: &str) -> Result<i64, BuildError> {
    precision
        .scale_int_capacity(value)
        .map_err(|source| BuildError::Scale {
            what: what.to_string(),
            source,
        })
}
