//! Load, build, solve and extract in one call.

use prodalloc_config::{OptimizationMode, OptimizerConfig};
use prodalloc_core::{LoadOptions, Record};
use prodalloc_solver::{
    extract, solve, AllocationModel, Diagnostic, SolveStatus, SolverStatistics,
};
use rust_decimal::Decimal;
use tracing::info;

use crate::boundary::{RecordSink, RecordSource};
use crate::error::{Error, Result};

/// Resolved utilization of one machine, in input units.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineUtilization {
    pub machine_id: String,
    pub used: Decimal,
    pub capacity: Decimal,
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct OptimizationReport {
    pub status: SolveStatus,
    /// Total cost or total utilization, depending on the mode, in input units.
    pub objective: Option<Decimal>,
    pub mode: OptimizationMode,
    pub statistics: SolverStatistics,
    pub diagnostics: Vec<Diagnostic>,
    /// Input records with resolved values written in. Unchanged without a solution.
    pub records: Vec<Record>,
    /// Number of records that received a resolved value.
    pub resolved: usize,
    /// Per-machine utilization; empty without a solution.
    pub machines: Vec<MachineUtilization>,
}

impl OptimizationReport {
    pub fn has_solution(&self) -> bool {
        self.status.has_solution()
    }
}

/// Runs one optimization over in-memory records.
///
/// # Errors
///
/// Fails if the configuration is invalid, a record cannot be loaded, the
/// model cannot be built, or arithmetic overflows during search. Not finding
/// a solution is reported through [`OptimizationReport::status`].
///
/// # Examples
///
/// ```
/// use prodalloc::{optimize, OptimizerConfig, Record, SolveStatus};
///
/// let records = vec![
///     Record::new()
///         .with("productId", "P1")
///         .with("stepNumber", 1_i64)
///         .with("machineId", "M1")
///         .with("unitValue", 1_i64)
///         .with("productionValue", 40_i64)
///         .with("machineUpper", 100_i64),
/// ];
/// let report = optimize(&records, &OptimizerConfig::default()).unwrap();
/// assert_eq!(report.status, SolveStatus::Optimal);
/// assert_eq!(report.objective, Some(40.into()));
/// ```
pub fn optimize(records: &[Record], config: &OptimizerConfig) -> Result<OptimizationReport> {
    config.validate()?;
    let dictionary = config.attribute_dictionary()?;
    let precision = config.precision()?;
    let options = LoadOptions::new(precision)
        .with_default_production_upper(config.global_high_value)
        .with_value_bounds(config.global_low_value, config.global_high_value);

    let domain = prodalloc_core::load_with(records, &dictionary, &options)?;
    let model = AllocationModel::build(&domain, config)?;
    let outcome = solve(&model, config)?;
    let extraction = extract(records, &model, outcome.solution.as_ref(), &dictionary);

    let (objective, machines) = match &outcome.solution {
        Some(solution) => {
            let objective = solution.objective().map(|v| precision.unscale_capacity(v));
            let machines = model
                .machine_usage(solution)?
                .into_iter()
                .map(|usage| MachineUtilization {
                    machine_id: usage.machine_id,
                    used: precision.unscale_capacity(usage.used),
                    capacity: precision.unscale_capacity(usage.capacity),
                })
                .collect();
            (objective, machines)
        }
        None => (None, Vec::new()),
    };

    Ok(OptimizationReport {
        status: outcome.status,
        objective,
        mode: config.optimization_mode,
        statistics: outcome.statistics,
        diagnostics: outcome.diagnostics,
        records: extraction.records,
        resolved: extraction.resolved,
        machines,
    })
}

/// Loads from `source`, optimizes, and persists to `sink` if a solution exists.
///
/// The sink is called at most once.
pub fn run<S, K>(source: &mut S, sink: &mut K, config: &OptimizerConfig) -> Result<OptimizationReport>
where
    S: RecordSource,
    K: RecordSink,
{
    let records = source
        .load_records()
        .map_err(|e| Error::Source(Box::new(e)))?;
    let report = optimize(&records, config)?;

    if report.has_solution() {
        sink.persist_records(&report.records)
            .map_err(|e| Error::Sink(Box::new(e)))?;
        info!(event = "persisted", records = report.records.len(), status = %report.status);
    } else {
        info!(event = "not_persisted", status = %report.status);
    }
    Ok(report)
}
