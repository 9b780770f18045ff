//! Domain model loader.
//!
//! Converts raw [`Record`]s into a [`DomainModel`]. Every field access goes
//! through the [`AttributeDictionary`], every decimal goes through
//! [`Precision`], and the first invalid row aborts the whole load.
//!
//! Products and machines are denormalized across rows: each row repeats the
//! attributes of its product and machine, and all repetitions must agree.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::info;

use crate::dictionary::{Attribute, AttributeDictionary};
use crate::domain::{
    DomainModel, MachineResource, OptiBean, Product, StepStatus, TechnologyStep, TripleKey,
};
use crate::error::{LoadError, Result, ScaleError};
use crate::record::Record;
use crate::scale::Precision;

/// Default upper production bound when a row carries none (unscaled units).
pub const DEFAULT_PRODUCTION_UPPER: i64 = 1_000_000;

/// Default allocation bounds when a row carries no `LOW_VALUE`/`HIGH_VALUE` (unscaled units).
pub const DEFAULT_LOW_VALUE: i64 = 0;
pub const DEFAULT_HIGH_VALUE: i64 = 1_000_000;

/// Options controlling the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub precision: Precision,
    /// Upper production bound used when `PRODUCTION_UPPER` is absent (unscaled).
    pub default_production_upper: i64,
    /// Allocation bounds used when `LOW_VALUE`/`HIGH_VALUE` are absent (unscaled).
    pub low_value: i64,
    pub high_value: i64,
}

impl LoadOptions {
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            default_production_upper: DEFAULT_PRODUCTION_UPPER,
            low_value: DEFAULT_LOW_VALUE,
            high_value: DEFAULT_HIGH_VALUE,
        }
    }

    pub fn with_default_production_upper(mut self, upper: i64) -> Self {
        self.default_production_upper = upper;
        self
    }

    /// Sets the allocation bounds that apply to rows without their own.
    pub fn with_value_bounds(mut self, low: i64, high: i64) -> Self {
        self.low_value = low;
        self.high_value = high;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new(Precision::ZERO)
    }
}

/// Loads records with default options at the given precision.
///
/// # Examples
///
/// ```
/// use prodalloc_core::{load, AttributeDictionary, Precision, Record};
///
/// let row = Record::new()
///     .with("productId", "P1")
///     .with("stepNumber", 1_i64)
///     .with("machineId", "M1")
///     .with("unitValue", 1_i64)
///     .with("productionValue", 100_i64)
///     .with("machineUpper", 200_i64);
///
/// let model = load(&[row], &AttributeDictionary::new(), Precision::ZERO).unwrap();
/// assert_eq!(model.beans.len(), 1);
/// assert_eq!(model.products["P1"].production_value, 100);
/// ```
pub fn load(
    records: &[Record],
    dictionary: &AttributeDictionary,
    precision: Precision,
) -> Result<DomainModel> {
    load_with(records, dictionary, &LoadOptions::new(precision))
}

/// Loads records with explicit options.
///
/// # Errors
///
/// Returns the first [`LoadError`] encountered; no partial model is returned.
pub fn load_with(
    records: &[Record],
    dictionary: &AttributeDictionary,
    options: &LoadOptions,
) -> Result<DomainModel> {
    if records.is_empty() {
        return Err(LoadError::NoRecords);
    }

    let precision = options.precision;
    let scale_option = |value: i64, attribute: Attribute| {
        precision
            .scale_int_quantity(value)
            .map_err(|source| LoadError::Scale {
                row: 0,
                field: dictionary.resolve(attribute).to_string(),
                source,
            })
    };
    let default_upper = scale_option(options.default_production_upper, Attribute::ProductionUpper)?;
    let value_bounds = (
        scale_option(options.low_value, Attribute::LowValue)?,
        scale_option(options.high_value, Attribute::HighValue)?,
    );

    let mut products: BTreeMap<String, Product> = BTreeMap::new();
    let mut machines: BTreeMap<String, MachineResource> = BTreeMap::new();
    let mut steps = Vec::with_capacity(records.len());
    let mut beans = Vec::with_capacity(records.len());
    let mut seen: HashMap<TripleKey, usize> = HashMap::new();

    for (row, record) in records.iter().enumerate() {
        let reader = RowReader {
            row,
            record,
            dictionary,
            precision,
        };

        let product_id = reader.required_text(Attribute::ProductId)?;
        let step_number = reader.step_number()?;
        let machine_id = reader.required_text(Attribute::MachineId)?;
        let key = TripleKey::new(product_id.clone(), step_number, machine_id.clone());

        if let Some(&first_row) = seen.get(&key) {
            return Err(LoadError::DuplicateKey {
                row,
                first_row,
                key,
            });
        }
        seen.insert(key.clone(), row);

        let product = reader.product(product_id.clone(), default_upper)?;
        merge_entity(&mut products, product_id, product, row, "product", dictionary, product_diff)?;
        let product_upper = products[&key.product_id].production_upper;

        let machine = reader.machine(machine_id.clone())?;
        merge_entity(&mut machines, machine_id, machine, row, "machine", dictionary, machine_diff)?;

        let bean = reader.bean(key.clone(), product_upper, value_bounds)?;
        steps.push(TechnologyStep {
            id: reader
                .optional_text(Attribute::StepId)
                .unwrap_or_else(|| key.to_string()),
            product_id: key.product_id.clone(),
            machine_id: key.machine_id.clone(),
            step_number,
            resource_required_per_unit: bean.unit_value,
            status: if bean.fixed {
                StepStatus::Fixed
            } else {
                StepStatus::Free
            },
            fixed_production: bean.fixed.then_some(bean.current_value),
            predecessor_step_ids: reader.predecessors(),
        });
        beans.push(bean);
    }

    let model = DomainModel {
        products,
        steps,
        machines,
        beans,
        precision,
    };

    info!(
        event = "load_end",
        records = records.len(),
        products = model.products.len(),
        machines = model.machines.len(),
        fixed = model.fixed_count(),
        precision = precision.digits(),
    );

    Ok(model)
}

/// Inserts `entity` under `id`, or checks it against the already loaded one.
fn merge_entity<T>(
    map: &mut BTreeMap<String, T>,
    id: String,
    entity: T,
    row: usize,
    kind: &'static str,
    dictionary: &AttributeDictionary,
    diff: fn(&T, &T) -> Option<Attribute>,
) -> Result<()> {
    match map.get(&id) {
        Some(existing) => match diff(existing, &entity) {
            Some(attribute) => Err(LoadError::Inconsistent {
                row,
                entity: kind,
                id,
                field: dictionary.resolve(attribute).to_string(),
            }),
            None => Ok(()),
        },
        None => {
            map.insert(id, entity);
            Ok(())
        }
    }
}

fn product_diff(a: &Product, b: &Product) -> Option<Attribute> {
    if a.name != b.name {
        Some(Attribute::ProductName)
    } else if a.price != b.price {
        Some(Attribute::Price)
    } else if a.production_low != b.production_low {
        Some(Attribute::ProductionLow)
    } else if a.production_upper != b.production_upper {
        Some(Attribute::ProductionUpper)
    } else if a.production_value != b.production_value {
        Some(Attribute::ProductionValue)
    } else {
        None
    }
}

fn machine_diff(a: &MachineResource, b: &MachineResource) -> Option<Attribute> {
    if a.name != b.name {
        Some(Attribute::MachineName)
    } else if a.low_bound != b.low_bound {
        Some(Attribute::MachineLow)
    } else if a.upper_bound != b.upper_bound {
        Some(Attribute::MachineUpper)
    } else if a.resource_total != b.resource_total {
        Some(Attribute::ResourceTotal)
    } else if a.resource_unit_cost != b.resource_unit_cost {
        Some(Attribute::ResourceUnitCost)
    } else if a.measure_unit != b.measure_unit {
        Some(Attribute::MeasureUnit)
    } else {
        None
    }
}

/// Typed, dictionary-resolved access to one record.
struct RowReader<'a> {
    row: usize,
    record: &'a Record,
    dictionary: &'a AttributeDictionary,
    precision: Precision,
}

impl RowReader<'_> {
    fn field(&self, attribute: Attribute) -> &str {
        self.dictionary.resolve(attribute)
    }

    fn missing(&self, attribute: Attribute) -> LoadError {
        LoadError::MissingField {
            row: self.row,
            attribute,
            field: self.field(attribute).to_string(),
        }
    }

    fn invalid(&self, attribute: Attribute, expected: &'static str) -> LoadError {
        let value = self
            .record
            .get(self.field(attribute))
            .map(ToString::to_string)
            .unwrap_or_default();
        LoadError::InvalidValue {
            row: self.row,
            field: self.field(attribute).to_string(),
            value,
            expected,
        }
    }

    fn scale_error(&self, attribute: Attribute, source: ScaleError) -> LoadError {
        LoadError::Scale {
            row: self.row,
            field: self.field(attribute).to_string(),
            source,
        }
    }

    fn optional_text(&self, attribute: Attribute) -> Option<String> {
        self.record
            .non_empty(self.field(attribute))
            .and_then(|v| v.as_text())
    }

    fn required_text(&self, attribute: Attribute) -> Result<String> {
        self.optional_text(attribute)
            .ok_or_else(|| self.missing(attribute))
    }

    fn decimal(&self, attribute: Attribute) -> Result<Option<Decimal>> {
        match self.record.non_empty(self.field(attribute)) {
            None => Ok(None),
            Some(value) => value
                .as_decimal()
                .map(Some)
                .ok_or_else(|| self.invalid(attribute, "a decimal number")),
        }
    }

    fn required_decimal(&self, attribute: Attribute) -> Result<Decimal> {
        self.decimal(attribute)?
            .ok_or_else(|| self.missing(attribute))
    }

    fn flag(&self, attribute: Attribute) -> Result<Option<bool>> {
        match self.record.non_empty(self.field(attribute)) {
            None => Ok(None),
            Some(value) => value
                .as_flag()
                .map(Some)
                .ok_or_else(|| self.invalid(attribute, "a boolean flag")),
        }
    }

    fn quantity(&self, attribute: Attribute) -> Result<Option<i64>> {
        self.decimal(attribute)?
            .map(|d| {
                self.precision
                    .scale_quantity(d)
                    .map_err(|e| self.scale_error(attribute, e))
            })
            .transpose()
    }

    fn rate(&self, attribute: Attribute) -> Result<Option<i64>> {
        let scaled = self
            .decimal(attribute)?
            .map(|d| {
                self.precision
                    .scale_rate(d)
                    .map_err(|e| self.scale_error(attribute, e))
            })
            .transpose()?;
        if scaled.is_some_and(|v| v < 0) {
            return Err(LoadError::NegativeRate {
                row: self.row,
                field: self.field(attribute).to_string(),
            });
        }
        Ok(scaled)
    }

    fn capacity(&self, attribute: Attribute) -> Result<Option<i64>> {
        self.decimal(attribute)?
            .map(|d| {
                self.precision
                    .scale_capacity(d)
                    .map_err(|e| self.scale_error(attribute, e))
            })
            .transpose()
    }

    fn step_number(&self) -> Result<u32> {
        let value = self.required_decimal(Attribute::StepNumber)?;
        if !value.fract().is_zero() || value.is_sign_negative() {
            return Err(self.invalid(Attribute::StepNumber, "a non-negative integer"));
        }
        value
            .to_u32()
            .ok_or_else(|| self.invalid(Attribute::StepNumber, "a non-negative integer"))
    }

    fn predecessors(&self) -> BTreeSet<String> {
        self.optional_text(Attribute::Predecessors)
            .map(|list| {
                list.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn product(&self, id: String, default_upper: i64) -> Result<Product> {
        let production_value = self
            .quantity(Attribute::ProductionValue)?
            .ok_or_else(|| self.missing(Attribute::ProductionValue))?;
        let production_low = self.quantity(Attribute::ProductionLow)?.unwrap_or(0);
        let production_upper = self
            .quantity(Attribute::ProductionUpper)?
            .unwrap_or(default_upper);

        if production_low > production_upper {
            return Err(LoadError::InvertedBounds {
                entity: "product",
                id,
                low: self.precision.unscale_quantity(production_low),
                high: self.precision.unscale_quantity(production_upper),
            });
        }

        Ok(Product {
            name: self
                .optional_text(Attribute::ProductName)
                .unwrap_or_else(|| id.clone()),
            price: self.decimal(Attribute::Price)?.unwrap_or(Decimal::ZERO),
            production_low,
            production_upper,
            production_value,
            id,
        })
    }

    fn machine(&self, id: String) -> Result<MachineResource> {
        let upper_bound = self
            .capacity(Attribute::MachineUpper)?
            .ok_or_else(|| self.missing(Attribute::MachineUpper))?;
        let low_bound = self.capacity(Attribute::MachineLow)?.unwrap_or(0);
        if low_bound < 0 {
            return Err(LoadError::NegativeBound {
                row: self.row,
                field: self.field(Attribute::MachineLow).to_string(),
            });
        }

        if low_bound > upper_bound {
            return Err(LoadError::InvertedBounds {
                entity: "machine",
                id,
                low: self.precision.unscale_capacity(low_bound),
                high: self.precision.unscale_capacity(upper_bound),
            });
        }

        Ok(MachineResource {
            name: self
                .optional_text(Attribute::MachineName)
                .unwrap_or_else(|| id.clone()),
            low_bound,
            upper_bound,
            resource_total: self
                .capacity(Attribute::ResourceTotal)?
                .unwrap_or(upper_bound),
            resource_unit_cost: self
                .decimal(Attribute::ResourceUnitCost)?
                .unwrap_or(Decimal::ZERO),
            measure_unit: self
                .optional_text(Attribute::MeasureUnit)
                .unwrap_or_default(),
            id,
        })
    }

    fn bean(
        &self,
        key: TripleKey,
        product_upper: i64,
        (default_low, default_high): (i64, i64),
    ) -> Result<OptiBean> {
        let unit_value = self
            .rate(Attribute::UnitValue)?
            .ok_or_else(|| self.missing(Attribute::UnitValue))?;
        let unit_cost = self.rate(Attribute::UnitCost)?.unwrap_or(0);
        let fixed = self.flag(Attribute::Fixed)?.unwrap_or(false);
        let current = self.quantity(Attribute::CurrentValue)?;
        let low_value = self.quantity(Attribute::LowValue)?;
        let high_value = self.quantity(Attribute::HighValue)?;

        if let (Some(low), Some(high)) = (low_value, high_value) {
            if low > high {
                return Err(LoadError::InvertedBounds {
                    entity: "allocation",
                    id: key.to_string(),
                    low: self.precision.unscale_quantity(low),
                    high: self.precision.unscale_quantity(high),
                });
            }
        }

        if fixed {
            let value = current.ok_or_else(|| LoadError::MissingCurrentValue {
                row: self.row,
                key: key.clone(),
            })?;
            let low = low_value.unwrap_or(default_low).max(0);
            let high = high_value.unwrap_or(default_high).min(product_upper);
            if value < low || value > high {
                return Err(LoadError::FixedOutOfRange {
                    row: self.row,
                    key,
                    value: self.precision.unscale_quantity(value),
                    low: self.precision.unscale_quantity(low),
                    high: self.precision.unscale_quantity(high),
                });
            }
        }

        Ok(OptiBean {
            key,
            row: self.row,
            unit_value,
            unit_cost,
            current_value: current.unwrap_or(0),
            fixed,
            low_value,
            high_value,
        })
    }
}

#[cfg(test)]
mod tests;
