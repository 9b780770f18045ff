//! Record builders using the default field names.

use prodalloc_core::{Attribute, AttributeDictionary, DomainModel, FieldValue, Precision, Record};

/// Builder for one input row.
///
/// Starts with the required fields set: unit value 1, unit cost 1, plan
/// value 0 and machine upper bound 1000.
///
/// # Examples
///
/// ```
/// use prodalloc_test::row;
///
/// let record = row("P1", 1, "M1").plan(100).capacity(200).build();
/// assert_eq!(record.get("productionValue").and_then(|v| v.as_decimal()), Some(100.into()));
/// ```
#[derive(Debug, Clone)]
pub struct RowBuilder {
    record: Record,
}

/// Starts a row for the (product, step, machine) triple.
pub fn row(product: &str, step: i64, machine: &str) -> RowBuilder {
    RowBuilder {
        record: Record::new(),
    }
    .set(Attribute::ProductId, product)
    .set(Attribute::StepNumber, step)
    .set(Attribute::MachineId, machine)
    .set(Attribute::UnitValue, 1_i64)
    .set(Attribute::UnitCost, 1_i64)
    .set(Attribute::ProductionValue, 0_i64)
    .set(Attribute::MachineUpper, 1000_i64)
}

impl RowBuilder {
    /// Sets an attribute under its default field name.
    pub fn set(mut self, attribute: Attribute, value: impl Into<FieldValue>) -> Self {
        self.record.set(attribute.default_field(), value);
        self
    }

    /// Blanks the attribute, as an empty spreadsheet cell would.
    pub fn blank(self, attribute: Attribute) -> Self {
        self.set(attribute, FieldValue::Empty)
    }

    pub fn unit_value(self, value: impl Into<FieldValue>) -> Self {
        self.set(Attribute::UnitValue, value)
    }

    pub fn unit_cost(self, value: impl Into<FieldValue>) -> Self {
        self.set(Attribute::UnitCost, value)
    }

    pub fn plan(self, value: impl Into<FieldValue>) -> Self {
        self.set(Attribute::ProductionValue, value)
    }

    /// Machine upper bound.
    pub fn capacity(self, value: impl Into<FieldValue>) -> Self {
        self.set(Attribute::MachineUpper, value)
    }

    pub fn resource_total(self, value: impl Into<FieldValue>) -> Self {
        self.set(Attribute::ResourceTotal, value)
    }

    pub fn machine_low(self, value: impl Into<FieldValue>) -> Self {
        self.set(Attribute::MachineLow, value)
    }

    pub fn current(self, value: impl Into<FieldValue>) -> Self {
        self.set(Attribute::CurrentValue, value)
    }

    /// Marks the row fixed at `value`.
    pub fn fixed(self, value: impl Into<FieldValue>) -> Self {
        self.set(Attribute::Fixed, true).current(value)
    }

    /// Per-row allocation bounds.
    pub fn bounds(self, low: impl Into<FieldValue>, high: impl Into<FieldValue>) -> Self {
        self.set(Attribute::LowValue, low)
            .set(Attribute::HighValue, high)
    }

    pub fn build(self) -> Record {
        self.record
    }
}

impl From<RowBuilder> for Record {
    fn from(builder: RowBuilder) -> Self {
        builder.build()
    }
}

/// Loads records with the default dictionary, panicking on error.
pub fn load(records: &[Record], precision: Precision) -> DomainModel {
    match prodalloc_core::load(records, &AttributeDictionary::new(), precision) {
        Ok(model) => model,
        Err(err) => panic!("fixture records failed to load: {err}"),
    }
}
