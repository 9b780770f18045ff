//! Writes solved allocations back into the flat records.

use prodalloc_core::{Attribute, AttributeDictionary, Record, TripleKey};
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use crate::builder::AllocationModel;
use crate::solution::Solution;

/// Records after extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub records: Vec<Record>,
    /// Records that received a resolved value.
    pub resolved: usize,
    /// Records with no matching allocation, passed through unchanged.
    pub unmatched: usize,
    /// Whether a solution was available; `false` means the records are untouched.
    pub solution_found: bool,
}

/// Sets the resolved-value field of every record matching an allocation.
///
/// Values are unscaled back to the input's units. Every other field is left
/// as it was. Without a solution the records are returned unchanged.
pub fn extract(
    records: &[Record],
    model: &AllocationModel,
    solution: Option<&Solution>,
    dictionary: &AttributeDictionary,
) -> Extraction {
    let Some(solution) = solution else {
        info!(event = "extract_end", solution_found = false, records = records.len());
        return Extraction {
            records: records.to_vec(),
            resolved: 0,
            unmatched: records.len(),
            solution_found: false,
        };
    };

    let field = dictionary.resolve(Attribute::ResolvedValue);
    let precision = model.precision();
    let mut resolved = 0;
    let mut unmatched = 0;

    let records = records
        .iter()
        .map(|record| {
            let value = record_key(record, dictionary).and_then(|key| model.value(solution, &key));
            match value {
                Some(value) => {
                    resolved += 1;
                    record
                        .clone()
                        .with(field, precision.unscale_quantity(value))
                }
                None => {
                    unmatched += 1;
                    record.clone()
                }
            }
        })
        .collect();

    info!(
        event = "extract_end",
        solution_found = true,
        resolved,
        unmatched,
        field,
    );
    Extraction {
        records,
        resolved,
        unmatched,
        solution_found: true,
    }
}

fn record_key(record: &Record, dictionary: &AttributeDictionary) -> Option<TripleKey> {
    let text = |attribute| {
        record
            .non_empty(dictionary.resolve(attribute))
            .and_then(|v| v.as_text())
    };
    let step = record
        .non_empty(dictionary.resolve(Attribute::StepNumber))?
        .as_decimal()?
        .to_u32()?;
    Some(TripleKey::new(
        text(Attribute::ProductId)?,
        step,
        text(Attribute::MachineId)?,
    ))
}

#[cfg(test)]
mod tests {
    use prodalloc_config::{OptimizationMode, OptimizerConfig};
    use prodalloc_core::{FieldValue, Precision};
    use prodalloc_test::{load, row, scenarios};
    use rust_decimal::Decimal;

    use super::*;

    fn built(records: &[Record], precision: Precision) -> AllocationModel {
        let domain = load(records, precision);
        let config = OptimizerConfig::default().with_optimization_mode(OptimizationMode::Min);
        AllocationModel::build(&domain, &config).unwrap()
    }

    #[test]
    fn test_writes_resolved_values_and_keeps_other_fields() {
        let mut records = scenarios::two_steps_two_machines();
        records[0].set("comment", "keep me");
        let model = built(&records, Precision::ZERO);
        let solution = Solution::new(vec![60, 40, 100, 0, 160, 40, 440], Some(440));

        let out = extract(&records, &model, Some(&solution), &AttributeDictionary::new());
        assert!(out.solution_found);
        assert_eq!(out.resolved, 4);
        assert_eq!(out.unmatched, 0);
        assert_eq!(
            out.records[0].get("resolvedValue"),
            Some(&FieldValue::Decimal(Decimal::from(60)))
        );
        assert_eq!(
            out.records[3].get("resolvedValue"),
            Some(&FieldValue::Decimal(Decimal::ZERO))
        );
        assert_eq!(out.records[0].get("comment"), Some(&FieldValue::from("keep me")));
        assert_eq!(out.records[0].get("unitCost"), records[0].get("unitCost"));
    }

    #[test]
    fn test_unmatched_records_pass_through() {
        let records = scenarios::two_steps_two_machines();
        let model = built(&records, Precision::ZERO);
        let solution = Solution::new(vec![60, 40, 100, 0, 160, 40, 440], Some(440));

        let mut input = records.clone();
        input.push(row("P9", 1, "M1").build());
        input.push(Record::new().with("note", "summary row"));

        let out = extract(&input, &model, Some(&solution), &AttributeDictionary::new());
        assert_eq!(out.resolved, 4);
        assert_eq!(out.unmatched, 2);
        assert_eq!(out.records[4], input[4]);
        assert_eq!(out.records[5], input[5]);
    }

    #[test]
    fn test_no_solution_is_a_no_op() {
        let records = scenarios::two_steps_two_machines();
        let model = built(&records, Precision::ZERO);
        let out = extract(&records, &model, None, &AttributeDictionary::new());
        assert!(!out.solution_found);
        assert_eq!(out.records, records);
        assert_eq!(out.resolved, 0);
    }

    #[test]
    fn test_values_are_unscaled_into_mapped_field() {
        let records = vec![row("P1", 1, "M1").plan(10).build()];
        let model = built(&records, Precision::new(2).unwrap());
        let dictionary = AttributeDictionary::new().with_mapping(Attribute::ResolvedValue, "Ergebnis");
        // alloc 12.5 scaled by 100; util and cost are not read back
        let solution = Solution::new(vec![1250, 125_000, 125_000], Some(125_000));

        let out = extract(&records, &model, Some(&solution), &dictionary);
        assert_eq!(
            out.records[0].get("Ergebnis"),
            Some(&FieldValue::Decimal(Decimal::new(125, 1)))
        );
        assert!(out.records[0].get("resolvedValue").is_none());
    }
}
