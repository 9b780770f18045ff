use super::*;
use crate::record::FieldValue;

fn row(product: &str, step: i64, machine: &str) -> Record {
    Record::new()
        .with("productId", product)
        .with("stepNumber", step)
        .with("machineId", machine)
        .with("unitValue", 2_i64)
        .with("unitCost", 3_i64)
        .with("productionValue", 100_i64)
        .with("machineUpper", 500_i64)
}

fn load_default(records: &[Record]) -> Result<DomainModel> {
    load(records, &AttributeDictionary::new(), Precision::ZERO)
}

#[test]
fn test_empty_input_is_rejected() {
    assert!(matches!(load_default(&[]), Err(LoadError::NoRecords)));
}

#[test]
fn test_loads_minimal_rows_with_defaults() {
    let records = vec![row("P1", 1, "M1"), row("P1", 1, "M2"), row("P2", 1, "M1")];
    let model = load_default(&records).unwrap();

    assert_eq!(model.products.len(), 2);
    assert_eq!(model.machines.len(), 2);
    assert_eq!(model.beans.len(), 3);
    assert_eq!(model.steps.len(), 3);

    let p1 = &model.products["P1"];
    assert_eq!(p1.name, "P1");
    assert_eq!(p1.price, Decimal::ZERO);
    assert_eq!(p1.production_low, 0);
    assert_eq!(p1.production_upper, DEFAULT_PRODUCTION_UPPER);
    assert_eq!(p1.production_value, 100);

    let m1 = &model.machines["M1"];
    assert_eq!(m1.upper_bound, 500);
    assert_eq!(m1.resource_total, 500);
    assert_eq!(m1.low_bound, 0);

    let bean = &model.beans[1];
    assert_eq!(bean.key, TripleKey::new("P1", 1, "M2"));
    assert_eq!(bean.row, 1);
    assert_eq!(bean.unit_value, 2);
    assert_eq!(bean.unit_cost, 3);
    assert!(!bean.fixed);
    assert_eq!(model.steps[1].id, "P1/1/M2");
}

#[test]
fn test_missing_required_field_names_resolved_field() {
    let dict = AttributeDictionary::new().with_mapping(Attribute::MachineUpper, "Kapazitaet");
    let err = load(&[row("P1", 1, "M1")], &dict, Precision::ZERO).unwrap_err();
    match err {
        LoadError::MissingField {
            row,
            attribute,
            field,
        } => {
            assert_eq!(row, 0);
            assert_eq!(attribute, Attribute::MachineUpper);
            assert_eq!(field, "Kapazitaet");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_blank_text_counts_as_missing() {
    let record = row("P1", 1, "M1").with("productionValue", "  ");
    let err = load_default(&[record]).unwrap_err();
    assert!(matches!(
        err,
        LoadError::MissingField {
            attribute: Attribute::ProductionValue,
            ..
        }
    ));
}

#[test]
fn test_invalid_number_is_reported() {
    let record = row("P1", 1, "M1").with("unitValue", "lots");
    let err = load_default(&[record]).unwrap_err();
    match err {
        LoadError::InvalidValue { field, value, .. } => {
            assert_eq!(field, "unitValue");
            assert_eq!(value, "lots");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_step_number_must_be_non_negative_integer() {
    let fractional = row("P1", 1, "M1").with("stepNumber", "1.5");
    assert!(matches!(
        load_default(&[fractional]),
        Err(LoadError::InvalidValue { .. })
    ));

    let negative = row("P1", 1, "M1").with("stepNumber", -1_i64);
    assert!(matches!(
        load_default(&[negative]),
        Err(LoadError::InvalidValue { .. })
    ));

    let text = row("P1", 1, "M1").with("stepNumber", " 3 ");
    let model = load_default(&[text]).unwrap();
    assert_eq!(model.beans[0].key.step_number, 3);
}

#[test]
fn test_negative_rate_is_rejected() {
    let record = row("P1", 1, "M1").with("unitCost", -1_i64);
    assert!(matches!(
        load_default(&[record]),
        Err(LoadError::NegativeRate { .. })
    ));
}

#[test]
fn test_duplicate_key_is_rejected() {
    let records = vec![row("P1", 1, "M1"), row("P2", 1, "M1"), row("P1", 1, "M1")];
    match load_default(&records).unwrap_err() {
        LoadError::DuplicateKey {
            row,
            first_row,
            key,
        } => {
            assert_eq!(row, 2);
            assert_eq!(first_row, 0);
            assert_eq!(key, TripleKey::new("P1", 1, "M1"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_conflicting_product_attributes() {
    let records = vec![
        row("P1", 1, "M1"),
        row("P1", 2, "M1").with("productionValue", 90_i64),
    ];
    match load_default(&records).unwrap_err() {
        LoadError::Inconsistent {
            row, entity, field, ..
        } => {
            assert_eq!(row, 1);
            assert_eq!(entity, "product");
            assert_eq!(field, "productionValue");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_conflicting_machine_attributes() {
    let records = vec![
        row("P1", 1, "M1"),
        row("P2", 1, "M1").with("machineUpper", 400_i64),
    ];
    assert!(matches!(
        load_default(&records),
        Err(LoadError::Inconsistent {
            entity: "machine",
            ..
        })
    ));
}

#[test]
fn test_inverted_bounds() {
    let product = row("P1", 1, "M1")
        .with("productionLow", 10_i64)
        .with("productionUpper", 5_i64);
    assert!(matches!(
        load_default(&[product]),
        Err(LoadError::InvertedBounds {
            entity: "product",
            ..
        })
    ));

    let machine = row("P1", 1, "M1").with("machineLow", 600_i64);
    assert!(matches!(
        load_default(&[machine]),
        Err(LoadError::InvertedBounds {
            entity: "machine",
            ..
        })
    ));

    let allocation = row("P1", 1, "M1")
        .with("lowValue", 9_i64)
        .with("highValue", 3_i64);
    assert!(matches!(
        load_default(&[allocation]),
        Err(LoadError::InvertedBounds {
            entity: "allocation",
            ..
        })
    ));
}

#[test]
fn test_fixed_row_requires_current_value() {
    let record = row("P1", 1, "M1").with("fixed", true);
    assert!(matches!(
        load_default(&[record]),
        Err(LoadError::MissingCurrentValue { row: 0, .. })
    ));
}

#[test]
fn test_fixed_row_must_respect_bounds() {
    let over_upper = row("P1", 1, "M1")
        .with("productionUpper", 50_i64)
        .with("fixed", "yes")
        .with("currentValue", 60_i64);
    assert!(matches!(
        load_default(&[over_upper]),
        Err(LoadError::FixedOutOfRange { .. })
    ));

    let below_override = row("P1", 1, "M1")
        .with("fixed", true)
        .with("lowValue", 10_i64)
        .with("currentValue", 5_i64);
    assert!(matches!(
        load_default(&[below_override]),
        Err(LoadError::FixedOutOfRange { .. })
    ));

    let negative = row("P1", 1, "M1")
        .with("fixed", true)
        .with("currentValue", -1_i64);
    assert!(matches!(
        load_default(&[negative]),
        Err(LoadError::FixedOutOfRange { .. })
    ));
}

#[test]
fn test_fixed_row_builds_fixed_step() {
    let record = row("P1", 1, "M1")
        .with("fixed", "FIXED")
        .with("currentValue", 40_i64)
        .with("predecessors", "S0; S1 ;;");
    let model = load_default(&[record]).unwrap();

    let step = &model.steps[0];
    assert!(step.is_fixed());
    assert_eq!(step.fixed_production, Some(40));
    assert_eq!(
        step.predecessor_step_ids.iter().cloned().collect::<Vec<_>>(),
        vec!["S0".to_string(), "S1".to_string()]
    );
    assert_eq!(model.fixed_count(), 1);
    assert_eq!(model.beans[0].current_value, 40);
}

#[test]
fn test_free_row_keeps_current_value() {
    let record = row("P1", 1, "M1").with("currentValue", 12_i64);
    let model = load_default(&[record]).unwrap();
    assert!(!model.beans[0].fixed);
    assert_eq!(model.beans[0].current_value, 12);
    assert_eq!(model.steps[0].fixed_production, None);
}

#[test]
fn test_invalid_flag_is_reported() {
    let record = row("P1", 1, "M1").with("fixed", "sometimes");
    assert!(matches!(
        load_default(&[record]),
        Err(LoadError::InvalidValue { .. })
    ));
}

#[test]
fn test_precision_scales_quantities_and_capacities() {
    let record = row("P1", 1, "M1")
        .with("unitValue", "1.5")
        .with("unitCost", "0.25")
        .with("productionValue", "12.5")
        .with("machineUpper", "7.5")
        .with("lowValue", FieldValue::Decimal(Decimal::new(5, 1)));
    let precision = Precision::new(2).unwrap();
    let model = load(&[record], &AttributeDictionary::new(), precision).unwrap();

    let bean = &model.beans[0];
    assert_eq!(bean.unit_value, 150);
    assert_eq!(bean.unit_cost, 25);
    assert_eq!(bean.low_value, Some(50));
    assert_eq!(model.products["P1"].production_value, 1250);
    assert_eq!(model.products["P1"].production_upper, DEFAULT_PRODUCTION_UPPER * 100);
    assert_eq!(model.machines["M1"].upper_bound, 75_000);
}

#[test]
fn test_excess_decimal_places_fail() {
    let record = row("P1", 1, "M1").with("unitValue", "1.25");
    let precision = Precision::new(1).unwrap();
    match load(&[record], &AttributeDictionary::new(), precision).unwrap_err() {
        LoadError::Scale { field, source, .. } => {
            assert_eq!(field, "unitValue");
            assert!(matches!(source, ScaleError::NotIntegral { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_attribute_map_renames_fields() {
    let dict = AttributeDictionary::parse(
        "PRODUCT_ID=Artikel,STEP_NUMBER=Schritt,MACHINE_ID=Anlage,UNIT_VALUE=Bedarf",
    )
    .unwrap();
    let record = Record::new()
        .with("Artikel", "A-1")
        .with("Schritt", 1_i64)
        .with("Anlage", "L-7")
        .with("Bedarf", 4_i64)
        .with("productionValue", 20_i64)
        .with("machineUpper", 80_i64);
    let model = load(&[record], &dict, Precision::ZERO).unwrap();
    assert_eq!(model.beans[0].key, TripleKey::new("A-1", 1, "L-7"));
    assert_eq!(model.beans[0].unit_value, 4);
}

#[test]
fn test_default_production_upper_option() {
    let options = LoadOptions::new(Precision::ZERO).with_default_production_upper(250);
    let model = load_with(&[row("P1", 1, "M1")], &AttributeDictionary::new(), &options).unwrap();
    assert_eq!(model.products["P1"].production_upper, 250);
}

#[test]
fn test_fixed_row_respects_default_value_bounds() {
    let options = LoadOptions::new(Precision::ZERO).with_value_bounds(10, 150);
    let dictionary = AttributeDictionary::new();

    let below = row("P1", 1, "M1")
        .with("fixed", true)
        .with("currentValue", 5_i64);
    let err = load_with(&[below], &dictionary, &options).unwrap_err();
    assert!(matches!(err, LoadError::FixedOutOfRange { row: 0, .. }));
    assert_eq!(
        err.to_string(),
        "row 0: fixed allocation P1/1/M1 has value 5 outside [10, 150]"
    );

    let own_bounds = row("P1", 1, "M1")
        .with("fixed", true)
        .with("lowValue", 0_i64)
        .with("currentValue", 5_i64);
    let model = load_with(&[own_bounds], &dictionary, &options).unwrap();
    assert_eq!(model.beans[0].current_value, 5);
}

#[test]
fn test_negative_machine_low_is_rejected() {
    let record = row("P1", 1, "M1").with("machineLow", -10_i64);
    assert!(matches!(
        load_default(&[record]),
        Err(LoadError::NegativeBound { row: 0, .. })
    ));
}
