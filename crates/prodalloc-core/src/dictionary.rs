//! Attribute dictionary: canonical attribute to source field name.
//!
//! Every source system names its columns differently. The loader and the
//! extractor never use field names directly; they resolve an [`Attribute`]
//! through an [`AttributeDictionary`] built once per run from a
//! `"KEY=value,KEY=value"` string. Attributes absent from that string keep
//! their default field name.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::DictionaryError;

/// Canonical attributes understood by the loader and extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    ProductId,
    ProductName,
    Price,
    ProductionLow,
    ProductionUpper,
    ProductionValue,
    StepId,
    StepNumber,
    Predecessors,
    MachineId,
    MachineName,
    MachineLow,
    MachineUpper,
    ResourceTotal,
    ResourceUnitCost,
    MeasureUnit,
    UnitValue,
    UnitCost,
    CurrentValue,
    Fixed,
    LowValue,
    HighValue,
    ResolvedValue,
}

impl Attribute {
    pub const ALL: [Attribute; 23] = [
        Attribute::ProductId,
        Attribute::ProductName,
        Attribute::Price,
        Attribute::ProductionLow,
        Attribute::ProductionUpper,
        Attribute::ProductionValue,
        Attribute::StepId,
        Attribute::StepNumber,
        Attribute::Predecessors,
        Attribute::MachineId,
        Attribute::MachineName,
        Attribute::MachineLow,
        Attribute::MachineUpper,
        Attribute::ResourceTotal,
        Attribute::ResourceUnitCost,
        Attribute::MeasureUnit,
        Attribute::UnitValue,
        Attribute::UnitCost,
        Attribute::CurrentValue,
        Attribute::Fixed,
        Attribute::LowValue,
        Attribute::HighValue,
        Attribute::ResolvedValue,
    ];

    /// The canonical key used in attribute map strings.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Attribute::ProductId => "PRODUCT_ID",
            Attribute::ProductName => "PRODUCT_NAME",
            Attribute::Price => "PRICE",
            Attribute::ProductionLow => "PRODUCTION_LOW",
            Attribute::ProductionUpper => "PRODUCTION_UPPER",
            Attribute::ProductionValue => "PRODUCTION_VALUE",
            Attribute::StepId => "STEP_ID",
            Attribute::StepNumber => "STEP_NUMBER",
            Attribute::Predecessors => "PREDECESSORS",
            Attribute::MachineId => "MACHINE_ID",
            Attribute::MachineName => "MACHINE_NAME",
            Attribute::MachineLow => "MACHINE_LOW",
            Attribute::MachineUpper => "MACHINE_UPPER",
            Attribute::ResourceTotal => "RESOURCE_TOTAL",
            Attribute::ResourceUnitCost => "RESOURCE_UNIT_COST",
            Attribute::MeasureUnit => "MEASURE_UNIT",
            Attribute::UnitValue => "UNIT_VALUE",
            Attribute::UnitCost => "UNIT_COST",
            Attribute::CurrentValue => "CURRENT_VALUE",
            Attribute::Fixed => "FIXED",
            Attribute::LowValue => "LOW_VALUE",
            Attribute::HighValue => "HIGH_VALUE",
            Attribute::ResolvedValue => "RESOLVED_VALUE",
        }
    }

    /// The field name used when the attribute map does not override it.
    pub fn default_field(self) -> &'static str {
        match self {
            Attribute::ProductId => "productId",
            Attribute::ProductName => "productName",
            Attribute::Price => "price",
            Attribute::ProductionLow => "productionLow",
            Attribute::ProductionUpper => "productionUpper",
            Attribute::ProductionValue => "productionValue",
            Attribute::StepId => "stepId",
            Attribute::StepNumber => "stepNumber",
            Attribute::Predecessors => "predecessors",
            Attribute::MachineId => "machineId",
            Attribute::MachineName => "machineName",
            Attribute::MachineLow => "machineLow",
            Attribute::MachineUpper => "machineUpper",
            Attribute::ResourceTotal => "resourceTotal",
            Attribute::ResourceUnitCost => "resourceUnitCost",
            Attribute::MeasureUnit => "measureUnit",
            Attribute::UnitValue => "unitValue",
            Attribute::UnitCost => "unitCost",
            Attribute::CurrentValue => "currentValue",
            Attribute::Fixed => "fixed",
            Attribute::LowValue => "lowValue",
            Attribute::HighValue => "highValue",
            Attribute::ResolvedValue => "resolvedValue",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for Attribute {
    type Err = DictionaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Attribute::ALL
            .into_iter()
            .find(|a| a.canonical_name().eq_ignore_ascii_case(key))
            .ok_or_else(|| DictionaryError::UnknownAttribute(key.to_string()))
    }
}

/// Maps canonical attributes to source field names.
///
/// # Examples
///
/// ```
/// use prodalloc_core::{Attribute, AttributeDictionary};
///
/// let dict = AttributeDictionary::parse("PRODUCT_ID=article, MACHINE_ID=line").unwrap();
/// assert_eq!(dict.resolve(Attribute::ProductId), "article");
/// assert_eq!(dict.resolve(Attribute::MachineId), "line");
/// // Not in the map: falls back to the default field name
/// assert_eq!(dict.resolve(Attribute::UnitCost), "unitCost");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeDictionary {
    overrides: HashMap<Attribute, String>,
}

impl AttributeDictionary {
    /// Creates a dictionary using only default field names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `"KEY=value,KEY=value"` attribute map.
    ///
    /// Blank entries are skipped. Keys that are not canonical attributes are
    /// logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError::MalformedEntry`] for entries without `=` or
    /// with an empty key or value.
    pub fn parse(input: &str) -> Result<Self, DictionaryError> {
        let mut dictionary = Self::new();
        for entry in input.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = entry
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .ok_or_else(|| DictionaryError::MalformedEntry(entry.to_string()))?;

            match key.parse::<Attribute>() {
                Ok(attribute) => {
                    dictionary.overrides.insert(attribute, value.to_string());
                }
                Err(_) => warn!(event = "unknown_attribute", key = key, "ignoring attribute map entry"),
            }
        }
        Ok(dictionary)
    }

    /// Overrides the field name for one attribute.
    pub fn with_mapping(mut self, attribute: Attribute, field: impl Into<String>) -> Self {
        self.overrides.insert(attribute, field.into());
        self
    }

    /// Returns the source field name for an attribute.
    pub fn resolve(&self, attribute: Attribute) -> &str {
        self.overrides
            .get(&attribute)
            .map(String::as_str)
            .unwrap_or_else(|| attribute.default_field())
    }

    /// Returns the source field name for a canonical key string.
    pub fn resolve_key(&self, canonical_key: &str) -> Result<&str, DictionaryError> {
        Ok(self.resolve(canonical_key.parse()?))
    }

    /// Number of attributes with a non-default field name.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let dict = AttributeDictionary::new();
        for attribute in Attribute::ALL {
            assert_eq!(dict.resolve(attribute), attribute.default_field());
        }
    }

    #[test]
    fn test_parse_overrides_and_falls_back() {
        let dict = AttributeDictionary::parse("UNIT_VALUE=Ressource, fixed=Gesperrt,,").unwrap();
        assert_eq!(dict.override_count(), 2);
        assert_eq!(dict.resolve(Attribute::UnitValue), "Ressource");
        assert_eq!(dict.resolve(Attribute::Fixed), "Gesperrt");
        assert_eq!(dict.resolve(Attribute::UnitCost), "unitCost");
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let dict = AttributeDictionary::parse("NOT_A_KEY=x,PRICE=preis").unwrap();
        assert_eq!(dict.override_count(), 1);
        assert_eq!(dict.resolve(Attribute::Price), "preis");
    }

    #[test]
    fn test_parse_rejects_malformed_entries() {
        assert_eq!(
            AttributeDictionary::parse("PRICE"),
            Err(DictionaryError::MalformedEntry("PRICE".into()))
        );
        assert!(AttributeDictionary::parse("PRICE=").is_err());
        assert!(AttributeDictionary::parse("=price").is_err());
    }

    #[test]
    fn test_resolve_key() {
        let dict = AttributeDictionary::new().with_mapping(Attribute::MachineId, "anlage");
        assert_eq!(dict.resolve_key("machine_id").unwrap(), "anlage");
        assert_eq!(
            dict.resolve_key("BOGUS"),
            Err(DictionaryError::UnknownAttribute("BOGUS".into()))
        );
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for attribute in Attribute::ALL {
            assert_eq!(attribute.canonical_name().parse::<Attribute>(), Ok(attribute));
        }
    }
}
