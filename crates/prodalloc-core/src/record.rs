//! Flat input/output records.
//!
//! A [`Record`] is one row handed over by an external loader (spreadsheet row,
//! database row, parsed document entry). Field names are source specific and
//! are looked up through the [`AttributeDictionary`](crate::AttributeDictionary).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    #[default]
    Empty,
    Bool(bool),
    Integer(i64),
    Decimal(Decimal),
    Text(String),
}

impl FieldValue {
    /// Whether the value is absent or blank text.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the value as text, or `None` if empty.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Empty => None,
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Decimal(d) => Some(d.normalize().to_string()),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }

    /// Returns the value as a decimal number, parsing text cells.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Integer(i) => Some(Decimal::from(*i)),
            FieldValue::Decimal(d) => Some(*d),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .ok()
            }
            FieldValue::Empty | FieldValue::Bool(_) => None,
        }
    }

    /// Returns the value as a boolean flag.
    ///
    /// Text accepts `true/false`, `yes/no`, `y/n`, `1/0` and `fixed/free`
    /// in any case.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Integer(0) => Some(false),
            FieldValue::Integer(1) => Some(true),
            FieldValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "fixed" => Some(true),
                "false" | "no" | "n" | "0" | "free" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Decimal(d) => write!(f, "{}", d.normalize()),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One flat row: field name to value.
///
/// # Examples
///
/// ```
/// use prodalloc_core::{FieldValue, Record};
///
/// let record = Record::new()
///     .with("productId", "P1")
///     .with("unitValue", 2_i64);
/// assert_eq!(record.get("productId"), Some(&FieldValue::from("P1")));
/// assert!(record.get("missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets a field, returning the previous value.
    pub fn set(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Returns the field if it is present and not blank.
    pub fn non_empty(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_parses_as_decimal() {
        assert_eq!(
            FieldValue::from(" 12.5 ").as_decimal(),
            Some(Decimal::new(125, 1))
        );
        assert_eq!(
            FieldValue::from("1e2").as_decimal(),
            Some(Decimal::from(100))
        );
        assert_eq!(FieldValue::from("abc").as_decimal(), None);
        assert_eq!(FieldValue::Empty.as_decimal(), None);
    }

    #[test]
    fn test_flags() {
        assert_eq!(FieldValue::from("FIXED").as_flag(), Some(true));
        assert_eq!(FieldValue::from("Free").as_flag(), Some(false));
        assert_eq!(FieldValue::Integer(1).as_flag(), Some(true));
        assert_eq!(FieldValue::from("maybe").as_flag(), None);
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(FieldValue::from("   ").is_empty());
        assert_eq!(FieldValue::from("  ").as_text(), None);
        assert_eq!(FieldValue::from(" P1 ").as_text().as_deref(), Some("P1"));
    }

    #[test]
    fn test_record_set_and_non_empty() {
        let mut record = Record::new().with("a", "").with("b", 3_i64);
        assert!(record.non_empty("a").is_none());
        assert_eq!(record.non_empty("b"), Some(&FieldValue::Integer(3)));

        let previous = record.set("b", 4_i64);
        assert_eq!(previous, Some(FieldValue::Integer(3)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_record_from_iter() {
        let record: Record = vec![("x", FieldValue::from(1_i64)), ("y", FieldValue::Empty)]
            .into_iter()
            .collect();
        assert!(record.contains("x"));
        assert!(record.contains("y"));
        assert_eq!(record.iter().count(), 2);
    }
}
