//! Cell values of an observation record
//!
//! A [`Value`] is whatever one field of a record holds: nothing (null), a
//! boolean, a number, a calendar date or free text. Values are hashable so
//! they can be counted distinctly; floats hash and compare by bit pattern.
//!
//! # Parsing Text Cells
//!
//! [`Value::parse`] turns a raw text cell (from a CSV file, for example) into
//! the most specific value it represents:
//!
//! | Cell | Value |
//! |---|---|
//! | empty, `NA`, `NaN`, `null`, `None`, ... | [`Value::Null`] |
//! | `true` / `False` (any case) | [`Value::Bool`] |
//! | `42` | [`Value::Int`] |
//! | `0.15` | [`Value::Float`] |
//! | `2017-07-01`, `7-1-17`, `07/01/2017` | [`Value::Date`] |
//! | anything else | [`Value::Text`] |
//!
//! ```
//! use crosstab_analysis::value::Value;
//!
//! assert_eq!(Value::parse(""), Value::Null);
//! assert_eq!(Value::parse("True"), Value::Bool(true));
//! assert_eq!(Value::parse("413"), Value::Int(413));
//! assert_eq!(Value::parse("Species of Concern"), Value::from("Species of Concern"));
//! assert!(matches!(Value::parse("7-1-17"), Value::Date(_)));
//! ```

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cell texts read as a missing value.
const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Date layouts accepted by [`Value::parse`], tried in order.
// Two-digit years first: "%Y" would happily read "7-1-17" as year 7.
const DATE_FORMATS: &[&str] = &["%m-%d-%y", "%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// A single field value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    /// Parses a raw text cell into the most specific value.
    #[must_use]
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if NULL_MARKERS.contains(&cell) {
            return Value::Null;
        }
        if cell.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if cell.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        if let Ok(n) = cell.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(x) = cell.parse::<f64>() {
            return Value::Float(x);
        }
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(cell, format).ok())
            .map_or_else(|| Value::Text(cell.to_owned()), Value::Date)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a float if it is numeric.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(x) => x.to_bits().hash(state),
            Value::Date(d) => d.hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => fmt::Display::fmt(b, f),
            Value::Int(n) => fmt::Display::fmt(n, f),
            Value::Float(x) => fmt::Display::fmt(x, f),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_parse_null_markers() {
        for cell in ["", "  ", "NA", "NaN", "null", "None"] {
            assert_eq!(Value::parse(cell), Value::Null, "{cell:?}");
        }
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(Value::parse("-7"), Value::Int(-7));
        assert_eq!(Value::parse("0.15"), Value::Float(0.15));
        assert_eq!(Value::parse(" 250 "), Value::Int(250));
    }

    #[test]
    fn test_parse_dates() {
        let july_first = NaiveDate::from_ymd_opt(2017, 7, 1).unwrap();
        assert_eq!(Value::parse("2017-07-01"), Value::Date(july_first));
        assert_eq!(Value::parse("7-1-17"), Value::Date(july_first));
        assert_eq!(Value::parse("07/01/2017"), Value::Date(july_first));
    }

    #[test]
    fn test_parse_text_keeps_content() {
        assert_eq!(
            Value::parse("Bighorn Sheep, Sierra Nevada Bighorn Sheep"),
            Value::from("Bighorn Sheep, Sierra Nevada Bighorn Sheep")
        );
        assert_eq!(Value::parse("Mammal").as_str(), Some("Mammal"));
    }

    #[test]
    fn test_distinct_values_hash_consistently() {
        let values = [
            Value::from("Ovis canadensis"),
            Value::from("Ovis canadensis"),
            Value::Float(1.5),
            Value::Float(1.5),
            Value::Int(1),
            Value::Null,
            Value::Null,
        ];
        let distinct = values.iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), 4);
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("A")), Value::from("A"));
    }

    #[test]
    fn test_deserialize_mixed_json() {
        let json = r#"[null, true, 3, 0.5, "2017-07-03", "Endangered"]"#;
        let values: Vec<Value> = serde_json::from_str(json).unwrap();
        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Bool(true));
        assert_eq!(values[2], Value::Int(3));
        assert_eq!(values[3], Value::Float(0.5));
        assert!(matches!(values[4], Value::Date(_)));
        assert_eq!(values[5], Value::from("Endangered"));
    }
}
