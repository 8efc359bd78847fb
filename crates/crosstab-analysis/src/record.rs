//! Observation records and observation sets
//!
//! A [`Record`] maps field names to [`Value`]s. A field can be present with a
//! null value, which is an ordinary category for grouping purposes, or absent
//! altogether, which is a [`MissingFieldError`].
//!
//! An [`ObservationSet`] is the ordered list of records an analysis runs on.
//! It deserializes from a JSON array of flat objects.
//!
//! # Examples
//!
//! ```
//! use crosstab_analysis::{record::{ObservationSet, Record}, value::Value};
//!
//! let observations = ObservationSet::from(vec![
//!     Record::new()
//!         .with("category", "Mammal")
//!         .with("conservation_status", Value::Null),
//!     Record::new()
//!         .with("category", "Bird")
//!         .with("conservation_status", "Endangered"),
//! ]);
//!
//! let birds = observations.filter(|r| r.get("category") == Some(&Value::from("Bird")));
//! assert_eq!(birds.len(), 1);
//! assert!(observations.records()[0].require("conservation_status").unwrap().is_null());
//! assert!(observations.records()[0].require("park_name").is_err());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{error::MissingFieldError, value::Value};

/// One observation: a mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Record::insert`].
    #[must_use]
    pub fn with<K, V>(mut self, field: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(field, value);
        self
    }

    /// Sets `field`, returning the previous value if there was one.
    pub fn insert<K, V>(&mut self, field: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(field.into(), value.into())
    }

    /// Returns the value of `field`, or `None` if the field is absent.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the value of `field`, failing if the field is absent.
    pub fn require(&self, field: &str) -> Result<&Value, MissingFieldError> {
        self.fields.get(field).ok_or_else(|| MissingFieldError {
            field: field.to_owned(),
        })
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An ordered sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationSet {
    records: Vec<Record>,
}

impl ObservationSet {
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Returns the records matching `predicate`, in their original order.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&Record) -> bool,
    {
        Self {
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .cloned()
                .collect(),
        }
    }
}

impl From<Vec<Record>> for ObservationSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for ObservationSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl AsRef<[Record]> for ObservationSet {
    fn as_ref(&self) -> &[Record] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_null_are_different() {
        let record = Record::new().with("fitness_test_date", Value::Null);
        assert!(record.contains("fitness_test_date"));
        assert!(record.require("fitness_test_date").unwrap().is_null());
        assert_eq!(
            record.require("application_date"),
            Err(MissingFieldError {
                field: "application_date".to_owned()
            })
        );
        assert_eq!(record.get("application_date"), None);
    }

    #[test]
    fn test_insert_replaces() {
        let mut record = Record::new().with("group", "A");
        let previous = record.insert("group", "B");
        assert_eq!(previous, Some(Value::from("A")));
        assert_eq!(record.get("group"), Some(&Value::from("B")));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_filter_preserves_order() {
        let set = (0..6_i64)
            .map(|i| Record::new().with("id", i).with("applied", i % 2 == 0))
            .collect::<ObservationSet>();
        let applicants = set.filter(|r| r.get("applied") == Some(&Value::Bool(true)));
        let ids = applicants
            .iter()
            .map(|r| r.get("id").cloned())
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![Some(Value::Int(0)), Some(Value::Int(2)), Some(Value::Int(4))]
        );
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn test_deserialize_from_json_objects() {
        let json = r#"[
            {"first_name": "Kim", "fitness_test_date": "2017-07-03", "application_date": null},
            {"first_name": "Tom", "fitness_test_date": null}
        ]"#;
        let set: ObservationSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.records()[0].get("application_date").unwrap().is_null());
        assert!(!set.records()[1].contains("application_date"));
        assert!(matches!(
            set.records()[0].get("fitness_test_date"),
            Some(Value::Date(_))
        ));
    }
}
