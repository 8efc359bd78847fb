//! Grouping keys: rules that assign a record to a category
//!
//! A [`GroupingKey`] maps a [`Record`] to a category label. Three kinds cover
//! the groupings used when cross-tabulating survey-style data:
//!
//! - [`FieldKey`]: the field's own value, with null rendered as an explicit
//!   label (`conservation_status`, null as `"No Intervention"`)
//! - [`PresenceKey`]: whether the field holds a value (`ab_test_group` is `"A"`
//!   when a fitness test date exists, `"B"` otherwise)
//! - [`PredicateKey`]: an arbitrary test of the field's value
//!   (`is_sheep` when the common name mentions "Sheep")
//!
//! Every key fails with [`MissingFieldError`] when the record does not have
//! the field at all; frequency tables count those records as excluded.
//!
//! # Examples
//!
//! ```
//! use crosstab_analysis::{
//!     grouping::{FieldKey, GroupingKey, PredicateKey, PresenceKey},
//!     record::Record,
//!     value::Value,
//! };
//!
//! let record = Record::new()
//!     .with("conservation_status", Value::Null)
//!     .with("common_names", "Bighorn Sheep");
//!
//! let status = FieldKey::new("conservation_status").null_label("No Intervention");
//! assert_eq!(status.category(&record).unwrap(), "No Intervention");
//!
//! let protected = PresenceKey::new("is_protected", "conservation_status");
//! assert_eq!(protected.category(&record).unwrap(), "false");
//!
//! let sheep = PredicateKey::new("is_sheep", "common_names", |v: &Value| {
//!     v.as_str().is_some_and(|s| s.contains("Sheep"))
//! });
//! assert_eq!(sheep.category(&record).unwrap(), "true");
//! ```

use crate::{error::MissingFieldError, record::Record, value::Value};

/// Label given to null values by a [`FieldKey`] unless configured otherwise.
pub const DEFAULT_NULL_LABEL: &str = "null";

/// A category label.
pub type Category = String;

/// Assigns records to categories.
pub trait GroupingKey {
    /// Name of the categorical variable (used as table axis name).
    fn name(&self) -> &str;

    /// Returns the category of `record`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingFieldError`] if the record lacks the field the key reads.
    fn category(&self, record: &Record) -> Result<Category, MissingFieldError>;
}

impl<K> GroupingKey for &K
where
    K: GroupingKey + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn category(&self, record: &Record) -> Result<Category, MissingFieldError> {
        (**self).category(record)
    }
}

impl<K> GroupingKey for Box<K>
where
    K: GroupingKey + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn category(&self, record: &Record) -> Result<Category, MissingFieldError> {
        (**self).category(record)
    }
}

/// Groups by the value of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    field: String,
    null_label: String,
}

impl FieldKey {
    #[must_use]
    pub fn new<S>(field: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            field: field.into(),
            null_label: DEFAULT_NULL_LABEL.to_owned(),
        }
    }

    /// Sets the category used for null values.
    #[must_use]
    pub fn null_label<S>(self, label: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            null_label: label.into(),
            ..self
        }
    }
}

impl GroupingKey for FieldKey {
    fn name(&self) -> &str {
        &self.field
    }

    fn category(&self, record: &Record) -> Result<Category, MissingFieldError> {
        let value = record.require(&self.field)?;
        Ok(match value {
            Value::Null => self.null_label.clone(),
            value => value.to_string(),
        })
    }
}

/// Groups by whether a field holds a non-null value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceKey {
    name: String,
    field: String,
    present: String,
    absent: String,
}

impl PresenceKey {
    /// Creates a key labelled `"true"` / `"false"`.
    #[must_use]
    pub fn new<N, F>(name: N, field: F) -> Self
    where
        N: Into<String>,
        F: Into<String>,
    {
        Self {
            name: name.into(),
            field: field.into(),
            present: true.to_string(),
            absent: false.to_string(),
        }
    }

    /// Replaces the labels for present and absent values.
    #[must_use]
    pub fn labels<P, A>(self, present: P, absent: A) -> Self
    where
        P: Into<String>,
        A: Into<String>,
    {
        Self {
            present: present.into(),
            absent: absent.into(),
            ..self
        }
    }
}

impl GroupingKey for PresenceKey {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self, record: &Record) -> Result<Category, MissingFieldError> {
        let value = record.require(&self.field)?;
        Ok(if value.is_null() {
            self.absent.clone()
        } else {
            self.present.clone()
        })
    }
}

/// Groups by an arbitrary predicate over a field's value.
pub struct PredicateKey<F> {
    name: String,
    field: String,
    predicate: F,
    when_true: String,
    when_false: String,
}

impl<F> PredicateKey<F>
where
    F: Fn(&Value) -> bool,
{
    /// Creates a key labelled `"true"` / `"false"`.
    #[must_use]
    pub fn new<N, S>(name: N, field: S, predicate: F) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            field: field.into(),
            predicate,
            when_true: true.to_string(),
            when_false: false.to_string(),
        }
    }

    #[must_use]
    pub fn labels<T, U>(self, when_true: T, when_false: U) -> Self
    where
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            when_true: when_true.into(),
            when_false: when_false.into(),
            ..self
        }
    }
}

impl<F> GroupingKey for PredicateKey<F>
where
    F: Fn(&Value) -> bool,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self, record: &Record) -> Result<Category, MissingFieldError> {
        let value = record.require(&self.field)?;
        Ok(if (self.predicate)(value) {
            self.when_true.clone()
        } else {
            self.when_false.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(fitness_test_date: Option<&str>) -> Record {
        Record::new()
            .with("first_name", "Karen")
            .with("fitness_test_date", fitness_test_date)
    }

    #[test]
    fn test_field_key_renders_values() {
        let key = FieldKey::new("first_name");
        assert_eq!(key.name(), "first_name");
        assert_eq!(key.category(&visitor(None)).unwrap(), "Karen");

        let record = Record::new().with("observations", 68_i64);
        assert_eq!(FieldKey::new("observations").category(&record).unwrap(), "68");
    }

    #[test]
    fn test_field_key_null_label() {
        let record = Record::new().with("conservation_status", Value::Null);
        assert_eq!(
            FieldKey::new("conservation_status").category(&record).unwrap(),
            DEFAULT_NULL_LABEL
        );
        assert_eq!(
            FieldKey::new("conservation_status")
                .null_label("No Intervention")
                .category(&record)
                .unwrap(),
            "No Intervention"
        );
    }

    #[test]
    fn test_presence_key_labels() {
        let key = PresenceKey::new("ab_test_group", "fitness_test_date").labels("A", "B");
        assert_eq!(key.name(), "ab_test_group");
        assert_eq!(key.category(&visitor(Some("2017-07-03"))).unwrap(), "A");
        assert_eq!(key.category(&visitor(None)).unwrap(), "B");
    }

    #[test]
    fn test_missing_field_is_error() {
        let record = Record::new().with("category", "Mammal");
        let err = PresenceKey::new("is_member", "purchase_date")
            .category(&record)
            .unwrap_err();
        assert_eq!(err.field, "purchase_date");
        assert!(FieldKey::new("park_name").category(&record).is_err());
    }

    #[test]
    fn test_predicate_key() {
        let key = PredicateKey::new("is_sheep", "common_names", |v: &Value| {
            v.as_str().is_some_and(|s| s.contains("Sheep"))
        })
        .labels("sheep", "other");
        let sheep = Record::new().with("common_names", "Bighorn Sheep, Bighorn Sheep");
        let goat = Record::new().with("common_names", "Mountain Goat");
        let unnamed = Record::new().with("common_names", Value::Null);
        assert_eq!(key.category(&sheep).unwrap(), "sheep");
        assert_eq!(key.category(&goat).unwrap(), "other");
        assert_eq!(key.category(&unnamed).unwrap(), "other");
    }

    #[test]
    fn test_boxed_keys_are_keys() {
        let keys: Vec<Box<dyn GroupingKey>> = vec![
            Box::new(FieldKey::new("first_name")),
            Box::new(PresenceKey::new("tested", "fitness_test_date")),
        ];
        let record = visitor(Some("2017-07-03"));
        let categories = keys
            .iter()
            .map(|key| key.category(&record).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(categories, vec!["Karen", "true"]);
    }
}
