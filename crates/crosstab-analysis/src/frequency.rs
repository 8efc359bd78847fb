//! Frequency tables: grouping and counting observations
//!
//! [`FrequencyTable::build`] partitions an observation set by the pair of
//! categories two [`GroupingKey`]s assign to each record and tallies each
//! group. [`FrequencyTable::pivot`] reshapes the result into a
//! [`ContingencyTable`] ready for testing, filling absent combinations with
//! zero.
//!
//! Categories keep the order in which they were first seen. Null values are an
//! ordinary category. A record lacking a field that a key or the [`Tally`]
//! reads is left out of every group and recorded in [`Exclusions`].
//!
//! [`CategoryCounts`] is the one-way counterpart: counts per category of a
//! single key.
//!
//! # Examples
//!
//! ```
//! use crosstab_analysis::{
//!     frequency::{build_frequency_table, pivot},
//!     grouping::{FieldKey, PresenceKey},
//!     record::{ObservationSet, Record},
//!     value::Value,
//! };
//!
//! let species = ObservationSet::from(vec![
//!     Record::new().with("category", "Mammal").with("conservation_status", Value::Null),
//!     Record::new().with("category", "Mammal").with("conservation_status", "Endangered"),
//!     Record::new().with("category", "Bird").with("conservation_status", Value::Null),
//! ]);
//!
//! let table = build_frequency_table(
//!     &species,
//!     FieldKey::new("category"),
//!     PresenceKey::new("is_protected", "conservation_status"),
//! );
//! assert_eq!(table.count("Mammal", "true"), 1);
//! assert_eq!(table.count("Bird", "true"), 0);
//!
//! let contingency = pivot(&table);
//! assert_eq!(contingency.row_labels(), ["Mammal", "Bird"]);
//! assert_eq!(contingency.column_labels(), ["false", "true"]);
//! assert_eq!(contingency.row(1), &[1, 0]);
//! ```

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    convert::Infallible,
};

use crosstab_stats::contingency::ContingencyTable;
use serde::{Deserialize, Serialize};

use crate::{
    error::{InvalidValueError, MissingFieldError},
    grouping::{Category, GroupingKey},
    record::{ObservationSet, Record},
    value::Value,
};

/// What is counted in each group.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Tally {
    /// Number of records.
    #[default]
    Records,
    /// Number of records whose `field` is not null.
    NonNull { field: String },
    /// Number of distinct non-null values of `field`.
    Distinct { field: String },
    /// Sum of the non-null values of `field`, which must be non-negative
    /// whole numbers.
    Sum { field: String },
}

/// What a single record contributes to its group.
enum Observed<'a> {
    Record,
    Null,
    Value(&'a Value),
    Amount(u64),
}

/// Why a record does not contribute to its group.
enum Rejected<E> {
    /// The record is excluded and counted in [`Exclusions`].
    Missing(MissingFieldError),
    /// Building the table fails.
    Invalid(E),
}

impl<E> From<MissingFieldError> for Rejected<E> {
    fn from(err: MissingFieldError) -> Self {
        Rejected::Missing(err)
    }
}

impl Tally {
    fn observe<'a>(
        &self,
        record: &'a Record,
    ) -> Result<Observed<'a>, Rejected<InvalidValueError>> {
        let field = match self {
            Tally::Records => return Ok(Observed::Record),
            Tally::NonNull { field } | Tally::Distinct { field } | Tally::Sum { field } => field,
        };
        match (self, record.require(field)?) {
            (_, Value::Null) => Ok(Observed::Null),
            (Tally::Sum { .. }, value) => {
                let amount = match value {
                    Value::Int(n) => u64::try_from(*n).ok(),
                    _ => None,
                };
                amount.map(Observed::Amount).ok_or_else(|| {
                    Rejected::Invalid(InvalidValueError {
                        field: field.clone(),
                        value: value.to_string(),
                    })
                })
            }
            (_, value) => Ok(Observed::Value(value)),
        }
    }

    fn counter(&self) -> Counter {
        match self {
            Tally::Records | Tally::NonNull { .. } | Tally::Sum { .. } => Counter::Plain(0),
            Tally::Distinct { .. } => Counter::Distinct(HashSet::new()),
        }
    }
}

#[derive(Debug)]
enum Counter {
    Plain(u64),
    Distinct(HashSet<Value>),
}

impl Counter {
    fn add(&mut self, observed: Observed<'_>) {
        match (self, observed) {
            (Counter::Plain(n), Observed::Record | Observed::Value(_)) => *n += 1,
            (Counter::Plain(n), Observed::Amount(amount)) => *n = n.saturating_add(amount),
            (Counter::Distinct(seen), Observed::Value(value)) => {
                if !seen.contains(value) {
                    seen.insert(value.clone());
                }
            }
            (_, _) => {}
        }
    }

    fn value(&self) -> u64 {
        match self {
            Counter::Plain(n) => *n,
            Counter::Distinct(seen) => seen.len() as u64,
        }
    }
}

/// Category labels in discovery order.
#[derive(Debug, Default)]
struct Categories {
    labels: Vec<Category>,
    index: HashMap<Category, usize>,
}

impl Categories {
    fn intern(&mut self, label: Category) -> usize {
        if let Some(&i) = self.index.get(&label) {
            return i;
        }
        let i = self.labels.len();
        self.index.insert(label.clone(), i);
        self.labels.push(label);
        i
    }
}

/// Records left out of a table because a field was missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Exclusions {
    total: usize,
    by_field: BTreeMap<String, usize>,
}

impl Exclusions {
    fn record(&mut self, err: MissingFieldError) {
        self.total += 1;
        *self.by_field.entry(err.field).or_default() += 1;
    }

    /// Number of excluded records.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Excluded records per missing field, in field name order.
    ///
    /// A record is attributed to the first missing field encountered.
    pub fn by_field(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.by_field.iter().map(|(field, &n)| (field.as_str(), n))
    }

    /// Fails, naming the alphabetically first missing field, if any record
    /// was excluded.
    pub fn ensure_empty(&self) -> Result<(), MissingFieldError> {
        match self.by_field.keys().next() {
            Some(field) => Err(MissingFieldError {
                field: field.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// The count of one (row, column) category combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyCell {
    pub row: Category,
    pub column: Category,
    pub count: u64,
}

/// Counts per combination of two categorical variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    row_key: String,
    column_key: String,
    row_categories: Vec<Category>,
    column_categories: Vec<Category>,
    cells: Vec<FrequencyCell>,
    excluded: Exclusions,
}

impl FrequencyTable {
    /// Groups `records` by `row_key` and `column_key` and counts records.
    #[must_use]
    pub fn build<R, C>(records: &ObservationSet, row_key: &R, column_key: &C) -> Self
    where
        R: GroupingKey + ?Sized,
        C: GroupingKey + ?Sized,
    {
        let Ok(table) = Self::group(records, row_key, column_key, &Tally::Records, |_| {
            Ok::<_, Rejected<Infallible>>(Observed::Record)
        });
        table
    }

    /// Groups `records` by `row_key` and `column_key`, counting per `tally`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidValueError`] when a [`Tally::Sum`] meets a value that
    /// is not a non-negative whole number.
    pub fn build_with<R, C>(
        records: &ObservationSet,
        row_key: &R,
        column_key: &C,
        tally: &Tally,
    ) -> Result<Self, InvalidValueError>
    where
        R: GroupingKey + ?Sized,
        C: GroupingKey + ?Sized,
    {
        Self::group(records, row_key, column_key, tally, |record| {
            tally.observe(record)
        })
    }

    fn group<'r, R, C, E>(
        records: &'r ObservationSet,
        row_key: &R,
        column_key: &C,
        tally: &Tally,
        observe: impl Fn(&'r Record) -> Result<Observed<'r>, Rejected<E>>,
    ) -> Result<Self, E>
    where
        R: GroupingKey + ?Sized,
        C: GroupingKey + ?Sized,
    {
        let mut rows = Categories::default();
        let mut columns = Categories::default();
        let mut groups: Vec<((usize, usize), Counter)> = vec![];
        let mut group_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut excluded = Exclusions::default();

        for record in records {
            let observed = row_key.category(record).map_err(Rejected::Missing).and_then(|row| {
                let column = column_key.category(record)?;
                Ok((row, column, observe(record)?))
            });
            let (row, column, observed) = match observed {
                Ok(observed) => observed,
                Err(Rejected::Missing(err)) => {
                    excluded.record(err);
                    continue;
                }
                Err(Rejected::Invalid(err)) => return Err(err),
            };
            let cell = (rows.intern(row), columns.intern(column));
            let group = *group_index.entry(cell).or_insert_with(|| {
                groups.push((cell, tally.counter()));
                groups.len() - 1
            });
            groups[group].1.add(observed);
        }

        let cells = groups
            .iter()
            .map(|((i, j), counter)| FrequencyCell {
                row: rows.labels[*i].clone(),
                column: columns.labels[*j].clone(),
                count: counter.value(),
            })
            .collect();

        Ok(Self {
            row_key: row_key.name().to_owned(),
            column_key: column_key.name().to_owned(),
            row_categories: rows.labels,
            column_categories: columns.labels,
            cells,
            excluded,
        })
    }

    /// Builds a table from literal cells. Repeated combinations are summed.
    #[must_use]
    pub fn from_cells<I>(row_key: &str, column_key: &str, cells: I) -> Self
    where
        I: IntoIterator<Item = FrequencyCell>,
    {
        let mut rows = Categories::default();
        let mut columns = Categories::default();
        let mut merged: Vec<FrequencyCell> = vec![];
        let mut cell_index: HashMap<(usize, usize), usize> = HashMap::new();
        for cell in cells {
            let key = (rows.intern(cell.row.clone()), columns.intern(cell.column.clone()));
            match cell_index.get(&key) {
                Some(&k) => merged[k].count += cell.count,
                None => {
                    cell_index.insert(key, merged.len());
                    merged.push(cell);
                }
            }
        }
        Self {
            row_key: row_key.to_owned(),
            column_key: column_key.to_owned(),
            row_categories: rows.labels,
            column_categories: columns.labels,
            cells: merged,
            excluded: Exclusions::default(),
        }
    }

    #[must_use]
    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    #[must_use]
    pub fn column_key(&self) -> &str {
        &self.column_key
    }

    #[must_use]
    pub fn row_categories(&self) -> &[Category] {
        &self.row_categories
    }

    #[must_use]
    pub fn column_categories(&self) -> &[Category] {
        &self.column_categories
    }

    /// Non-empty groups in discovery order.
    #[must_use]
    pub fn cells(&self) -> &[FrequencyCell] {
        &self.cells
    }

    #[must_use]
    pub fn excluded(&self) -> &Exclusions {
        &self.excluded
    }

    /// Count for a combination; zero if it was never observed.
    #[must_use]
    pub fn count(&self, row: &str, column: &str) -> u64 {
        self.cells
            .iter()
            .find(|cell| cell.row == row && cell.column == column)
            .map_or(0, |cell| cell.count)
    }

    /// Sum of all cell counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|cell| cell.count).sum()
    }

    /// Reshapes into a contingency table with rows and columns in discovery
    /// order. Combinations never observed are zero.
    #[must_use]
    pub fn pivot(&self) -> ContingencyTable {
        let columns = self.column_categories.len();
        let mut counts = vec![0; self.row_categories.len() * columns];
        let row_index = index_of(&self.row_categories);
        let column_index = index_of(&self.column_categories);
        for cell in &self.cells {
            let i = row_index[cell.row.as_str()];
            let j = column_index[cell.column.as_str()];
            counts[i * columns + j] += cell.count;
        }
        ContingencyTable::from_fn(
            self.row_categories.clone(),
            self.column_categories.clone(),
            |i, j| counts[i * columns + j],
        )
    }
}

fn index_of(labels: &[Category]) -> HashMap<&str, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect()
}

/// Groups `records` by two keys and counts records per combination.
///
/// See [`FrequencyTable::build`].
#[must_use]
pub fn build_frequency_table<R, C>(
    records: &ObservationSet,
    row_key: R,
    column_key: C,
) -> FrequencyTable
where
    R: GroupingKey,
    C: GroupingKey,
{
    FrequencyTable::build(records, &row_key, &column_key)
}

/// Reshapes a frequency table into a zero-filled contingency table.
///
/// See [`FrequencyTable::pivot`].
#[must_use]
pub fn pivot(table: &FrequencyTable) -> ContingencyTable {
    table.pivot()
}

/// One-way frequency table: counts per category of a single key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    key: String,
    entries: Vec<(Category, u64)>,
    excluded: Exclusions,
}

impl CategoryCounts {
    /// Counts `records` per category of `key`, in discovery order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidValueError`] when a [`Tally::Sum`] meets a value that
    /// is not a non-negative whole number.
    pub fn build<K>(records: &ObservationSet, key: &K, tally: &Tally) -> Result<Self, InvalidValueError>
    where
        K: GroupingKey + ?Sized,
    {
        let mut categories = Categories::default();
        let mut counters: Vec<Counter> = vec![];
        let mut excluded = Exclusions::default();
        for record in records {
            let observed = key
                .category(record)
                .map_err(Rejected::Missing)
                .and_then(|category| tally.observe(record).map(|observed| (category, observed)));
            let (category, observed) = match observed {
                Ok(observed) => observed,
                Err(Rejected::Missing(err)) => {
                    excluded.record(err);
                    continue;
                }
                Err(Rejected::Invalid(err)) => return Err(err),
            };
            let i = categories.intern(category);
            if i == counters.len() {
                counters.push(tally.counter());
            }
            counters[i].add(observed);
        }
        Ok(Self {
            key: key.name().to_owned(),
            entries: categories
                .labels
                .into_iter()
                .zip(counters.iter().map(Counter::value))
                .collect(),
            excluded,
        })
    }

    /// Orders categories by descending count; ties keep discovery order.
    #[must_use]
    pub fn sort_by_count(mut self) -> Self {
        self.entries.sort_by(|(_, a), (_, b)| b.cmp(a));
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn entries(&self) -> &[(Category, u64)] {
        &self.entries
    }

    #[must_use]
    pub fn excluded(&self) -> &Exclusions {
        &self.excluded
    }

    #[must_use]
    pub fn count(&self, category: &str) -> u64 {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map_or(0, |&(_, n)| n)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|&(_, n)| n).sum()
    }

    /// Share of the total per category. Empty when the total is zero.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn proportions(&self) -> Vec<(&str, f64)> {
        let total = self.total();
        if total == 0 {
            return vec![];
        }
        self.entries
            .iter()
            .map(|(category, n)| (category.as_str(), *n as f64 / total as f64))
            .collect()
    }
}
