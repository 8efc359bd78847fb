//! Contingency tables of observed counts
//!
//! A [`ContingencyTable`] cross-tabulates two categorical variables: rows are
//! the levels of one variable, columns the levels of the other, and each cell
//! holds the number of observations with that combination.
//!
//! Tables can be built from literal counts (for reproducing published figures)
//! or from labelled counts produced by pivoting a frequency table.
//!
//! # Examples
//!
//! ```
//! use crosstab_stats::contingency::ContingencyTable;
//!
//! let table = ContingencyTable::from_rows(&[[30, 146], [75, 413]]).unwrap();
//! assert_eq!(table.row_totals(), vec![176, 488]);
//! assert_eq!(table.column_totals(), vec![105, 559]);
//! assert_eq!(table.grand_total(), 664);
//! ```

use serde::Serialize;

use crate::error::{DomainRangeError, InvalidTableError, StatsError};

/// A labelled matrix of non-negative counts.
///
/// Counts are stored row-major. Any shape can be represented, including empty
/// tables; [`ContingencyTable::validate`] checks the conditions a chi-squared
/// test needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    counts: Vec<u64>,
}

impl ContingencyTable {
    /// Builds a table from literal signed counts with positional labels
    /// (`"0"`, `"1"`, ...).
    ///
    /// # Errors
    ///
    /// * [`DomainRangeError::NegativeCount`] if any count is negative
    /// * [`InvalidTableError::Ragged`] if rows differ in length
    /// * [`InvalidTableError::TotalOverflow`] if the counts do not add up
    ///   within `u64`
    ///
    /// # Examples
    ///
    /// ```
    /// use crosstab_stats::contingency::ContingencyTable;
    ///
    /// assert!(ContingencyTable::from_rows(&[[1, 2], [3, -4]]).is_err());
    /// assert!(ContingencyTable::from_rows(&[vec![1, 2], vec![3]]).is_err());
    /// ```
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, StatsError>
    where
        R: AsRef<[i64]>,
    {
        let columns = rows.first().map_or(0, |row| row.as_ref().len());
        let mut counts = Vec::with_capacity(rows.len() * columns);
        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != columns {
                return Err(InvalidTableError::Ragged {
                    row,
                    expected: columns,
                    found: cells.len(),
                }
                .into());
            }
            for (column, &value) in cells.iter().enumerate() {
                let count = u64::try_from(value)
                    .map_err(|_| DomainRangeError::NegativeCount { row, column, value })?;
                counts.push(count);
            }
        }
        let table = Self {
            row_labels: positional_labels(rows.len()),
            column_labels: positional_labels(columns),
            counts,
        };
        table.checked_grand_total()?;
        Ok(table)
    }

    /// Builds a table from labelled rows of counts.
    ///
    /// # Errors
    ///
    /// Returns an error when the number of labels does not match the data or
    /// when rows differ in length.
    pub fn with_labels(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        rows: Vec<Vec<u64>>,
    ) -> Result<Self, InvalidTableError> {
        if rows.len() != row_labels.len() {
            return Err(InvalidTableError::LabelCount {
                axis: "row",
                expected: rows.len(),
                found: row_labels.len(),
            });
        }
        let mut counts = Vec::with_capacity(rows.len() * column_labels.len());
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != column_labels.len() {
                return Err(InvalidTableError::Ragged {
                    row,
                    expected: column_labels.len(),
                    found: cells.len(),
                });
            }
            counts.extend(cells);
        }
        Ok(Self {
            row_labels,
            column_labels,
            counts,
        })
    }

    /// Builds a table by evaluating `count(row, column)` for every cell.
    ///
    /// This cannot fail: the shape is taken from the label vectors.
    #[must_use]
    pub fn from_fn<F>(row_labels: Vec<String>, column_labels: Vec<String>, mut count: F) -> Self
    where
        F: FnMut(usize, usize) -> u64,
    {
        let counts = (0..row_labels.len())
            .flat_map(|row| (0..column_labels.len()).map(move |column| (row, column)))
            .map(|(row, column)| count(row, column))
            .collect();
        Self {
            row_labels,
            column_labels,
            counts,
        }
    }

    /// Replaces the positional or pivoted labels.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTableError::LabelCount`] if a label vector has the wrong length.
    pub fn relabel(
        mut self,
        row_labels: Vec<String>,
        column_labels: Vec<String>,
    ) -> Result<Self, InvalidTableError> {
        if row_labels.len() != self.rows() {
            return Err(InvalidTableError::LabelCount {
                axis: "row",
                expected: self.rows(),
                found: row_labels.len(),
            });
        }
        if column_labels.len() != self.columns() {
            return Err(InvalidTableError::LabelCount {
                axis: "column",
                expected: self.columns(),
                found: column_labels.len(),
            });
        }
        self.row_labels = row_labels;
        self.column_labels = column_labels;
        Ok(self)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.column_labels.len()
    }

    #[must_use]
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    #[must_use]
    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    /// Returns the count at (`row`, `column`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> u64 {
        assert!(row < self.rows() && column < self.columns(), "cell out of bounds");
        self.counts[row * self.columns() + column]
    }

    /// Returns the counts of one row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[u64] {
        let width = self.columns();
        &self.counts[row * width..(row + 1) * width]
    }

    /// Iterates over `(label, counts)` for every row.
    pub fn iter_rows(&self) -> impl Iterator<Item = (&str, &[u64])> + '_ {
        self.row_labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), self.row(i)))
    }

    #[must_use]
    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.iter().position(|l| l == label)
    }

    #[must_use]
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.column_labels.iter().position(|l| l == label)
    }

    /// Row totals, saturating at `u64::MAX`.
    #[must_use]
    pub fn row_totals(&self) -> Vec<u64> {
        (0..self.rows())
            .map(|i| saturating_total(self.row(i).iter().copied()))
            .collect()
    }

    /// Column totals, saturating at `u64::MAX`.
    #[must_use]
    pub fn column_totals(&self) -> Vec<u64> {
        (0..self.columns())
            .map(|j| saturating_total((0..self.rows()).map(|i| self.get(i, j))))
            .collect()
    }

    /// Sum of all counts, saturating at `u64::MAX`.
    ///
    /// [`ContingencyTable::validate`] rejects tables whose total does not fit.
    #[must_use]
    pub fn grand_total(&self) -> u64 {
        saturating_total(self.counts.iter().copied())
    }

    fn checked_grand_total(&self) -> Result<u64, InvalidTableError> {
        self.counts
            .iter()
            .try_fold(0_u64, |total, &count| total.checked_add(count))
            .ok_or(InvalidTableError::TotalOverflow)
    }

    /// Share of each row's total that falls in `column`.
    ///
    /// Rows with a zero total yield `None`. This is the "percent protected"
    /// style column printed next to a pivot.
    ///
    /// # Examples
    ///
    /// ```
    /// use crosstab_stats::contingency::ContingencyTable;
    ///
    /// let table = ContingencyTable::from_rows(&[[1, 3], [0, 0]]).unwrap();
    /// assert_eq!(table.row_proportions(1), vec![Some(0.75), None]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn row_proportions(&self, column: usize) -> Vec<Option<f64>> {
        self.row_totals()
            .into_iter()
            .enumerate()
            .map(|(row, total)| {
                (total > 0).then(|| self.get(row, column) as f64 / total as f64)
            })
            .collect()
    }

    /// Extracts the sub-table made of the named rows, in the given order.
    ///
    /// Returns `None` if any label is unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use crosstab_stats::contingency::ContingencyTable;
    ///
    /// let table = ContingencyTable::from_rows(&[[1, 2], [3, 4], [5, 6]])
    ///     .unwrap()
    ///     .relabel(
    ///         vec!["a".into(), "b".into(), "c".into()],
    ///         vec!["x".into(), "y".into()],
    ///     )
    ///     .unwrap();
    /// let sub = table.select_rows(&["c", "a"]).unwrap();
    /// assert_eq!(sub.row(0), &[5, 6]);
    /// assert_eq!(sub.row(1), &[1, 2]);
    /// assert!(table.select_rows(&["z"]).is_none());
    /// ```
    #[must_use]
    pub fn select_rows(&self, labels: &[&str]) -> Option<Self> {
        let indices = labels
            .iter()
            .map(|label| self.row_index(label))
            .collect::<Option<Vec<_>>>()?;
        Some(Self::from_fn(
            indices.iter().map(|&i| self.row_labels[i].clone()).collect(),
            self.column_labels.clone(),
            |row, column| self.get(indices[row], column),
        ))
    }

    /// Extracts the sub-table made of the named columns, in the given order.
    #[must_use]
    pub fn select_columns(&self, labels: &[&str]) -> Option<Self> {
        let indices = labels
            .iter()
            .map(|label| self.column_index(label))
            .collect::<Option<Vec<_>>>()?;
        Some(Self::from_fn(
            self.row_labels.clone(),
            indices
                .iter()
                .map(|&j| self.column_labels[j].clone())
                .collect(),
            |row, column| self.get(row, indices[column]),
        ))
    }

    /// Checks that the table is admissible for a test of independence:
    /// at least 2x2, a grand total that fits in `u64` and no zero row or
    /// column total.
    pub fn validate(&self) -> Result<(), InvalidTableError> {
        if self.rows() < 2 || self.columns() < 2 {
            return Err(InvalidTableError::TooSmall {
                rows: self.rows(),
                columns: self.columns(),
            });
        }
        self.checked_grand_total()?;
        if let Some(i) = self.row_totals().iter().position(|&total| total == 0) {
            return Err(InvalidTableError::ZeroRowTotal {
                label: self.row_labels[i].clone(),
            });
        }
        if let Some(j) = self.column_totals().iter().position(|&total| total == 0) {
            return Err(InvalidTableError::ZeroColumnTotal {
                label: self.column_labels[j].clone(),
            });
        }
        Ok(())
    }
}

fn saturating_total<I>(counts: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    counts.into_iter().fold(0, u64::saturating_add)
}

fn positional_labels(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_literal_rows_keep_positions() {
        let table = ContingencyTable::from_rows(&[[250, 2254], [325, 2175]]).unwrap();
        assert_eq!(table.rows(), 2);
        assert_eq!(table.columns(), 2);
        assert_eq!(table.get(1, 0), 325);
        assert_eq!(table.row_labels(), &["0", "1"]);
        assert_eq!(table.grand_total(), 5004);
    }

    #[test]
    fn test_negative_count_is_domain_error() {
        let err = ContingencyTable::from_rows(&[[1, 2], [-3, 4]]).unwrap_err();
        assert_eq!(
            err,
            StatsError::DomainRange(DomainRangeError::NegativeCount {
                row: 1,
                column: 0,
                value: -3
            })
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = ContingencyTable::with_labels(
            labels(&["a", "b"]),
            labels(&["x", "y"]),
            vec![vec![1, 2], vec![3]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidTableError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let err =
            ContingencyTable::with_labels(labels(&["a"]), labels(&["x"]), vec![]).unwrap_err();
        assert!(matches!(err, InvalidTableError::LabelCount { axis: "row", .. }));

        let table = ContingencyTable::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let err = table
            .relabel(labels(&["a", "b"]), labels(&["x"]))
            .unwrap_err();
        assert!(matches!(err, InvalidTableError::LabelCount { axis: "column", .. }));
    }

    #[test]
    fn test_totals() {
        let table = ContingencyTable::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        assert_eq!(table.row_totals(), vec![6, 15]);
        assert_eq!(table.column_totals(), vec![5, 7, 9]);
        assert_eq!(table.grand_total(), 21);
    }

    #[test]
    fn test_totals_that_overflow_are_rejected() {
        let huge = [[i64::MAX, i64::MAX], [i64::MAX, 1]];
        assert_eq!(
            ContingencyTable::from_rows(&huge),
            Err(StatsError::InvalidTable(InvalidTableError::TotalOverflow))
        );

        let table = ContingencyTable::from_fn(labels(&["a", "b"]), labels(&["x", "y"]), |_, _| {
            u64::MAX / 2
        });
        assert_eq!(table.row_totals(), vec![u64::MAX - 1, u64::MAX - 1]);
        assert_eq!(table.grand_total(), u64::MAX);
        assert_eq!(table.validate(), Err(InvalidTableError::TotalOverflow));
    }

    #[test]
    fn test_validate_rejects_small_tables() {
        let table = ContingencyTable::from_rows(&[[1, 2]]).unwrap();
        assert_eq!(
            table.validate(),
            Err(InvalidTableError::TooSmall {
                rows: 1,
                columns: 2
            })
        );
        let empty = ContingencyTable::from_rows::<[i64; 0]>(&[]).unwrap();
        assert!(matches!(
            empty.validate(),
            Err(InvalidTableError::TooSmall { rows: 0, columns: 0 })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_totals() {
        let table = ContingencyTable::with_labels(
            labels(&["mammal", "fish"]),
            labels(&["protected", "not_protected"]),
            vec![vec![3, 4], vec![0, 0]],
        )
        .unwrap();
        assert_eq!(
            table.validate(),
            Err(InvalidTableError::ZeroRowTotal {
                label: "fish".to_owned()
            })
        );

        let table = ContingencyTable::from_rows(&[[3, 0], [4, 0]]).unwrap();
        assert_eq!(
            table.validate(),
            Err(InvalidTableError::ZeroColumnTotal {
                label: "1".to_owned()
            })
        );
    }

    #[test]
    fn test_select_columns_reorders() {
        let table = ContingencyTable::with_labels(
            labels(&["A", "B"]),
            labels(&["Application", "No Application"]),
            vec![vec![250, 2254], vec![325, 2175]],
        )
        .unwrap();
        let swapped = table
            .select_columns(&["No Application", "Application"])
            .unwrap();
        assert_eq!(swapped.row(0), &[2254, 250]);
        assert_eq!(swapped.column_labels(), &["No Application", "Application"]);
        assert!(table.select_columns(&["Member"]).is_none());
    }

    #[test]
    fn test_iter_rows_pairs_labels_and_counts() {
        let table = ContingencyTable::from_fn(labels(&["a", "b"]), labels(&["x", "y"]), |r, c| {
            u64::try_from(r * 10 + c).unwrap()
        });
        let rows = table.iter_rows().collect::<Vec<_>>();
        assert_eq!(rows, vec![("a", &[0, 1][..]), ("b", &[10, 11][..])]);
    }
}
