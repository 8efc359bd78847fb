//! Pearson's chi-squared test of independence
//!
//! Compares the observed counts of a [`ContingencyTable`] with the counts
//! expected if the row and column variables were independent:
//!
//! ```text
//! expected[i][j] = row_total[i] * column_total[j] / grand_total
//! statistic      = Σ (observed - expected)² / expected
//! dof            = (rows - 1) * (columns - 1)
//! p_value        = P(χ²(dof) >= statistic)
//! ```
//!
//! # Continuity Correction
//!
//! For tables with a single degree of freedom (2x2), Yates' correction is
//! applied by default: each `|observed - expected|` is reduced by
//! `min(0.5, |observed - expected|)` before squaring. This matches the
//! behaviour of the most common statistical packages and makes published
//! p-values reproducible. Disable it with [`ChiSquaredTest::yates_correction`].
//!
//! # Examples
//!
//! ```
//! use crosstab_stats::{chi_squared::chi_squared_test, contingency::ContingencyTable};
//!
//! // Mammals vs reptiles, protected vs not protected
//! let table = ContingencyTable::from_rows(&[[30, 146], [5, 73]]).unwrap();
//! let outcome = chi_squared_test(&table, 0.10).unwrap();
//! assert!(outcome.is_significant());
//! assert_eq!(outcome.result().degrees_of_freedom(), 1);
//! ```

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::{
    contingency::ContingencyTable,
    error::StatsError,
    significance::SignificanceLevel,
};

/// Result of a chi-squared test of independence.
///
/// Holds the statistic, degrees of freedom, p-value and the expected
/// frequency matrix. Values are read through accessors only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    statistic: f64,
    degrees_of_freedom: usize,
    p_value: f64,
    expected: Vec<Vec<f64>>,
}

impl TestResult {
    #[must_use]
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    #[must_use]
    pub fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    #[must_use]
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Expected frequencies under independence, row-major.
    #[must_use]
    pub fn expected(&self) -> &[Vec<f64>] {
        &self.expected
    }
}

/// A test result classified against a significance level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquaredOutcome {
    result: TestResult,
    significance_level: SignificanceLevel,
    yates_corrected: bool,
    is_significant: bool,
}

impl ChiSquaredOutcome {
    #[must_use]
    pub fn result(&self) -> &TestResult {
        &self.result
    }

    #[must_use]
    pub fn significance_level(&self) -> SignificanceLevel {
        self.significance_level
    }

    /// Whether Yates' correction was applied to the statistic.
    #[must_use]
    pub fn yates_corrected(&self) -> bool {
        self.yates_corrected
    }

    /// `p_value < significance_level`
    #[must_use]
    pub fn is_significant(&self) -> bool {
        self.is_significant
    }
}

/// A configured chi-squared test of independence.
///
/// # Examples
///
/// ```
/// use crosstab_stats::{
///     chi_squared::ChiSquaredTest, contingency::ContingencyTable,
///     significance::SignificanceLevel,
/// };
///
/// let test = ChiSquaredTest::new(SignificanceLevel::new(0.05).unwrap()).yates_correction(false);
/// let table = ContingencyTable::from_rows(&[[200, 50], [250, 75]]).unwrap();
/// let outcome = test.run(&table).unwrap();
/// assert!(!outcome.is_significant());
/// assert!(!outcome.yates_corrected());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquaredTest {
    significance_level: SignificanceLevel,
    yates_correction: bool,
}

impl Default for ChiSquaredTest {
    fn default() -> Self {
        Self::new(SignificanceLevel::DEFAULT)
    }
}

impl ChiSquaredTest {
    /// Creates a test at the given level with Yates' correction enabled for
    /// single-degree-of-freedom tables.
    #[must_use]
    pub fn new(significance_level: SignificanceLevel) -> Self {
        Self {
            significance_level,
            yates_correction: true,
        }
    }

    /// Enables or disables Yates' correction for 2x2 tables.
    #[must_use]
    pub fn yates_correction(self, enabled: bool) -> Self {
        Self {
            yates_correction: enabled,
            ..self
        }
    }

    #[must_use]
    pub fn significance_level(&self) -> SignificanceLevel {
        self.significance_level
    }

    /// Runs the test on `table`.
    ///
    /// # Errors
    ///
    /// * [`StatsError::InvalidTable`] if the table is smaller than 2x2 or has a
    ///   zero row or column total
    pub fn run(&self, table: &ContingencyTable) -> Result<ChiSquaredOutcome, StatsError> {
        table.validate()?;

        let expected = expected_frequencies(table);
        let degrees_of_freedom = (table.rows() - 1) * (table.columns() - 1);
        let yates_corrected = self.yates_correction && degrees_of_freedom == 1;

        let mut statistic = 0.0;
        for (i, expected_row) in expected.iter().enumerate() {
            for (j, &e) in expected_row.iter().enumerate() {
                #[expect(clippy::cast_precision_loss)]
                let observed = table.get(i, j) as f64;
                let mut deviation = (observed - e).abs();
                if yates_corrected {
                    deviation -= deviation.min(0.5);
                }
                statistic += deviation * deviation / e;
            }
        }

        let p_value = chi_squared_survival(statistic, degrees_of_freedom)?;

        Ok(ChiSquaredOutcome {
            result: TestResult {
                statistic,
                degrees_of_freedom,
                p_value,
                expected,
            },
            significance_level: self.significance_level,
            yates_corrected,
            is_significant: self.significance_level.is_significant(p_value),
        })
    }
}

/// Runs a chi-squared test of independence at `significance_level`.
///
/// Uses the default continuity handling of [`ChiSquaredTest`].
///
/// # Errors
///
/// * [`StatsError::DomainRange`] if `significance_level` is not in (0, 1)
/// * [`StatsError::InvalidTable`] if the table cannot be tested
pub fn chi_squared_test(
    table: &ContingencyTable,
    significance_level: f64,
) -> Result<ChiSquaredOutcome, StatsError> {
    let level = SignificanceLevel::new(significance_level)?;
    ChiSquaredTest::new(level).run(table)
}

/// Expected counts under independence for every cell.
///
/// The caller must have validated the table (non-zero grand total).
#[expect(clippy::cast_precision_loss)]
fn expected_frequencies(table: &ContingencyTable) -> Vec<Vec<f64>> {
    let grand_total = table.grand_total() as f64;
    let column_totals = table.column_totals();
    table
        .row_totals()
        .into_iter()
        .map(|row_total| {
            column_totals
                .iter()
                .map(|&column_total| row_total as f64 * column_total as f64 / grand_total)
                .collect()
        })
        .collect()
}

/// Upper tail probability of the chi-squared distribution.
#[expect(clippy::cast_precision_loss)]
fn chi_squared_survival(statistic: f64, degrees_of_freedom: usize) -> Result<f64, StatsError> {
    if statistic <= 0.0 {
        return Ok(1.0);
    }
    let distribution =
        ChiSquared::new(degrees_of_freedom as f64).map_err(|err| StatsError::Distribution {
            distribution: "chi-squared",
            message: err.to_string(),
        })?;
    Ok(distribution.sf(statistic).clamp(0.0, 1.0))
}
