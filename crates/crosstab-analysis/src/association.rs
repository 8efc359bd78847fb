//! Association analysis: from observations to a significance verdict
//!
//! [`AssociationAnalyzer`] chains the steps of a categorical association
//! study:
//!
//! 1. group and count observations ([`FrequencyTable::build_with`])
//! 2. pivot into a [`ContingencyTable`]
//! 3. run a chi-squared test of independence
//!
//! It can also test a pair of rows of an existing table, or every pair, to
//! find out which categories differ (mammals vs birds, mammals vs reptiles).
//!
//! # Examples
//!
//! ```
//! use crosstab_analysis::{association::AssociationAnalyzer, config::AnalyzerConfig};
//! use crosstab_stats::contingency::ContingencyTable;
//!
//! let analyzer = AssociationAnalyzer::new(&AnalyzerConfig::default()).unwrap();
//! let table = ContingencyTable::from_rows(&[[30, 146], [75, 413], [5, 73]])
//!     .unwrap()
//!     .relabel(
//!         vec!["Mammal".into(), "Bird".into(), "Reptile".into()],
//!         vec!["Protected".into(), "Not Protected".into()],
//!     )
//!     .unwrap();
//!
//! let mammal_bird = analyzer.compare_rows(&table, "Mammal", "Bird").unwrap();
//! assert!(!mammal_bird.outcome.is_significant());
//!
//! let mammal_reptile = analyzer.compare_rows(&table, "Mammal", "Reptile").unwrap();
//! assert!(mammal_reptile.outcome.is_significant());
//! ```

use crosstab_stats::{
    chi_squared::{ChiSquaredOutcome, ChiSquaredTest},
    contingency::ContingencyTable,
    error::StatsError,
};
use serde::Serialize;

use crate::{
    config::AnalyzerConfig,
    error::AnalysisError,
    frequency::{FrequencyTable, Tally},
    grouping::GroupingKey,
    record::ObservationSet,
};

/// Runs association studies with a fixed test configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssociationAnalyzer {
    test: ChiSquaredTest,
    strict: bool,
}

impl Default for AssociationAnalyzer {
    fn default() -> Self {
        Self::with_test(ChiSquaredTest::default())
    }
}

impl AssociationAnalyzer {
    /// # Errors
    ///
    /// Fails if the configured significance level is out of range.
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        let test = config
            .chi_squared_test()
            .map_err(StatsError::from)?;
        Ok(Self::with_test(test))
    }

    #[must_use]
    pub fn with_test(test: ChiSquaredTest) -> Self {
        Self {
            test,
            strict: false,
        }
    }

    /// When strict, [`Self::analyze`] fails on the first record lacking a
    /// grouping or tally field instead of excluding it.
    #[must_use]
    pub fn strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }

    #[must_use]
    pub fn test(&self) -> &ChiSquaredTest {
        &self.test
    }

    /// Groups, pivots and tests `records`.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::MissingField`] in strict mode when a record lacks a field
    /// * [`AnalysisError::InvalidValue`] when a summed field holds a non-count value
    /// * [`AnalysisError::Stats`] when the pivoted table cannot be tested
    pub fn analyze<R, C>(
        &self,
        records: &ObservationSet,
        row_key: &R,
        column_key: &C,
        tally: &Tally,
    ) -> Result<AssociationReport, AnalysisError>
    where
        R: GroupingKey + ?Sized,
        C: GroupingKey + ?Sized,
    {
        let frequencies = FrequencyTable::build_with(records, row_key, column_key, tally)?;
        if self.strict {
            frequencies.excluded().ensure_empty()?;
        }
        let contingency = frequencies.pivot();
        let outcome = self.test_table(&contingency)?;
        Ok(AssociationReport {
            frequencies,
            contingency,
            outcome,
        })
    }

    /// Tests an already tabulated contingency table.
    pub fn test_table(&self, table: &ContingencyTable) -> Result<ChiSquaredOutcome, AnalysisError> {
        Ok(self.test.run(table)?)
    }

    /// Tests the 2-row sub-table made of rows `first` and `second`.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::UnknownCategory`] if a label is not a row of `table`
    /// * [`AnalysisError::Stats`] if the sub-table cannot be tested
    pub fn compare_rows(
        &self,
        table: &ContingencyTable,
        first: &str,
        second: &str,
    ) -> Result<PairwiseComparison, AnalysisError> {
        for label in [first, second] {
            if table.row_index(label).is_none() {
                return Err(AnalysisError::UnknownCategory {
                    axis: "row",
                    label: label.to_owned(),
                });
            }
        }
        let sub_table = table
            .select_rows(&[first, second])
            .ok_or_else(|| AnalysisError::UnknownCategory {
                axis: "row",
                label: first.to_owned(),
            })?;
        let outcome = self.test_table(&sub_table)?;
        Ok(PairwiseComparison {
            first: first.to_owned(),
            second: second.to_owned(),
            table: sub_table,
            outcome,
        })
    }

    /// Compares every pair of rows, in row order.
    ///
    /// Each pair succeeds or fails on its own; a pair whose sub-table has a
    /// zero column total does not stop the others. Every entry carries the
    /// labels of the pair it tested.
    #[must_use]
    pub fn pairwise_rows(&self, table: &ContingencyTable) -> Vec<PairOutcome> {
        let labels = table.row_labels();
        labels
            .iter()
            .enumerate()
            .flat_map(|(i, first)| labels[i + 1..].iter().map(move |second| (first, second)))
            .map(|(first, second)| PairOutcome {
                first: first.clone(),
                second: second.clone(),
                comparison: self.compare_rows(table, first, second),
            })
            .collect()
    }
}

/// Everything computed by [`AssociationAnalyzer::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationReport {
    frequencies: FrequencyTable,
    contingency: ContingencyTable,
    outcome: ChiSquaredOutcome,
}

impl AssociationReport {
    #[must_use]
    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    #[must_use]
    pub fn contingency(&self) -> &ContingencyTable {
        &self.contingency
    }

    #[must_use]
    pub fn outcome(&self) -> &ChiSquaredOutcome {
        &self.outcome
    }
}

/// A test of two rows of a larger table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison {
    pub first: String,
    pub second: String,
    pub table: ContingencyTable,
    pub outcome: ChiSquaredOutcome,
}

/// One entry of [`AssociationAnalyzer::pairwise_rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct PairOutcome {
    pub first: String,
    pub second: String,
    pub comparison: Result<PairwiseComparison, AnalysisError>,
}

#[cfg(test)]
mod tests {
    use crosstab_stats::significance::SignificanceLevel;

    use super::*;
    use crate::{
        grouping::{FieldKey, PresenceKey},
        record::Record,
    };

    /// Repeats a (row, column) observation `n` times.
    fn repeat(records: &mut Vec<Record>, n: usize, category: &str, protected: bool) {
        let status = protected.then_some("Species of Concern");
        records.extend((0..n).map(|_| {
            Record::new()
                .with("category", category)
                .with("conservation_status", status)
        }));
    }

    fn species() -> ObservationSet {
        let mut records = vec![];
        repeat(&mut records, 30, "Mammal", true);
        repeat(&mut records, 146, "Mammal", false);
        repeat(&mut records, 75, "Bird", true);
        repeat(&mut records, 413, "Bird", false);
        repeat(&mut records, 5, "Reptile", true);
        repeat(&mut records, 73, "Reptile", false);
        ObservationSet::from(records)
    }

    fn is_protected() -> PresenceKey {
        PresenceKey::new("is_protected", "conservation_status")
            .labels("Protected", "Not Protected")
    }

    fn species_table() -> ContingencyTable {
        FrequencyTable::build(&species(), &FieldKey::new("category"), &is_protected()).pivot()
    }

    #[test]
    fn test_analyze_reports_all_steps() {
        let analyzer = AssociationAnalyzer::default();
        let report = analyzer
            .analyze(
                &species(),
                &FieldKey::new("category"),
                &is_protected(),
                &Tally::Records,
            )
            .unwrap();
        assert_eq!(report.frequencies().total(), 742);
        assert_eq!(report.contingency().row_labels(), ["Mammal", "Bird", "Reptile"]);
        assert_eq!(report.contingency().row(2), &[5, 73]);
        assert_eq!(report.outcome().result().degrees_of_freedom(), 2);
        assert!(!report.outcome().yates_corrected());
    }

    #[test]
    fn test_compare_rows_matches_literal_tables() {
        let analyzer = AssociationAnalyzer::default();
        let table = species_table();

        let mammal_bird = analyzer.compare_rows(&table, "Mammal", "Bird").unwrap();
        let literal = ContingencyTable::from_rows(&[[30, 146], [75, 413]]).unwrap();
        let expected = analyzer.test_table(&literal).unwrap();
        assert_eq!(mammal_bird.table.row(0), &[30, 146]);
        assert!(
            (mammal_bird.outcome.result().p_value() - expected.result().p_value()).abs() < 1e-12
        );
        assert!(!mammal_bird.outcome.is_significant());

        let mammal_reptile = analyzer.compare_rows(&table, "Mammal", "Reptile").unwrap();
        assert!(mammal_reptile.outcome.is_significant());
        assert!(mammal_reptile.outcome.result().p_value() < 0.05);
    }

    #[test]
    fn test_compare_rows_unknown_label() {
        let analyzer = AssociationAnalyzer::default();
        let err = analyzer
            .compare_rows(&species_table(), "Mammal", "Fish")
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UnknownCategory {
                axis: "row",
                label: "Fish".to_owned()
            }
        );
    }

    #[test]
    fn test_pairwise_rows_covers_every_pair() {
        let analyzer = AssociationAnalyzer::default();
        let comparisons = analyzer.pairwise_rows(&species_table());
        let pairs = comparisons
            .iter()
            .map(|c| {
                let comparison = c.comparison.as_ref().unwrap();
                assert_eq!(comparison.first, c.first);
                (c.first.as_str(), c.second.as_str())
            })
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![("Mammal", "Bird"), ("Mammal", "Reptile"), ("Bird", "Reptile")]
        );
    }

    #[test]
    fn test_pairwise_rows_keeps_failures_separate() {
        let table = ContingencyTable::from_rows(&[[0, 10], [0, 12], [4, 9]]).unwrap();
        let comparisons = AssociationAnalyzer::default().pairwise_rows(&table);
        assert_eq!(comparisons.len(), 3);
        assert_eq!((comparisons[0].first.as_str(), comparisons[0].second.as_str()), ("0", "1"));
        assert!(matches!(
            comparisons[0].comparison,
            Err(AnalysisError::Stats(StatsError::InvalidTable(_)))
        ));
        assert!(comparisons[1].comparison.is_ok());
        assert!(comparisons[2].comparison.is_ok());
    }

    #[test]
    fn test_visitor_groups_differ_in_applications() {
        let mut records = vec![];
        let groups = [
            ("A", true, 250),
            ("A", false, 2254),
            ("B", true, 325),
            ("B", false, 2175),
        ];
        for (group, applied, n) in groups {
            let tested = (group == "A").then_some("2017-07-03");
            let application = applied.then_some("2017-07-05");
            records.extend((0..n).map(|_| {
                Record::new()
                    .with("fitness_test_date", tested)
                    .with("application_date", application)
            }));
        }
        let report = AssociationAnalyzer::default()
            .analyze(
                &ObservationSet::from(records),
                &PresenceKey::new("ab_test_group", "fitness_test_date").labels("A", "B"),
                &PresenceKey::new("is_application", "application_date"),
                &Tally::Records,
            )
            .unwrap();
        assert_eq!(report.contingency().row(0), &[250, 2254]);
        assert!(report.outcome().is_significant());
        assert!((report.outcome().result().statistic() - 10.894).abs() < 0.01);
    }

    #[test]
    fn test_strict_mode_rejects_missing_fields() {
        let mut records = species();
        records.push(Record::new().with("category", "Fish"));
        let keys = (FieldKey::new("category"), is_protected());

        let lenient = AssociationAnalyzer::default()
            .analyze(&records, &keys.0, &keys.1, &Tally::Records)
            .unwrap();
        assert_eq!(lenient.frequencies().excluded().total(), 1);

        let err = AssociationAnalyzer::default()
            .strict(true)
            .analyze(&records, &keys.0, &keys.1, &Tally::Records)
            .unwrap_err();
        assert!(
            matches!(err, AnalysisError::MissingField(ref e) if e.field == "conservation_status")
        );
    }

    #[test]
    fn test_analyze_propagates_unsummable_values() {
        let records = ObservationSet::from(vec![
            Record::new()
                .with("park_name", "Bryce National Park")
                .with("is_sheep", true)
                .with("observations", "none recorded"),
        ]);
        let err = AssociationAnalyzer::default()
            .analyze(
                &records,
                &FieldKey::new("park_name"),
                &FieldKey::new("is_sheep"),
                &Tally::Sum {
                    field: "observations".to_owned(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidValue(ref e) if e.field == "observations"));
    }

    #[test]
    fn test_configured_level_is_used() {
        let config = AnalyzerConfig {
            significance_level: 0.01,
            ..AnalyzerConfig::default()
        };
        let analyzer = AssociationAnalyzer::new(&config).unwrap();
        assert_eq!(
            analyzer.test().significance_level(),
            SignificanceLevel::new(0.01).unwrap()
        );
        let outcome = analyzer
            .compare_rows(&species_table(), "Mammal", "Reptile")
            .unwrap()
            .outcome;
        assert!(!outcome.is_significant());

        let invalid = AnalyzerConfig {
            significance_level: 0.0,
            ..AnalyzerConfig::default()
        };
        assert!(AssociationAnalyzer::new(&invalid).is_err());
    }
}
