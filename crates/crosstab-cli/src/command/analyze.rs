//! Association analysis command
//!
//! Groups an observation file by two variables, prints the frequency and
//! contingency tables, and tests the variables for independence.

use std::{path::PathBuf, str::FromStr};

use anyhow::Context;
use clap::Args;
use crosstab_analysis::{
    association::{AssociationAnalyzer, AssociationReport, PairwiseComparison},
    frequency::Tally,
    grouping::{FieldKey, GroupingKey, PresenceKey},
};
use serde::Serialize;

use crate::{
    report,
    util::{self, ConfigArg, InputFormat, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Observation file (CSV with a header row, or a JSON array of objects)
    pub data: PathBuf,

    /// Input format (csv or json); guessed from the extension by default
    #[arg(long)]
    pub format: Option<InputFormat>,

    /// Field whose values become the table rows
    #[arg(long)]
    pub rows: String,

    /// Group rows by presence of the field instead, labelled PRESENT,ABSENT
    #[arg(long, value_name = "PRESENT,ABSENT")]
    pub rows_presence: Option<LabelPair>,

    /// Field whose values become the table columns
    #[arg(long)]
    pub columns: String,

    /// Group columns by presence of the field instead, labelled PRESENT,ABSENT
    #[arg(long, value_name = "PRESENT,ABSENT")]
    pub columns_presence: Option<LabelPair>,

    /// Count distinct non-null values of this field instead of records
    #[arg(long, value_name = "FIELD", conflicts_with_all = ["count_non_null", "sum"])]
    pub count_distinct: Option<String>,

    /// Count non-null values of this field instead of records
    #[arg(long, value_name = "FIELD", conflicts_with = "sum")]
    pub count_non_null: Option<String>,

    /// Add up this field (non-negative whole numbers) instead of counting records
    #[arg(long, value_name = "FIELD")]
    pub sum: Option<String>,

    /// Only analyze records where this field holds a non-null value
    #[arg(long, value_name = "FIELD")]
    pub only_present: Option<String>,

    /// Category label for null values (overrides the configuration file)
    #[arg(long)]
    pub null_label: Option<String>,

    /// Column whose share of each row total is printed
    #[arg(long, value_name = "COLUMN")]
    pub percent: Option<String>,

    /// Also test these two rows against each other
    #[arg(long, value_name = "ROW,ROW")]
    pub compare: Option<LabelPair>,

    /// Also test every pair of rows
    #[arg(long)]
    pub pairwise: bool,

    /// Fail instead of excluding records with missing fields
    #[arg(long)]
    pub strict: bool,

    /// Write a JSON report to this path ("-" for stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub config: ConfigArg,
}

/// Two comma-separated labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LabelPair(pub String, pub String);

impl FromStr for LabelPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split(',').map(str::trim).collect::<Vec<_>>()[..] {
            [first, second] if !first.is_empty() && !second.is_empty() => {
                Ok(LabelPair(first.to_owned(), second.to_owned()))
            }
            _ => Err(format!("expected two comma-separated labels, got '{s}'")),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnalysisOutput<'a> {
    report: &'a AssociationReport,
    comparison: Option<&'a PairwiseComparison>,
    pairwise: Vec<&'a PairwiseComparison>,
}

fn grouping_key(
    field: &str,
    presence: Option<&LabelPair>,
    null_label: &str,
) -> Box<dyn GroupingKey> {
    match presence {
        Some(LabelPair(present, absent)) => {
            Box::new(PresenceKey::new(field, field).labels(present.as_str(), absent.as_str()))
        }
        None => Box::new(FieldKey::new(field).null_label(null_label)),
    }
}

fn tally(arg: &AnalyzeArg) -> Tally {
    match (&arg.count_distinct, &arg.count_non_null, &arg.sum) {
        (Some(field), _, _) => Tally::Distinct {
            field: field.clone(),
        },
        (None, Some(field), _) => Tally::NonNull {
            field: field.clone(),
        },
        (None, None, Some(field)) => Tally::Sum {
            field: field.clone(),
        },
        (None, None, None) => Tally::Records,
    }
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let config = arg.config.resolve()?;
    let null_label = arg.null_label.as_deref().unwrap_or(&config.null_label);
    let analyzer = AssociationAnalyzer::new(&config)?.strict(arg.strict);

    let mut observations = util::read_observations(&arg.data, arg.format)?;
    if let Some(field) = &arg.only_present {
        observations = observations.filter(|r| r.get(field).is_some_and(|v| !v.is_null()));
        eprintln!("Kept {} observations with '{field}'", observations.len());
    }
    let row_key = grouping_key(&arg.rows, arg.rows_presence.as_ref(), null_label);
    let column_key = grouping_key(&arg.columns, arg.columns_presence.as_ref(), null_label);

    eprintln!("Building frequency table...");
    let report = analyzer
        .analyze(&observations, &row_key, &column_key, &tally(arg))
        .with_context(|| format!("Failed to analyze {} against {}", arg.rows, arg.columns))?;

    println!("Association Analysis: {} vs {}", arg.rows, arg.columns);
    println!("==========================================\n");

    println!("Frequency table:");
    report::print_frequency_table(report.frequencies());
    println!();

    let table = report.contingency();
    let percent_label = arg
        .percent
        .as_deref()
        .or(arg.columns_presence.as_ref().map(|pair| pair.0.as_str()));
    let percent_column = match percent_label {
        Some(label) => Some(
            table
                .column_index(label)
                .with_context(|| format!("'{label}' is not a column of the table"))?,
        ),
        None => None,
    };
    println!("Contingency table:");
    report::print_contingency_table(table, &arg.rows, percent_column);
    println!();

    println!("Expected frequencies:");
    report::print_expected(table, report.outcome());
    println!();

    println!("Chi-squared test of independence:");
    report::print_outcome(report.outcome());

    let comparison = match &arg.compare {
        Some(LabelPair(first, second)) => {
            let comparison = analyzer.compare_rows(table, first, second)?;
            println!();
            println!("Comparison: {first} vs {second}");
            report::print_contingency_table(&comparison.table, &arg.rows, percent_column);
            report::print_outcome(&comparison.outcome);
            Some(comparison)
        }
        None => None,
    };

    let pairs = if arg.pairwise {
        analyzer.pairwise_rows(table)
    } else {
        vec![]
    };
    if arg.pairwise {
        println!();
        println!("Pairwise comparisons:");
        for pair in &pairs {
            match &pair.comparison {
                Ok(comparison) => println!(
                    "  {} vs {}: p = {:.6} ({})",
                    pair.first,
                    pair.second,
                    comparison.outcome.result().p_value(),
                    if comparison.outcome.is_significant() {
                        "significant"
                    } else {
                        "not significant"
                    },
                ),
                Err(err) => println!("  {} vs {}: not testable: {err}", pair.first, pair.second),
            }
        }
    }

    if let Some(output) = &arg.output {
        let json = AnalysisOutput {
            report: &report,
            comparison: comparison.as_ref(),
            pairwise: pairs
                .iter()
                .filter_map(|pair| pair.comparison.as_ref().ok())
                .collect(),
        };
        Output::save_json(&json, Output::path_arg(output))?;
    }

    Ok(())
}
