use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use crosstab_analysis::association::AssociationAnalyzer;
use crosstab_stats::{chi_squared::ChiSquaredOutcome, contingency::ContingencyTable};
use serde::Serialize;

use crate::{
    report,
    util::{ConfigArg, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct TestTableArg {
    /// Table counts: cells separated by ',' and rows by ';' (e.g. "30,146;75,413")
    #[arg(long, value_parser = parse_table)]
    pub table: Table,

    /// Row labels (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub row_labels: Vec<String>,

    /// Column labels (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub column_labels: Vec<String>,

    /// Write the outcome as JSON to this path ("-" for stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub config: ConfigArg,
}

/// Signed literal counts, row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Table(Vec<Vec<i64>>);

#[derive(Debug, Serialize)]
struct TestOutput<'a> {
    table: &'a ContingencyTable,
    outcome: &'a ChiSquaredOutcome,
}

fn parse_table(s: &str) -> Result<Table, String> {
    s.split(';')
        .map(|row| {
            row.split(',')
                .map(|cell| {
                    let cell = cell.trim();
                    cell.parse::<i64>()
                        .map_err(|e| format!("invalid count '{cell}': {e}"))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Table)
}

pub(crate) fn run(arg: &TestTableArg) -> anyhow::Result<()> {
    let config = arg.config.resolve()?;
    let analyzer = AssociationAnalyzer::new(&config)?;

    let mut table = ContingencyTable::from_rows(&arg.table.0).context("Invalid table")?;
    if !arg.row_labels.is_empty() || !arg.column_labels.is_empty() {
        let row_labels = if arg.row_labels.is_empty() {
            table.row_labels().to_vec()
        } else {
            arg.row_labels.clone()
        };
        let column_labels = if arg.column_labels.is_empty() {
            table.column_labels().to_vec()
        } else {
            arg.column_labels.clone()
        };
        table = table
            .relabel(row_labels, column_labels)
            .context("Invalid table labels")?;
    }

    let outcome = analyzer.test_table(&table).context("Failed to test table")?;

    println!("Contingency table:");
    report::print_contingency_table(&table, "", None);
    println!();
    println!("Expected frequencies:");
    report::print_expected(&table, &outcome);
    println!();
    println!("Chi-squared test of independence:");
    report::print_outcome(&outcome);

    if let Some(output) = &arg.output {
        Output::save_json(
            &TestOutput {
                table: &table,
                outcome: &outcome,
            },
            Output::path_arg(output),
        )?;
    }
    Ok(())
}
