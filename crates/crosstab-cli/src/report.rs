//! Tabular report display
//!
//! Frequency tables, contingency tables and test outcomes printed to stdout
//! in a fixed-width layout.

use crosstab_analysis::frequency::{CategoryCounts, Exclusions, FrequencyTable};
use crosstab_stats::{
    chi_squared::ChiSquaredOutcome, contingency::ContingencyTable,
    sample_size::SampleSizeEstimate,
};

const MIN_LABEL_WIDTH: usize = 16;
const COUNT_WIDTH: usize = 12;

fn label_width<'a, I>(labels: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    labels
        .into_iter()
        .map(str::len)
        .max()
        .unwrap_or(0)
        .max(MIN_LABEL_WIDTH)
}

fn print_separator(width: usize) {
    println!("  {}", "-".repeat(width));
}

/// Print frequency table in long format (one line per observed combination)
pub(crate) fn print_frequency_table(table: &FrequencyTable) {
    let row_width = label_width(
        table
            .row_categories()
            .iter()
            .map(String::as_str)
            .chain([table.row_key()]),
    );
    let column_width = label_width(
        table
            .column_categories()
            .iter()
            .map(String::as_str)
            .chain([table.column_key()]),
    );
    println!(
        "  {:<row_width$} {:<column_width$} {:>COUNT_WIDTH$}",
        table.row_key(),
        table.column_key(),
        "Count",
    );
    print_separator(row_width + column_width + COUNT_WIDTH + 2);
    for cell in table.cells() {
        println!(
            "  {:<row_width$} {:<column_width$} {:>COUNT_WIDTH$}",
            cell.row, cell.column, cell.count,
        );
    }
    print_exclusions(table.excluded());
}

/// Print records dropped for missing fields, if any
pub(crate) fn print_exclusions(excluded: &Exclusions) {
    if excluded.is_empty() {
        return;
    }
    println!("  Excluded records: {}", excluded.total());
    for (field, count) in excluded.by_field() {
        println!("    missing '{field}': {count}");
    }
}

/// Print contingency table with totals and, optionally, the row share of one column
pub(crate) fn print_contingency_table(
    table: &ContingencyTable,
    row_axis: &str,
    proportion_column: Option<usize>,
) {
    let row_width = label_width(
        table
            .row_labels()
            .iter()
            .map(String::as_str)
            .chain([row_axis, "Total"]),
    );
    let column_width = table
        .column_labels()
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(COUNT_WIDTH);

    let mut header = format!("  {row_axis:<row_width$}");
    for label in table.column_labels() {
        header.push_str(&format!(" {label:>column_width$}"));
    }
    header.push_str(&format!(" {:>COUNT_WIDTH$}", "Total"));
    let proportion_header = proportion_column.map(|j| format!("% {}", table.column_labels()[j]));
    if let Some(title) = &proportion_header {
        header.push_str(&format!(" {title:>COUNT_WIDTH$}"));
    }
    println!("{header}");

    let extra = usize::from(proportion_header.is_some()) * (COUNT_WIDTH + 1);
    print_separator(row_width + (table.columns() + 1) * (column_width + 1) + extra);

    let proportions = proportion_column.map(|j| table.row_proportions(j));
    for (i, ((label, counts), total)) in table
        .iter_rows()
        .zip(table.row_totals())
        .enumerate()
    {
        let mut line = format!("  {label:<row_width$}");
        for count in counts {
            line.push_str(&format!(" {count:>column_width$}"));
        }
        line.push_str(&format!(" {total:>COUNT_WIDTH$}"));
        if let Some(proportions) = &proportions {
            let share = proportions[i].map_or("N/A".to_owned(), |p| format!("{:.2}%", p * 100.0));
            line.push_str(&format!(" {share:>COUNT_WIDTH$}"));
        }
        println!("{line}");
    }

    let mut footer = format!("  {:<row_width$}", "Total");
    for total in table.column_totals() {
        footer.push_str(&format!(" {total:>column_width$}"));
    }
    footer.push_str(&format!(" {:>COUNT_WIDTH$}", table.grand_total()));
    println!("{footer}");
}

/// Print expected frequencies under independence
pub(crate) fn print_expected(table: &ContingencyTable, outcome: &ChiSquaredOutcome) {
    let row_width = label_width(table.row_labels().iter().map(String::as_str));
    let mut header = format!("  {:<row_width$}", "");
    for label in table.column_labels() {
        header.push_str(&format!(" {label:>COUNT_WIDTH$}"));
    }
    println!("{header}");
    for (label, expected) in table.row_labels().iter().zip(outcome.result().expected()) {
        let mut line = format!("  {label:<row_width$}");
        for value in expected {
            line.push_str(&format!(" {value:>COUNT_WIDTH$.2}"));
        }
        println!("{line}");
    }
}

/// Print chi-squared statistic, p-value and verdict
pub(crate) fn print_outcome(outcome: &ChiSquaredOutcome) {
    let result = outcome.result();
    println!("  Chi-squared statistic : {:.4}", result.statistic());
    println!("  Degrees of freedom    : {}", result.degrees_of_freedom());
    println!("  p-value               : {:.6}", result.p_value());
    println!(
        "  Yates correction      : {}",
        if outcome.yates_corrected() { "applied" } else { "not applied" }
    );
    let verdict = if outcome.is_significant() {
        "significant"
    } else {
        "not significant"
    };
    println!(
        "  Verdict               : {verdict} at alpha = {} ({:.0}% confidence)",
        outcome.significance_level(),
        outcome.significance_level().confidence() * 100.0,
    );
}

/// Print one-way category counts with their share of the total
pub(crate) fn print_category_counts(counts: &CategoryCounts) {
    let width = label_width(
        counts
            .entries()
            .iter()
            .map(|(category, _)| category.as_str())
            .chain([counts.key()]),
    );
    println!(
        "  {:<width$} {:>COUNT_WIDTH$} {:>COUNT_WIDTH$}",
        counts.key(),
        "Count",
        "Share",
    );
    print_separator(width + 2 * (COUNT_WIDTH + 1));
    for ((category, count), (_, share)) in counts.entries().iter().zip(counts.proportions()) {
        println!(
            "  {category:<width$} {count:>COUNT_WIDTH$} {:>COUNT_WIDTH$}",
            format!("{:.2}%", share * 100.0),
        );
    }
    print_separator(width + 2 * (COUNT_WIDTH + 1));
    println!("  {:<width$} {:>COUNT_WIDTH$}", "Total", counts.total());
    print_exclusions(counts.excluded());
}

/// Print a sample size estimate
pub(crate) fn print_sample_size(estimate: &SampleSizeEstimate, per_period: Option<f64>) {
    println!("  Baseline rate          : {:.2}%", estimate.baseline_rate * 100.0);
    println!("  Target rate            : {:.2}%", estimate.target_rate * 100.0);
    println!(
        "  Minimum detectable     : {:.2}% of baseline ({:.2} points)",
        estimate.effect_fraction * 100.0,
        estimate.absolute_difference * 100.0,
    );
    println!("  Significance level     : {}", estimate.significance_level);
    println!("  Power                  : {:.0}%", estimate.power * 100.0);
    println!("  Sample size per group  : {}", estimate.per_group());
    if let Some(per_period) = per_period {
        let periods = estimate.observation_periods(per_period);
        if periods.is_finite() {
            println!(
                "  Periods needed         : {periods:.2} (at {per_period} observations per period)"
            );
        } else {
            println!("  Periods needed         : never (no observations per period)");
        }
    }
}
