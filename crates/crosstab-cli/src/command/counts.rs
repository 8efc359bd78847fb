use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use crosstab_analysis::{
    frequency::{CategoryCounts, Tally},
    grouping::FieldKey,
};

use crate::{
    report,
    util::{self, ConfigArg, InputFormat, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct CountsArg {
    /// Observation file (CSV with a header row, or a JSON array of objects)
    pub data: PathBuf,

    /// Input format (csv or json); guessed from the extension by default
    #[arg(long)]
    pub format: Option<InputFormat>,

    /// Field to count categories of
    #[arg(long)]
    pub key: String,

    /// Count distinct non-null values of this field instead of records
    #[arg(long, value_name = "FIELD", conflicts_with = "sum")]
    pub count_distinct: Option<String>,

    /// Add up this field (non-negative whole numbers) instead of counting records
    #[arg(long, value_name = "FIELD")]
    pub sum: Option<String>,

    /// Category label for null values (overrides the configuration file)
    #[arg(long)]
    pub null_label: Option<String>,

    /// Write the counts as JSON to this path ("-" for stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub config: ConfigArg,
}

pub(crate) fn run(arg: &CountsArg) -> anyhow::Result<()> {
    let config = arg.config.resolve()?;
    let null_label = arg.null_label.as_deref().unwrap_or(&config.null_label);
    let observations = util::read_observations(&arg.data, arg.format)?;

    let key = FieldKey::new(arg.key.as_str()).null_label(null_label);
    let tally = match (&arg.count_distinct, &arg.sum) {
        (Some(field), _) => Tally::Distinct {
            field: field.clone(),
        },
        (None, Some(field)) => Tally::Sum {
            field: field.clone(),
        },
        (None, None) => Tally::Records,
    };
    let counts = CategoryCounts::build(&observations, &key, &tally)
        .with_context(|| format!("Failed to count {} categories", arg.key))?
        .sort_by_count();

    println!("Category counts: {}", arg.key);
    println!("==========================================\n");
    report::print_category_counts(&counts);

    if let Some(output) = &arg.output {
        Output::save_json(&counts, Output::path_arg(output))?;
    }
    Ok(())
}
