use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use crosstab_stats::sample_size::{EffectDirection, relative_effect};

use crate::{
    report,
    util::{ConfigArg, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SampleSizeArg {
    /// Baseline conversion rate, as a fraction (e.g. 0.15)
    #[arg(long)]
    pub baseline: f64,

    /// Minimum detectable effect as a fraction of the baseline (e.g. 0.333)
    #[arg(long, required_unless_present = "absolute_difference")]
    pub mde: Option<f64>,

    /// Minimum detectable effect as a difference in rates (e.g. 0.05)
    #[arg(long, conflicts_with = "mde")]
    pub absolute_difference: Option<f64>,

    /// Detect a decrease from the baseline instead of an increase
    #[arg(long)]
    pub decrease: bool,

    /// Statistical power (overrides the configuration file)
    #[arg(long)]
    pub power: Option<f64>,

    /// Observations per period (e.g. weekly visitors); reports periods needed
    #[arg(long)]
    pub per_period: Option<f64>,

    /// Write the estimate as JSON to this path ("-" for stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub config: ConfigArg,
}

pub(crate) fn run(arg: &SampleSizeArg) -> anyhow::Result<()> {
    let mut config = arg.config.resolve()?;
    if let Some(power) = arg.power {
        config.power = power;
    }
    let direction = if arg.decrease {
        EffectDirection::Decrease
    } else {
        EffectDirection::Increase
    };
    let analysis = config
        .power_analysis()
        .context("Invalid power analysis settings")?
        .direction(direction);

    let effect_fraction = match (arg.mde, arg.absolute_difference) {
        (Some(fraction), _) => fraction,
        (None, Some(difference)) => relative_effect(arg.baseline, difference),
        (None, None) => anyhow::bail!("either --mde or --absolute-difference is required"),
    };
    let estimate = analysis
        .sample_size(arg.baseline, effect_fraction)
        .context("Failed to compute sample size")?;

    println!("Sample size estimate");
    println!("==========================================\n");
    report::print_sample_size(&estimate, arg.per_period);

    if let Some(output) = &arg.output {
        Output::save_json(&estimate, Output::path_arg(output))?;
    }
    Ok(())
}
