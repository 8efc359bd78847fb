use clap::{Parser, Subcommand};

use self::{
    analyze::AnalyzeArg, counts::CountsArg, sample_size::SampleSizeArg, test_table::TestTableArg,
};

mod analyze;
mod counts;
mod sample_size;
mod test_table;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Cross-tabulate two variables of an observation file and test their association
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Count observations per category of one variable
    Counts(#[clap(flatten)] CountsArg),
    /// Test a literal contingency table
    #[command(name = "test")]
    TestTable(#[clap(flatten)] TestTableArg),
    /// Estimate the sample size needed to detect a change in a proportion
    SampleSize(#[clap(flatten)] SampleSizeArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Counts(arg) => counts::run(&arg)?,
        Mode::TestTable(arg) => test_table::run(&arg)?,
        Mode::SampleSize(arg) => sample_size::run(&arg)?,
    }
    Ok(())
}
