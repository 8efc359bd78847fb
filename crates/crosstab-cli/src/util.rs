use std::{
    collections::HashSet,
    fs::File,
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use crosstab_analysis::{
    config::AnalyzerConfig,
    record::{ObservationSet, Record},
    value::Value,
};

/// Destination of a JSON report.
#[derive(Debug)]
pub enum Output {
    Stdout(io::StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `output_path`, or stdout if `None`.
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => Output::create(path)?,
            None => Output::Stdout(io::stdout().lock()),
        };
        output.write_json(value)?;
        if let Output::File { path, .. } = &output {
            eprintln!("Report saved to {}", path.display());
        }
        Ok(())
    }

    /// Resolves an `--output` argument, where `-` stands for stdout.
    pub fn path_arg(output: &Path) -> Option<&Path> {
        (output.as_os_str() != "-").then_some(output)
    }

    fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    fn display_path(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self)
            .and_then(|()| self.flush())
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(writer) => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(writer) => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;
    let value = serde_json::from_reader(io::BufReader::new(file)).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;
    Ok(value)
}

/// Layout of an observation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum InputFormat {
    /// Comma-separated values with a header row
    Csv,
    /// JSON array of flat objects
    Json,
}

impl InputFormat {
    /// Guesses the format from the file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

/// Reads an observation set from `path`.
pub fn read_observations(path: &Path, format: Option<InputFormat>) -> anyhow::Result<ObservationSet> {
    let format = format.unwrap_or_else(|| InputFormat::from_path(path));
    eprintln!("Loading observations from {}...", path.display());
    let observations = match format {
        InputFormat::Json => read_json_file("observation", path)?,
        InputFormat::Csv => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open observation file: {}", path.display()))?;
            read_csv_observations(io::BufReader::new(file))
                .with_context(|| format!("Failed to parse CSV file: {}", path.display()))?
        }
    };
    eprintln!("Loaded {} observations", observations.len());
    Ok(observations)
}

/// Reads CSV rows into records keyed by the header row.
///
/// Cells are parsed with [`Value::parse`]. A row shorter than the header
/// lacks the trailing fields altogether. Repeated header names and rows longer
/// than the header are errors.
pub fn read_csv_observations<R>(reader: R) -> anyhow::Result<ObservationSet>
where
    R: io::Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let mut seen = HashSet::new();
    if let Some(field) = headers.iter().find(|field| !seen.insert(*field)) {
        bail!("CSV header repeats the field '{field}'");
    }

    let mut observations = ObservationSet::default();
    for (line, result) in rdr.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read CSV row {}", line + 1))?;
        if row.len() > headers.len() {
            bail!(
                "CSV row {} has {} cells, but the header names only {} fields",
                line + 1,
                row.len(),
                headers.len()
            );
        }
        let record = headers
            .iter()
            .zip(row.iter())
            .map(|(field, cell)| (field, Value::parse(cell)))
            .collect::<Record>();
        observations.push(record);
    }
    Ok(observations)
}

/// Analyzer settings shared by every subcommand.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// JSON analyzer configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Significance level (overrides the configuration file)
    #[arg(long)]
    pub significance_level: Option<f64>,
    /// Disable Yates' continuity correction for 2x2 tables
    #[arg(long)]
    pub no_yates: bool,
}

impl ConfigArg {
    /// Loads the configuration file (if any) and applies command-line overrides.
    pub fn resolve(&self) -> anyhow::Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => read_json_file("configuration", path)?,
            None => AnalyzerConfig::default(),
        };
        if let Some(level) = self.significance_level {
            config.significance_level = level;
        }
        if self.no_yates {
            config.yates_correction = false;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_observations() {
        let csv = "\
first_name,fitness_test_date,application_date
Kim,2017-07-03,
Tom,,7-5-17
Ann,2017-07-04
";
        let observations = read_csv_observations(csv.as_bytes()).unwrap();
        assert_eq!(observations.len(), 3);
        let records = observations.records();
        assert_eq!(records[0].get("first_name"), Some(&Value::from("Kim")));
        assert!(records[0].get("application_date").unwrap().is_null());
        assert!(records[1].get("fitness_test_date").unwrap().is_null());
        assert!(matches!(records[1].get("application_date"), Some(Value::Date(_))));
        assert!(!records[2].contains("application_date"));
    }

    #[test]
    fn test_read_csv_rejects_long_rows() {
        let csv = "\
park_name,observations
Bryce National Park,109
Yellowstone National Park,219,288
";
        let err = read_csv_observations(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");
    }

    #[test]
    fn test_read_csv_rejects_repeated_headers() {
        let csv = "\
park_name,observations,observations
Bryce National Park,109,110
";
        let err = read_csv_observations(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("'observations'"), "{err}");
    }

    #[test]
    fn test_output_path_arg() {
        assert_eq!(Output::path_arg(Path::new("-")), None);
        assert_eq!(
            Output::path_arg(Path::new("report.json")),
            Some(Path::new("report.json"))
        );
    }

    #[test]
    fn test_input_format_from_path() {
        assert_eq!(InputFormat::from_path(Path::new("visits.JSON")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("species_info.csv")), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("observations")), InputFormat::Csv);
    }

    #[test]
    fn test_config_overrides() {
        let arg = ConfigArg {
            config: None,
            significance_level: Some(0.05),
            no_yates: true,
        };
        let config = arg.resolve().unwrap();
        assert_eq!(config.significance_level, 0.05);
        assert!(!config.yates_correction);
        assert_eq!(ConfigArg::default().resolve().unwrap(), AnalyzerConfig::default());
    }
}
