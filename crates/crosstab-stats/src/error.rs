//! Error types for table validation and parameter ranges.

/// A contingency table that cannot be tested or constructed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidTableError {
    #[display("contingency table must be at least 2x2, got {rows}x{columns}")]
    TooSmall { rows: usize, columns: usize },
    #[display("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("expected {expected} {axis} labels, got {found}")]
    LabelCount {
        axis: &'static str,
        expected: usize,
        found: usize,
    },
    #[display("table counts add up to more than a 64-bit count can hold")]
    TotalOverflow,
    #[display("row '{label}' has a zero total")]
    ZeroRowTotal { label: String },
    #[display("column '{label}' has a zero total")]
    ZeroColumnTotal { label: String },
}

/// A parameter outside of its admissible range.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DomainRangeError {
    #[display("significance level must lie strictly between 0 and 1, got {value}")]
    SignificanceLevel { value: f64 },
    #[display("power must lie strictly between 0 and 1, got {value}")]
    Power { value: f64 },
    #[display("baseline rate must lie strictly between 0 and 1, got {value}")]
    BaselineRate { value: f64 },
    #[display("minimum detectable effect {value} does not give a target rate inside (0, 1)")]
    MinimumDetectableEffect { value: f64 },
    #[display("count at row {row}, column {column} is negative ({value})")]
    NegativeCount { row: usize, column: usize, value: i64 },
}

/// Any failure raised by this crate.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    #[display("{_0}")]
    InvalidTable(InvalidTableError),
    #[display("{_0}")]
    DomainRange(DomainRangeError),
    #[display("failed to construct {distribution} distribution: {message}")]
    Distribution {
        distribution: &'static str,
        message: String,
    },
}

impl From<InvalidTableError> for StatsError {
    fn from(err: InvalidTableError) -> Self {
        StatsError::InvalidTable(err)
    }
}

impl From<DomainRangeError> for StatsError {
    fn from(err: DomainRangeError) -> Self {
        StatsError::DomainRange(err)
    }
}
