use crosstab_stats::error::StatsError;

/// A record lacks a field that a grouping key or tally needs.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("field '{field}' is missing from the record")]
pub struct MissingFieldError {
    pub field: String,
}

/// A tallied field holds a value that cannot be added up.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("field '{field}' holds '{value}', which is not a non-negative whole number")]
pub struct InvalidValueError {
    pub field: String,
    pub value: String,
}

/// Failure of an analysis step.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    #[display("{_0}")]
    MissingField(MissingFieldError),
    #[display("{_0}")]
    InvalidValue(InvalidValueError),
    #[display("{_0}")]
    Stats(StatsError),
    #[display("'{label}' is not a {axis} category of the table")]
    UnknownCategory { axis: &'static str, label: String },
}

impl From<MissingFieldError> for AnalysisError {
    fn from(err: MissingFieldError) -> Self {
        AnalysisError::MissingField(err)
    }
}

impl From<InvalidValueError> for AnalysisError {
    fn from(err: InvalidValueError) -> Self {
        AnalysisError::InvalidValue(err)
    }
}

impl From<StatsError> for AnalysisError {
    fn from(err: StatsError) -> Self {
        AnalysisError::Stats(err)
    }
}
