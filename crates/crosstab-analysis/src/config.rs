//! Analyzer configuration
//!
//! Loaded from JSON; every field is optional and falls back to the default.
//!
//! ```
//! use crosstab_analysis::config::AnalyzerConfig;
//!
//! let config: AnalyzerConfig = serde_json::from_str(r#"{"significance_level": 0.05}"#).unwrap();
//! assert_eq!(config.significance_level, 0.05);
//! assert!(config.yates_correction);
//! assert_eq!(config.power, 0.80);
//! ```

use crosstab_stats::{
    chi_squared::ChiSquaredTest,
    error::DomainRangeError,
    sample_size::{DEFAULT_POWER, PowerAnalysis},
    significance::SignificanceLevel,
};
use serde::{Deserialize, Serialize};

use crate::grouping::DEFAULT_NULL_LABEL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Threshold below which a p-value is significant.
    pub significance_level: f64,
    /// Apply Yates' continuity correction to 2x2 tables.
    pub yates_correction: bool,
    /// Power used for sample size estimates.
    pub power: f64,
    /// Category label for null field values.
    pub null_label: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            significance_level: SignificanceLevel::DEFAULT.value(),
            yates_correction: true,
            power: DEFAULT_POWER,
            null_label: DEFAULT_NULL_LABEL.to_owned(),
        }
    }
}

impl AnalyzerConfig {
    pub fn significance_level(&self) -> Result<SignificanceLevel, DomainRangeError> {
        SignificanceLevel::new(self.significance_level)
    }

    /// The chi-squared test described by this configuration.
    pub fn chi_squared_test(&self) -> Result<ChiSquaredTest, DomainRangeError> {
        Ok(ChiSquaredTest::new(self.significance_level()?).yates_correction(self.yates_correction))
    }

    /// The power analysis described by this configuration.
    pub fn power_analysis(&self) -> Result<PowerAnalysis, DomainRangeError> {
        PowerAnalysis::new(self.significance_level()?, self.power)
    }
}
