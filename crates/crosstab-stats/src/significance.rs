use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainRangeError;

/// The probability threshold below which a p-value is deemed significant.
///
/// Always lies strictly between 0 and 1. The default of 0.10 corresponds to
/// 90% confidence.
///
/// # Examples
///
/// ```
/// use crosstab_stats::significance::SignificanceLevel;
///
/// let alpha = SignificanceLevel::new(0.05).unwrap();
/// assert!(alpha.is_significant(0.01));
/// assert!(!alpha.is_significant(0.05));
/// assert!((alpha.confidence() - 0.95).abs() < 1e-12);
///
/// assert!(SignificanceLevel::new(1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SignificanceLevel(f64);

impl SignificanceLevel {
    /// 90% confidence.
    pub const DEFAULT: Self = Self(0.10);

    pub fn new(alpha: f64) -> Result<Self, DomainRangeError> {
        if alpha > 0.0 && alpha < 1.0 {
            Ok(Self(alpha))
        } else {
            Err(DomainRangeError::SignificanceLevel { value: alpha })
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// The matching confidence level, `1 - alpha`.
    #[must_use]
    pub fn confidence(self) -> f64 {
        1.0 - self.0
    }

    /// Returns `true` when `p_value` falls strictly below this level.
    #[must_use]
    pub fn is_significant(self, p_value: f64) -> bool {
        p_value < self.0
    }
}

impl Default for SignificanceLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for SignificanceLevel {
    type Error = DomainRangeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SignificanceLevel> for f64 {
    fn from(level: SignificanceLevel) -> Self {
        level.0
    }
}

impl fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
