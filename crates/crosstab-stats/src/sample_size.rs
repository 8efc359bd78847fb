//! Sample sizing for comparing two proportions
//!
//! Answers "how many observations per group are needed to detect a change
//! from a baseline rate?" using the standard normal-approximation formula for
//! a two-sided test of two proportions:
//!
//! ```text
//! n = (z(1 - α/2) · √(2·p̄·(1 - p̄)) + z(power) · √(p1·(1 - p1) + p2·(1 - p2)))² / (p2 - p1)²
//! p̄ = (p1 + p2) / 2
//! ```
//!
//! The minimum detectable effect is expressed as a fraction of the baseline:
//! detecting a drop from 15% to 10% is an effect of `0.05 / 0.15 = 1/3`.
//! [`minimum_sample_size`] sizes such a drop; [`PowerAnalysis`] takes the
//! direction explicitly.
//!
//! Power is an explicit input. [`DEFAULT_POWER`] (80%) and the default 90%
//! confidence are conventions, not derived values; online calculators may
//! use other approximations and produce different figures.
//!
//! # Examples
//!
//! ```
//! use crosstab_stats::sample_size::{minimum_sample_size, relative_effect};
//!
//! let mde = relative_effect(0.15, 0.05);
//! let estimate = minimum_sample_size(0.15, mde, 0.10).unwrap();
//! assert!((estimate.target_rate - 0.10).abs() < 1e-12);
//! assert!(estimate.per_group() > 500);
//!
//! // Weeks of observation at 250 sheep per week
//! let weeks = estimate.observation_periods(250.0);
//! assert!(weeks > 2.0);
//! ```

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::{
    error::{DomainRangeError, StatsError},
    significance::SignificanceLevel,
};

/// Conventional statistical power (probability of detecting a true effect).
pub const DEFAULT_POWER: f64 = 0.80;

/// Whether the effect to detect raises or lowers the baseline rate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectDirection {
    #[default]
    Increase,
    Decrease,
}

/// Parameters of a two-proportion power analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerAnalysis {
    significance_level: SignificanceLevel,
    power: f64,
    direction: EffectDirection,
}

impl Default for PowerAnalysis {
    fn default() -> Self {
        Self {
            significance_level: SignificanceLevel::DEFAULT,
            power: DEFAULT_POWER,
            direction: EffectDirection::Increase,
        }
    }
}

impl PowerAnalysis {
    /// # Errors
    ///
    /// Returns [`DomainRangeError::Power`] unless `0 < power < 1`.
    pub fn new(significance_level: SignificanceLevel, power: f64) -> Result<Self, DomainRangeError> {
        if !(power > 0.0 && power < 1.0) {
            return Err(DomainRangeError::Power { value: power });
        }
        Ok(Self {
            significance_level,
            power,
            direction: EffectDirection::Increase,
        })
    }

    #[must_use]
    pub fn direction(self, direction: EffectDirection) -> Self {
        Self { direction, ..self }
    }

    /// Per-group sample size needed to detect `effect_fraction` of `baseline_rate`.
    ///
    /// # Errors
    ///
    /// * [`DomainRangeError::BaselineRate`] unless `0 < baseline_rate < 1`
    /// * [`DomainRangeError::MinimumDetectableEffect`] if the effect is not
    ///   positive or moves the target rate outside (0, 1)
    pub fn sample_size(
        &self,
        baseline_rate: f64,
        effect_fraction: f64,
    ) -> Result<SampleSizeEstimate, StatsError> {
        if !(baseline_rate > 0.0 && baseline_rate < 1.0) {
            return Err(DomainRangeError::BaselineRate {
                value: baseline_rate,
            }
            .into());
        }
        let target_rate = match self.direction {
            EffectDirection::Increase => baseline_rate * (1.0 + effect_fraction),
            EffectDirection::Decrease => baseline_rate * (1.0 - effect_fraction),
        };
        if !(effect_fraction > 0.0 && target_rate > 0.0 && target_rate < 1.0) {
            return Err(DomainRangeError::MinimumDetectableEffect {
                value: effect_fraction,
            }
            .into());
        }

        let z_alpha = standard_normal_quantile(1.0 - self.significance_level.value() / 2.0)?;
        let z_power = standard_normal_quantile(self.power)?;

        let p1 = baseline_rate;
        let p2 = target_rate;
        let pooled = (p1 + p2) / 2.0;
        let delta = p2 - p1;
        let numerator = z_alpha * (2.0 * pooled * (1.0 - pooled)).sqrt()
            + z_power * (p1 * (1.0 - p1) + p2 * (1.0 - p2)).sqrt();

        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let per_group = (numerator.powi(2) / delta.powi(2)).ceil() as u64;

        Ok(SampleSizeEstimate {
            baseline_rate,
            target_rate,
            effect_fraction,
            absolute_difference: delta.abs(),
            significance_level: self.significance_level,
            power: self.power,
            per_group,
        })
    }
}

/// The outcome of a sample size calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSizeEstimate {
    pub baseline_rate: f64,
    pub target_rate: f64,
    /// Minimum detectable effect as a fraction of the baseline rate.
    pub effect_fraction: f64,
    /// Minimum detectable effect in rate units (percentage points / 100).
    pub absolute_difference: f64,
    pub significance_level: SignificanceLevel,
    pub power: f64,
    per_group: u64,
}

impl SampleSizeEstimate {
    /// Observations needed in each group.
    #[must_use]
    pub fn per_group(&self) -> u64 {
        self.per_group
    }

    /// Number of observation periods needed to collect [`Self::per_group`]
    /// observations at `observations_per_period` per period.
    ///
    /// Returns infinity when nothing is observed per period.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn observation_periods(&self, observations_per_period: f64) -> f64 {
        if observations_per_period <= 0.0 {
            return f64::INFINITY;
        }
        self.per_group as f64 / observations_per_period
    }
}

/// Converts an absolute difference in rates into a fraction of the baseline.
///
/// `relative_effect(0.15, 0.05)` is one third: a 5 point change on a 15%
/// baseline.
#[must_use]
pub fn relative_effect(baseline_rate: f64, absolute_difference: f64) -> f64 {
    absolute_difference / baseline_rate
}

/// Per-group sample size at [`DEFAULT_POWER`] for a reduction of
/// `effect_fraction` from `baseline_rate`, as when checking that a
/// treatment lowers a disease rate.
///
/// Use [`PowerAnalysis`] for other powers or for detecting an increase.
///
/// # Errors
///
/// Returns [`StatsError::DomainRange`] for out-of-range inputs.
pub fn minimum_sample_size(
    baseline_rate: f64,
    effect_fraction: f64,
    significance_level: f64,
) -> Result<SampleSizeEstimate, StatsError> {
    let level = SignificanceLevel::new(significance_level)?;
    PowerAnalysis::new(level, DEFAULT_POWER)?
        .direction(EffectDirection::Decrease)
        .sample_size(baseline_rate, effect_fraction)
}

fn standard_normal_quantile(p: f64) -> Result<f64, StatsError> {
    let normal = Normal::new(0.0, 1.0).map_err(|err| StatsError::Distribution {
        distribution: "normal",
        message: err.to_string(),
    })?;
    Ok(normal.inverse_cdf(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decreasing_in_effect_size() {
        let estimates = [0.1, 0.2, 1.0 / 3.0, 0.5, 0.8]
            .iter()
            .map(|&mde| minimum_sample_size(0.15, mde, 0.10).unwrap())
            .collect::<Vec<_>>();
        for estimate in &estimates {
            assert!(estimate.target_rate < 0.15, "{estimate:?}");
        }
        let sizes = estimates
            .iter()
            .map(SampleSizeEstimate::per_group)
            .collect::<Vec<_>>();
        for pair in sizes.windows(2) {
            assert!(pair[0] > pair[1], "{sizes:?}");
        }
    }

    #[test]
    fn test_decreasing_in_effect_size_for_reductions() {
        let analysis = PowerAnalysis::default().direction(EffectDirection::Decrease);
        let sizes = [0.2, 1.0 / 3.0, 0.5]
            .iter()
            .map(|&mde| analysis.sample_size(0.10, mde).unwrap().per_group())
            .collect::<Vec<_>>();
        assert!(sizes[0] > sizes[1] && sizes[1] > sizes[2], "{sizes:?}");
    }

    #[test]
    fn test_known_value() {
        // 15% -> 10%, two-sided alpha 0.10, power 0.80: n ≈ 539.94
        let estimate = minimum_sample_size(0.15, relative_effect(0.15, 0.05), 0.10).unwrap();
        assert!((estimate.target_rate - 0.10).abs() < 1e-12, "{estimate:?}");
        assert!((estimate.absolute_difference - 0.05).abs() < 1e-12);
        assert!((537..=543).contains(&estimate.per_group()), "{estimate:?}");
    }

    #[test]
    fn test_known_value_for_increase() {
        // 15% -> 20%, two-sided alpha 0.10, power 0.80: n ≈ 713.04
        let estimate = PowerAnalysis::default().sample_size(0.15, 1.0 / 3.0).unwrap();
        assert!((710..=718).contains(&estimate.per_group()), "{estimate:?}");
        assert!((estimate.target_rate - 0.20).abs() < 1e-12);
        assert!((estimate.absolute_difference - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_stricter_settings_need_more_samples() {
        let loose = minimum_sample_size(0.15, 1.0 / 3.0, 0.10).unwrap();
        let strict = minimum_sample_size(0.15, 1.0 / 3.0, 0.01).unwrap();
        assert!(strict.per_group() > loose.per_group());

        let powerful = PowerAnalysis::new(SignificanceLevel::DEFAULT, 0.95)
            .unwrap()
            .direction(EffectDirection::Decrease)
            .sample_size(0.15, 1.0 / 3.0)
            .unwrap();
        assert!(powerful.per_group() > loose.per_group());
    }

    #[test]
    fn test_relative_effect() {
        assert!((relative_effect(0.15, 0.05) - 1.0 / 3.0).abs() < 1e-12);
        assert!((relative_effect(0.10, 0.05) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_observation_periods() {
        let estimate = minimum_sample_size(0.10, 0.5, 0.10).unwrap();
        #[expect(clippy::cast_precision_loss)]
        let expected = estimate.per_group() as f64 / 507.0;
        assert!((estimate.observation_periods(507.0) - expected).abs() < 1e-12);
        assert!(estimate.observation_periods(0.0).is_infinite());
    }

    #[test]
    fn test_rejects_out_of_range_inputs() {
        assert!(matches!(
            minimum_sample_size(0.0, 0.5, 0.10),
            Err(StatsError::DomainRange(DomainRangeError::BaselineRate { .. }))
        ));
        assert!(matches!(
            minimum_sample_size(0.15, 0.0, 0.10),
            Err(StatsError::DomainRange(
                DomainRangeError::MinimumDetectableEffect { .. }
            ))
        ));
        assert!(matches!(
            minimum_sample_size(0.6, 1.0, 0.10),
            Err(StatsError::DomainRange(
                DomainRangeError::MinimumDetectableEffect { .. }
            ))
        ));
        assert!(matches!(
            minimum_sample_size(0.15, 0.5, 1.0),
            Err(StatsError::DomainRange(
                DomainRangeError::SignificanceLevel { .. }
            ))
        ));
        assert!(PowerAnalysis::new(SignificanceLevel::DEFAULT, 1.0).is_err());
        assert!(
            PowerAnalysis::default()
                .direction(EffectDirection::Decrease)
                .sample_size(0.15, 1.0)
                .is_err()
        );
    }
}
