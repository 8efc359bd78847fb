//! Statistical core of the crosstab workspace.
//!
//! This crate provides the pure computations behind categorical association
//! analysis:
//!
//! - **Contingency tables**: labelled matrices of observed counts with totals,
//!   row proportions and sub-table selection
//! - **Chi-squared test of independence**: expected frequencies, statistic,
//!   degrees of freedom and p-value, classified against a significance level
//! - **Sample sizing**: per-group sample size for detecting a change between
//!   two proportions
//!
//! Nothing here performs I/O or keeps state between calls.
//!
//! # Modules
//!
//! - [`contingency`]: Contingency table construction and validation
//! - [`chi_squared`]: Chi-squared test of independence
//! - [`significance`]: Validated significance levels
//! - [`sample_size`]: Two-proportion power analysis
//! - [`error`]: Error types shared by the modules above
//!
//! # Examples
//!
//! ## Testing a literal table
//!
//! ```
//! use crosstab_stats::{chi_squared::chi_squared_test, contingency::ContingencyTable};
//!
//! // Visitors who applied, split by A/B group
//! let table = ContingencyTable::from_rows(&[[250, 2254], [325, 2175]]).unwrap();
//! let outcome = chi_squared_test(&table, 0.10).unwrap();
//! assert!(outcome.is_significant());
//! ```
//!
//! ## Sizing an experiment
//!
//! ```
//! use crosstab_stats::sample_size::{minimum_sample_size, relative_effect};
//!
//! let small = minimum_sample_size(0.15, relative_effect(0.15, 0.05), 0.10).unwrap();
//! let large = minimum_sample_size(0.15, relative_effect(0.15, 0.10), 0.10).unwrap();
//! assert!(small.per_group() > large.per_group());
//! ```

pub mod chi_squared;
pub mod contingency;
pub mod error;
pub mod sample_size;
pub mod significance;
