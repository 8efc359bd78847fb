//! Categorical association analysis over observation records
//!
//! This crate turns raw observations (species records, visitor records, ...)
//! into contingency tables and decides whether two categorical variables are
//! associated, using the statistics in [`crosstab_stats`].
//!
//! # Overview
//!
//! An analysis follows these steps:
//!
//! 1. **Load Observations** ([`record::ObservationSet`]): records mapping field
//!    names to [`value::Value`]s
//! 2. **Choose Grouping Keys** ([`grouping::GroupingKey`]): a field's value, its
//!    presence, or a predicate over it
//! 3. **Build a Frequency Table** ([`frequency::FrequencyTable`]): count records
//!    (or non-null / distinct values) per category pair
//! 4. **Pivot** ([`frequency::FrequencyTable::pivot`]): zero-filled
//!    [`ContingencyTable`](crosstab_stats::contingency::ContingencyTable)
//! 5. **Test** ([`association::AssociationAnalyzer`]): chi-squared test of
//!    independence, for the whole table or for pairs of rows
//!
//! Records missing a field used by a key are excluded and reported rather than
//! silently assigned to a category. Null values, on the other hand, form a
//! category of their own.
//!
//! # Examples
//!
//! ## Is protection status associated with species category?
//!
//! ```
//! use crosstab_analysis::{
//!     association::AssociationAnalyzer,
//!     frequency::Tally,
//!     grouping::{FieldKey, PresenceKey},
//!     record::{ObservationSet, Record},
//!     value::Value,
//! };
//!
//! let groups = [
//!     ("Mammal", true, 30),
//!     ("Mammal", false, 146),
//!     ("Reptile", true, 5),
//!     ("Reptile", false, 73),
//! ];
//! let mut species = ObservationSet::default();
//! for (category, protected, n) in groups {
//!     let status = protected.then_some("Endangered");
//!     for _ in 0..n {
//!         species.push(
//!             Record::new()
//!                 .with("category", category)
//!                 .with("conservation_status", Value::from(status)),
//!         );
//!     }
//! }
//!
//! let report = AssociationAnalyzer::default()
//!     .analyze(
//!         &species,
//!         &FieldKey::new("category"),
//!         &PresenceKey::new("is_protected", "conservation_status"),
//!         &Tally::Records,
//!     )
//!     .unwrap();
//! assert_eq!(report.contingency().row(1), &[5, 73]);
//! assert!(report.outcome().is_significant());
//! ```
//!
//! ## Counting one variable
//!
//! ```
//! use crosstab_analysis::{
//!     frequency::{CategoryCounts, Tally},
//!     grouping::FieldKey,
//!     record::{ObservationSet, Record},
//!     value::Value,
//! };
//!
//! let species: ObservationSet = ["Endangered", "", "", "Threatened"]
//!     .into_iter()
//!     .map(|cell| Record::new().with("conservation_status", Value::parse(cell)))
//!     .collect();
//! let key = FieldKey::new("conservation_status").null_label("No Intervention");
//! let counts = CategoryCounts::build(&species, &key, &Tally::Records)
//!     .unwrap()
//!     .sort_by_count();
//! assert_eq!(counts.entries()[0], ("No Intervention".to_owned(), 2));
//! ```

pub mod association;
pub mod config;
pub mod error;
pub mod frequency;
pub mod grouping;
pub mod record;
pub mod value;
