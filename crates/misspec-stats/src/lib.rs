//! Statistical summaries for Monte Carlo trial outcomes.
//!
//! The simulation engine produces one misclassification rate per trial; this
//! crate condenses a batch of such values into the measures reported next to
//! each sweep point.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics (mean, median, spread, standard error)
//!
//! # Examples
//!
//! ```
//! use misspec_stats::descriptive::DescriptiveStats;
//!
//! let errors = [0.10, 0.12, 0.14];
//! let stats = DescriptiveStats::new(errors).unwrap();
//! assert!((stats.mean - 0.12).abs() < 1e-12);
//! ```

pub mod descriptive;
