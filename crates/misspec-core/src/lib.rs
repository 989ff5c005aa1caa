//! Simulation engine for studying LDA under training-data misspecification.
//!
//! This crate holds every stage of a single Monte Carlo trial:
//!
//! ```text
//! RandomSource
//!     ↓ feeds
//! generator::generate      (two-class, two-predictor Sample)
//!     ↓
//! split::split             (stratified train/test hold-out)
//!     ↓ training partition only
//! perturb::{imbalance, flip_labels}   (optional)
//!     ↓
//! lda::LdaModel::fit  →  predict(test)
//!     ↓
//! score::error_rate
//! ```
//!
//! All stages are pure, in-memory and synchronous. Randomness is consumed only
//! through a [`random::RandomSource`] passed in by the caller, so a trial is
//! fully reproducible from its seed.
//!
//! # Example
//!
//! ```
//! use misspec_core::{
//!     generator::{self, LatentDistribution},
//!     lda::LdaModel,
//!     random::{RandomSource, SimSeed},
//!     score, split,
//! };
//!
//! let mut rng = RandomSource::with_seed(SimSeed::from_u64(1));
//! let sample = generator::generate(200, 200, LatentDistribution::Normal, &mut rng).unwrap();
//! let (train, test) = split::split(&sample, 0.7, &mut rng).unwrap();
//! let model = LdaModel::fit(&train).unwrap();
//! let predicted = model.predict(test.features());
//! let error = score::error_rate(&predicted, &test.labels().collect::<Vec<_>>()).unwrap();
//! assert!(error < 0.3);
//! ```
//!
//! # Row identity
//!
//! Every record carries a [`sample::RowId`] assigned at generation time. The
//! test partition is computed as a set difference on identifiers, and the
//! perturbations select rows by identifier, so effective sample sizes never
//! drift through positional bookkeeping.

pub use self::sample::{Label, Record, RowId, Sample};

pub mod generator;
pub mod lda;
pub mod perturb;
pub mod random;
pub mod sample;
pub mod score;
pub mod split;

/// Number of predictors per record.
pub const NUM_FEATURES: usize = 2;

/// A feature vector.
pub type Features = [f64; NUM_FEATURES];

/// An argument outside its documented domain.
///
/// Raised before any randomness is consumed.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("invalid {parameter}: got {value}, expected {expected}")]
pub struct InvalidParameterError {
    parameter: &'static str,
    value: f64,
    expected: &'static str,
}

impl InvalidParameterError {
    #[must_use]
    pub fn new(parameter: &'static str, value: f64, expected: &'static str) -> Self {
        Self {
            parameter,
            value,
            expected,
        }
    }

    /// Name of the offending parameter.
    #[must_use]
    pub fn parameter(&self) -> &'static str {
        self.parameter
    }

    /// The rejected value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Checks that `value` lies in the closed unit interval.
pub(crate) fn ensure_unit_interval(
    parameter: &'static str,
    value: f64,
) -> Result<(), InvalidParameterError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InvalidParameterError::new(parameter, value, "a value in [0, 1]"))
    }
}

/// Rounds `fraction * count` to the nearest whole row count.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub(crate) fn fraction_of(count: usize, fraction: f64) -> usize {
    let rows = (fraction * count as f64).round() as usize;
    rows.min(count)
}

/// Any failure in one generate → split → perturb → fit → predict → score run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrialError {
    #[display("{_0}")]
    InvalidParameter(InvalidParameterError),
    #[display("{_0}")]
    Fit(lda::FitError),
    #[display("{_0}")]
    Score(score::ScoreError),
}
