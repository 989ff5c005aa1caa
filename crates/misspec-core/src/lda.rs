//! Linear discriminant analysis with a shared (pooled) covariance matrix.
//!
//! # Model
//!
//! For each class `k` with `n_k` training rows out of `n`:
//!
//! - prior `π_k = n_k / n`
//! - mean `μ_k`, the componentwise average of the class's feature vectors
//!
//! The pooled covariance is
//!
//! ```text
//! Σ = Σ_i (x_i − μ_{y_i})(x_i − μ_{y_i})ᵀ / (n − K)
//! ```
//!
//! and each class gets a linear discriminant
//!
//! ```text
//! δ_k(x) = xᵀ w_k + b_k,   w_k = Σ⁻¹ μ_k,   b_k = −½ μ_kᵀ Σ⁻¹ μ_k + ln π_k
//! ```
//!
//! Prediction picks the class with the largest `δ_k(x)`. Ties go to the
//! class that comes first in [`Label::ALL`], i.e. the lower label.
//!
//! # Numerics
//!
//! With two predictors the covariance is inverted in closed form. A
//! determinant that is not finite, not positive, or negligible relative to
//! the larger of `|Σ₀₀Σ₁₁|` and `|Σ₀₁Σ₁₀|` is reported as
//! [`FitError::SingularCovariance`].

use serde::{Deserialize, Serialize};

use crate::{Features, Label, NUM_FEATURES, Sample};

type Matrix = [[f64; NUM_FEATURES]; NUM_FEATURES];

/// Relative tolerance below which the pooled covariance is treated as singular.
const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// The training set cannot support a shared-covariance fit.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FitError {
    #[display("no training records for class {label:?}")]
    MissingClass { label: Label },
    #[display("{records} training records are too few to pool covariance over {classes} classes")]
    TooFewRecords { records: usize, classes: usize },
    #[display("pooled covariance is singular (determinant {determinant:e})")]
    SingularCovariance { determinant: f64 },
}

/// Per-class empirical statistics and the pooled covariance.
///
/// Estimated from the training partition only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStatistics {
    /// Class means, indexed by [`Label::index`].
    pub means: [Features; Label::LEN],
    /// Class priors `n_k / n`, indexed by [`Label::index`].
    pub priors: [f64; Label::LEN],
    /// Pooled within-class covariance.
    pub pooled_covariance: Matrix,
}

impl ClassStatistics {
    /// Estimates class means, priors and the pooled covariance from `train`.
    #[expect(clippy::cast_precision_loss)]
    pub fn estimate(train: &Sample) -> Result<Self, FitError> {
        let counts = train.class_counts();
        if let Some(label) = Label::ALL.into_iter().find(|l| counts[l.index()] == 0) {
            return Err(FitError::MissingClass { label });
        }
        let n = train.len();
        if n <= Label::LEN {
            return Err(FitError::TooFewRecords {
                records: n,
                classes: Label::LEN,
            });
        }

        let mut means = [[0.0; NUM_FEATURES]; Label::LEN];
        for record in train.records() {
            let mean = &mut means[record.label.index()];
            for (m, x) in mean.iter_mut().zip(record.features) {
                *m += x;
            }
        }
        for (mean, &count) in means.iter_mut().zip(&counts) {
            for m in mean {
                *m /= count as f64;
            }
        }

        let mut scatter = [[0.0; NUM_FEATURES]; NUM_FEATURES];
        for record in train.records() {
            let mean = means[record.label.index()];
            let d = [record.features[0] - mean[0], record.features[1] - mean[1]];
            for (row, di) in scatter.iter_mut().zip(d) {
                for (cell, dj) in row.iter_mut().zip(d) {
                    *cell += di * dj;
                }
            }
        }
        let dof = (n - Label::LEN) as f64;
        let pooled_covariance = scatter.map(|row| row.map(|c| c / dof));

        let priors = counts.map(|c| c as f64 / n as f64);
        Ok(Self {
            means,
            priors,
            pooled_covariance,
        })
    }
}

/// Linear discriminant for one class: `δ(x) = xᵀ weights + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discriminant {
    pub weights: Features,
    pub intercept: f64,
}

impl Discriminant {
    #[must_use]
    pub fn score(&self, x: Features) -> f64 {
        x[0] * self.weights[0] + x[1] * self.weights[1] + self.intercept
    }
}

/// A fitted LDA model.
///
/// Immutable once fitted; used only for prediction.
///
/// # Example
///
/// ```
/// use misspec_core::{Label, Record, RowId, Sample, lda::LdaModel};
///
/// let rows = [
///     ([0.0, 0.0], Label::Zero),
///     ([1.0, 0.5], Label::Zero),
///     ([0.5, 1.0], Label::Zero),
///     ([5.0, 5.0], Label::One),
///     ([6.0, 5.5], Label::One),
///     ([5.5, 6.0], Label::One),
/// ];
/// let train: Sample = rows
///     .into_iter()
///     .zip(0..)
///     .map(|((features, label), id)| Record { id: RowId(id), features, label })
///     .collect();
///
/// let model = LdaModel::fit(&train).unwrap();
/// assert_eq!(model.predict([[0.2, 0.3], [5.8, 5.1]]), vec![Label::Zero, Label::One]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdaModel {
    statistics: ClassStatistics,
    discriminants: [Discriminant; Label::LEN],
}

impl LdaModel {
    /// Fits the model on a training sample.
    ///
    /// # Errors
    ///
    /// - [`FitError::MissingClass`] if a class has no rows
    /// - [`FitError::TooFewRecords`] if `n <= K`
    /// - [`FitError::SingularCovariance`] if the pooled covariance cannot be inverted
    pub fn fit(train: &Sample) -> Result<Self, FitError> {
        let statistics = ClassStatistics::estimate(train)?;
        let inverse = invert(&statistics.pooled_covariance)?;

        let discriminants = Label::ALL.map(|label| {
            let mean = statistics.means[label.index()];
            let weights = mat_vec(&inverse, mean);
            let quad = mean[0] * weights[0] + mean[1] * weights[1];
            Discriminant {
                weights,
                intercept: -0.5 * quad + statistics.priors[label.index()].ln(),
            }
        });

        Ok(Self {
            statistics,
            discriminants,
        })
    }

    #[must_use]
    pub fn statistics(&self) -> &ClassStatistics {
        &self.statistics
    }

    #[must_use]
    pub fn discriminant(&self, label: Label) -> &Discriminant {
        &self.discriminants[label.index()]
    }

    /// Predicts the label of a single feature vector.
    #[must_use]
    pub fn classify(&self, x: Features) -> Label {
        let mut best = Label::ALL[0];
        let mut best_score = self.discriminant(best).score(x);
        for label in &Label::ALL[1..] {
            let score = self.discriminant(*label).score(x);
            // strict comparison keeps the earlier label on ties
            if score > best_score {
                best = *label;
                best_score = score;
            }
        }
        best
    }

    /// Predicts labels for a sequence of feature vectors, in order.
    pub fn predict<I>(&self, features: I) -> Vec<Label>
    where
        I: IntoIterator<Item = Features>,
    {
        features.into_iter().map(|x| self.classify(x)).collect()
    }
}

fn invert(m: &Matrix) -> Result<Matrix, FitError> {
    let [[a, b], [c, d]] = *m;
    let determinant = a * d - b * c;
    let scale = (a * d).abs().max((b * c).abs());
    if !determinant.is_finite() || determinant <= SINGULARITY_TOLERANCE * scale || scale == 0.0 {
        return Err(FitError::SingularCovariance { determinant });
    }
    Ok([
        [d / determinant, -b / determinant],
        [-c / determinant, a / determinant],
    ])
}

fn mat_vec(m: &Matrix, v: Features) -> Features {
    m.map(|row| row[0] * v[0] + row[1] * v[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Record, RowId,
        generator::{LatentDistribution, generate},
        random::{RandomSource, SimSeed},
        score, split,
    };

    fn sample_of(rows: &[(Features, Label)]) -> Sample {
        rows.iter()
            .zip(0..)
            .map(|(&(features, label), id)| Record {
                id: RowId(id),
                features,
                label,
            })
            .collect()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_statistics_hand_computed() {
        let train = sample_of(&[
            ([0.0, 0.0], Label::Zero),
            ([2.0, 0.0], Label::Zero),
            ([1.0, 3.0], Label::Zero),
            ([4.0, 4.0], Label::One),
            ([6.0, 6.0], Label::One),
        ]);
        let stats = ClassStatistics::estimate(&train).unwrap();
        assert_eq!(stats.means[0], [1.0, 1.0]);
        assert_eq!(stats.means[1], [5.0, 5.0]);
        assert_close(stats.priors[0], 0.6);
        assert_close(stats.priors[1], 0.4);
        // deviations: (-1,-1), (1,-1), (0,2), (-1,-1), (1,1); n - K = 3
        let cov = stats.pooled_covariance;
        assert_close(cov[0][0], 4.0 / 3.0);
        assert_close(cov[1][1], 8.0 / 3.0);
        assert_close(cov[0][1], 2.0 / 3.0);
        assert_close(cov[1][0], 2.0 / 3.0);
    }

    #[test]
    fn test_discriminant_coefficients() {
        let train = sample_of(&[
            ([0.0, 0.0], Label::Zero),
            ([2.0, 0.0], Label::Zero),
            ([1.0, 3.0], Label::Zero),
            ([4.0, 4.0], Label::One),
            ([6.0, 6.0], Label::One),
        ]);
        let model = LdaModel::fit(&train).unwrap();
        // Σ = [[4/3, 2/3], [2/3, 8/3]], det = 28/9, Σ⁻¹ = [[6/7, -3/14], [-3/14, 3/7]]
        let d1 = model.discriminant(Label::One);
        assert_close(d1.weights[0], 5.0 * (6.0 / 7.0 - 3.0 / 14.0));
        assert_close(d1.weights[1], 5.0 * (-3.0 / 14.0 + 3.0 / 7.0));
        let quad = 5.0 * d1.weights[0] + 5.0 * d1.weights[1];
        assert_close(d1.intercept, -0.5 * quad + 0.4_f64.ln());
    }

    #[test]
    fn test_missing_class_is_rejected() {
        let train = sample_of(&[
            ([0.0, 0.0], Label::One),
            ([1.0, 2.0], Label::One),
            ([3.0, 1.0], Label::One),
        ]);
        assert_eq!(
            LdaModel::fit(&train).unwrap_err(),
            FitError::MissingClass { label: Label::Zero }
        );
    }

    #[test]
    fn test_too_few_records_is_rejected() {
        let train = sample_of(&[([0.0, 0.0], Label::Zero), ([1.0, 2.0], Label::One)]);
        assert!(matches!(
            LdaModel::fit(&train),
            Err(FitError::TooFewRecords { records: 2, .. })
        ));
    }

    #[test]
    fn test_collinear_predictors_are_singular() {
        let train = sample_of(&[
            ([0.0, 0.0], Label::Zero),
            ([1.0, 2.0], Label::Zero),
            ([2.0, 4.0], Label::Zero),
            ([5.0, 10.0], Label::One),
            ([6.0, 12.0], Label::One),
        ]);
        assert!(matches!(
            LdaModel::fit(&train),
            Err(FitError::SingularCovariance { .. })
        ));
    }

    #[test]
    fn test_identical_rows_are_singular() {
        let train = sample_of(&[
            ([1.0, 1.0], Label::Zero),
            ([1.0, 1.0], Label::Zero),
            ([3.0, 3.0], Label::One),
            ([3.0, 3.0], Label::One),
        ]);
        assert!(matches!(
            LdaModel::fit(&train),
            Err(FitError::SingularCovariance { .. })
        ));
    }

    #[test]
    fn test_ties_go_to_lower_label() {
        // symmetric classes with equal priors: the midpoint scores equally
        let train = sample_of(&[
            ([-1.5, 0.0], Label::Zero),
            ([-0.5, 1.0], Label::Zero),
            ([-1.0, -1.0], Label::Zero),
            ([1.5, 0.0], Label::One),
            ([0.5, 1.0], Label::One),
            ([1.0, -1.0], Label::One),
        ]);
        let model = LdaModel::fit(&train).unwrap();
        let x = [0.0, 0.0];
        assert_close(
            model.discriminant(Label::Zero).score(x),
            model.discriminant(Label::One).score(x),
        );
        assert_eq!(model.classify(x), Label::Zero);
        assert_eq!(model.classify([0.5, 0.0]), Label::One);
    }

    #[test]
    fn test_baseline_error_near_bayes_rate() {
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(2024));
        let mut errors = vec![];
        for _ in 0..10 {
            let sample = generate(1000, 1000, LatentDistribution::Normal, &mut rng).unwrap();
            let (train, test) = split::split(&sample, 0.7, &mut rng).unwrap();
            let model = LdaModel::fit(&train).unwrap();
            let predicted = model.predict(test.features());
            let truth = test.labels().collect::<Vec<_>>();
            errors.push(score::error_rate(&predicted, &truth).unwrap());
        }
        #[expect(clippy::cast_precision_loss)]
        let mean = errors.iter().sum::<f64>() / errors.len() as f64;
        assert!((mean - 0.123).abs() < 0.03, "mean error = {mean}");
    }
}
