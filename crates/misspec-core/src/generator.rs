//! Synthetic two-class, two-predictor datasets.
//!
//! Two latent columns `Z1`, `Z2` are drawn i.i.d. from the chosen
//! distribution and mixed into predictors with a fixed linear map plus a
//! class-dependent mean shift:
//!
//! ```text
//! X1 = 3·Z1 + 2·Z2 + 6·y
//! X2 =   Z1 − 4·Z2 + 4·y
//! ```
//!
//! Under normal latents both classes share covariance `[[13, −5], [−5, 17]]`
//! and the Bayes error of the optimal linear rule is about 0.123.
//!
//! # Label ordering
//!
//! Records are emitted class-1 first: rows `0..n_class1` have `y = 1`
//! ([`Label::One`]) and the following `n_class0` rows have `y = 0`.
//! Row identifiers equal the emission position.

use serde::{Deserialize, Serialize};

use crate::{InvalidParameterError, Label, Record, RowId, Sample, random::RandomSource};

/// Distribution of the latent columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LatentDistribution {
    /// Standard normal (mean 0, variance 1).
    Normal,
    /// Student-t with the given degrees of freedom (must be > 0).
    StudentT { dof: f64 },
}

/// Generates a labeled sample with the requested class sizes.
///
/// Draws `2 * (n_class0 + n_class1)` latent variates: the whole `Z1` column
/// first, then the whole `Z2` column.
///
/// # Errors
///
/// Returns [`InvalidParameterError`] if a class size is zero or the degrees
/// of freedom are not positive. Nothing is drawn in that case.
#[expect(clippy::cast_precision_loss)]
pub fn generate(
    n_class0: usize,
    n_class1: usize,
    distribution: LatentDistribution,
    rng: &mut RandomSource,
) -> Result<Sample, InvalidParameterError> {
    check_class_size("class-0 size", n_class0)?;
    check_class_size("class-1 size", n_class1)?;
    let n = n_class0 + n_class1;
    let n_rows = u32::try_from(n).map_err(|_| {
        InvalidParameterError::new("total sample size", n as f64, "at most u32::MAX rows")
    })?;

    let latent = match distribution {
        LatentDistribution::Normal => (0..2 * n).map(|_| rng.standard_normal()).collect::<Vec<_>>(),
        LatentDistribution::StudentT { dof } => {
            let student_t = RandomSource::student_t(dof)?;
            (0..2 * n).map(|_| rng.sample(&student_t)).collect()
        }
    };
    let (z1, z2) = latent.split_at(n);

    let records = (0..n)
        .zip(0..n_rows)
        .map(|(i, id)| {
            let label = Label::from(i < n_class1);
            let y = if label.is_one() { 1.0 } else { 0.0 };
            Record {
                id: RowId(id),
                features: [
                    3.0 * z1[i] + 2.0 * z2[i] + 6.0 * y,
                    z1[i] - 4.0 * z2[i] + 4.0 * y,
                ],
                label,
            }
        })
        .collect();
    Ok(Sample::new(records))
}

#[expect(clippy::cast_precision_loss)]
fn check_class_size(parameter: &'static str, size: usize) -> Result<(), InvalidParameterError> {
    if size == 0 {
        return Err(InvalidParameterError::new(parameter, size as f64, "at least 1 row"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SimSeed;

    fn rng() -> RandomSource {
        RandomSource::with_seed(SimSeed::from_u64(11))
    }

    #[test]
    fn test_class_sizes_and_ordering() {
        let sample = generate(30, 20, LatentDistribution::Normal, &mut rng()).unwrap();
        assert_eq!(sample.len(), 50);
        assert_eq!(sample.class_counts(), [30, 20]);
        assert!(sample.records()[..20].iter().all(|r| r.label == Label::One));
        assert!(sample.records()[20..].iter().all(|r| r.label == Label::Zero));
    }

    #[test]
    fn test_ids_are_positions() {
        let sample = generate(5, 5, LatentDistribution::Normal, &mut rng()).unwrap();
        for (i, id) in sample.ids().enumerate() {
            assert_eq!(id, RowId(u32::try_from(i).unwrap()));
        }
    }

    #[test]
    fn test_class_means_follow_shift() {
        let sample = generate(5000, 5000, LatentDistribution::Normal, &mut rng()).unwrap();
        for (label, expected) in [(Label::Zero, [0.0, 0.0]), (Label::One, [6.0, 4.0])] {
            let rows = sample.records_of(label).collect::<Vec<_>>();
            #[expect(clippy::cast_precision_loss)]
            let n = rows.len() as f64;
            for (j, want) in expected.iter().enumerate() {
                let mean = rows.iter().map(|r| r.features[j]).sum::<f64>() / n;
                assert!((mean - want).abs() < 0.25, "{label:?}[{j}] mean = {mean}");
            }
        }
    }

    #[test]
    fn test_normal_covariance_structure() {
        let sample = generate(20_000, 1, LatentDistribution::Normal, &mut rng()).unwrap();
        let rows = sample.records_of(Label::Zero).collect::<Vec<_>>();
        #[expect(clippy::cast_precision_loss)]
        let n = rows.len() as f64;
        let cov = |a: usize, b: usize| {
            rows.iter().map(|r| r.features[a] * r.features[b]).sum::<f64>() / n
        };
        assert!((cov(0, 0) - 13.0).abs() < 0.6);
        assert!((cov(1, 1) - 17.0).abs() < 0.8);
        assert!((cov(0, 1) + 5.0).abs() < 0.5);
    }

    #[test]
    fn test_same_seed_same_sample() {
        let a = generate(10, 10, LatentDistribution::StudentT { dof: 3.0 }, &mut rng()).unwrap();
        let b = generate(10, 10, LatentDistribution::StudentT { dof: 3.0 }, &mut rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_invalid_arguments() {
        let mut source = rng();
        let before = source.clone().fork();
        assert!(generate(0, 10, LatentDistribution::Normal, &mut source).is_err());
        assert!(generate(10, 0, LatentDistribution::Normal, &mut source).is_err());
        let err = generate(10, 10, LatentDistribution::StudentT { dof: 0.0 }, &mut source)
            .unwrap_err();
        assert_eq!(err.parameter(), "degrees of freedom");
        // no randomness consumed
        assert_eq!(source.fork(), before);
    }
}
