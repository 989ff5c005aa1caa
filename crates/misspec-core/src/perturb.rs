//! Training-set corruptions.
//!
//! Both operations take the training partition and a severity `m ∈ [0, 1]`
//! and return a new training sample. The test partition is never touched, so
//! the model is always scored against the balance and labels the generator
//! actually produced.

use std::collections::HashSet;

use crate::{
    InvalidParameterError, Label, Record, RowId, Sample, ensure_unit_interval, fraction_of,
    random::RandomSource,
};

/// Result of [`imbalance`]: the skewed training set and its class-1 share.
#[derive(Debug, Clone, PartialEq)]
pub struct ImbalancedSample {
    pub sample: Sample,
    /// Realized proportion of [`Label::One`] rows, `count(One) / total`.
    /// `None` when both classes were reduced to zero rows.
    pub class1_ratio: Option<f64>,
}

/// Skews the class balance of a training sample.
///
/// Retains `round((1 - m) * n1)` of the class-1 rows and `round(m * n0)` of
/// the class-0 rows, each drawn uniformly without replacement, and
/// concatenates them (class 1 first). `m` is therefore the retained share of
/// class 0; with equal class sizes the realized class-1 proportion is about
/// `1 - m`. At `m = 0` class 0 disappears and at `m = 1` class 1 does.
///
/// # Errors
///
/// Fails if `m` is outside `[0, 1]`.
pub fn imbalance(
    train: &Sample,
    m: f64,
    rng: &mut RandomSource,
) -> Result<ImbalancedSample, InvalidParameterError> {
    ensure_unit_interval("imbalance severity", m)?;

    let mut records = Vec::new();
    for (label, keep_fraction) in [(Label::One, 1.0 - m), (Label::Zero, m)] {
        let class_rows = train.records_of(label).collect::<Vec<_>>();
        let keep = fraction_of(class_rows.len(), keep_fraction);
        records.extend(
            rng.sample_indices(class_rows.len(), keep)
                .into_iter()
                .map(|i| *class_rows[i]),
        );
    }

    let sample = Sample::new(records);
    let class1_ratio = sample.class1_ratio();
    Ok(ImbalancedSample {
        sample,
        class1_ratio,
    })
}

/// Inverts the labels of a random subset of training rows.
///
/// Exactly `round(m * |train|)` rows are chosen uniformly by identifier,
/// regardless of their current label, and their label is complemented.
/// Record order and identifiers are preserved.
///
/// # Errors
///
/// Fails if `m` is outside `[0, 1]`.
pub fn flip_labels(
    train: &Sample,
    m: f64,
    rng: &mut RandomSource,
) -> Result<Sample, InvalidParameterError> {
    ensure_unit_interval("flip severity", m)?;

    let flip_count = fraction_of(train.len(), m);
    let flipped_ids = rng
        .sample_indices(train.len(), flip_count)
        .into_iter()
        .map(|i| train.records()[i].id)
        .collect::<HashSet<RowId>>();

    Ok(train
        .records()
        .iter()
        .map(|r| {
            if flipped_ids.contains(&r.id) {
                Record {
                    label: r.label.flipped(),
                    ..*r
                }
            } else {
                *r
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generator::{LatentDistribution, generate},
        random::SimSeed,
    };

    fn train_sample(n0: usize, n1: usize) -> Sample {
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(21));
        generate(n0, n1, LatentDistribution::Normal, &mut rng).unwrap()
    }

    #[test]
    fn test_imbalance_retains_requested_shares() {
        let train = train_sample(700, 700);
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(1));
        let result = imbalance(&train, 0.2, &mut rng).unwrap();
        // class 1 keeps round(0.8 * 700), class 0 keeps round(0.2 * 700)
        assert_eq!(result.sample.class_counts(), [140, 560]);
        assert_eq!(result.class1_ratio, Some(0.8));
    }

    #[test]
    fn test_imbalance_rows_come_from_input() {
        let train = train_sample(50, 50);
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(2));
        let result = imbalance(&train, 0.37, &mut rng).unwrap();
        for record in result.sample.records() {
            assert_eq!(train.records()[record.id.0 as usize], *record);
        }
    }

    #[test]
    fn test_imbalance_extremes_drop_a_class() {
        let train = train_sample(10, 10);
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(3));
        let at_zero = imbalance(&train, 0.0, &mut rng).unwrap();
        assert_eq!(at_zero.sample.class_counts(), [0, 10]);
        assert_eq!(at_zero.class1_ratio, Some(1.0));
        let at_one = imbalance(&train, 1.0, &mut rng).unwrap();
        assert_eq!(at_one.sample.class_counts(), [10, 0]);
        assert_eq!(at_one.class1_ratio, Some(0.0));
    }

    #[test]
    fn test_flip_changes_exactly_rounded_count() {
        let train = train_sample(70, 70);
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(4));
        for (m, expected) in [(0.0, 0), (0.1, 14), (0.25, 35), (1.0, 140)] {
            let flipped = flip_labels(&train, m, &mut rng).unwrap();
            assert_eq!(flipped.len(), train.len());
            let changed = train
                .records()
                .iter()
                .zip(flipped.records())
                .filter(|(a, b)| a.label != b.label)
                .count();
            assert_eq!(changed, expected, "m = {m}");
            assert!(train.ids().eq(flipped.ids()));
        }
    }

    #[test]
    fn test_full_flip_complements_every_label() {
        let train = train_sample(3, 8);
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(5));
        let flipped = flip_labels(&train, 1.0, &mut rng).unwrap();
        assert_eq!(flipped.class_counts(), [8, 3]);
        for (a, b) in train.records().iter().zip(flipped.records()) {
            assert_eq!(a.features, b.features);
            assert_eq!(a.label.flipped(), b.label);
        }
    }

    #[test]
    fn test_rejects_out_of_range_severity() {
        let train = train_sample(5, 5);
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(6));
        for m in [-0.01, 1.01, f64::NAN] {
            assert!(imbalance(&train, m, &mut rng).is_err());
            assert!(flip_labels(&train, m, &mut rng).is_err());
        }
    }
}
