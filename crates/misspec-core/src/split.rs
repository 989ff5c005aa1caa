//! Stratified random train/test hold-out.

use std::collections::HashSet;

use crate::{
    InvalidParameterError, Label, Record, RowId, Sample, fraction_of, random::RandomSource,
};

/// Splits `sample` into training and test partitions, stratified by label.
///
/// Within each class, `round(train_fraction * class_count)` rows are drawn
/// uniformly without replacement into the training partition (class
/// [`Label::Zero`] first, then [`Label::One`], each in draw order). Every
/// other row goes to the test partition, which is the identifier set
/// difference and keeps the input order.
///
/// The two partitions are disjoint by identifier and together cover the
/// input exactly. A `train_fraction` of 1 leaves the test partition empty.
///
/// # Errors
///
/// Fails if `train_fraction` is outside `(0, 1]` or `sample` is empty.
pub fn split(
    sample: &Sample,
    train_fraction: f64,
    rng: &mut RandomSource,
) -> Result<(Sample, Sample), InvalidParameterError> {
    split_with(sample, train_fraction, true, rng)
}

/// Like [`split`], optionally ignoring labels.
///
/// Without stratification `round(train_fraction * len)` rows are drawn from
/// the whole sample, so per-class training counts vary from call to call.
pub fn split_with(
    sample: &Sample,
    train_fraction: f64,
    stratify_by_label: bool,
    rng: &mut RandomSource,
) -> Result<(Sample, Sample), InvalidParameterError> {
    check_train_fraction(train_fraction)?;
    if sample.is_empty() {
        return Err(InvalidParameterError::new("sample size", 0.0, "a non-empty sample"));
    }

    let mut train = Vec::with_capacity(fraction_of(sample.len(), train_fraction));
    if stratify_by_label {
        for label in Label::ALL {
            let class_rows = sample.records_of(label).collect::<Vec<_>>();
            draw_into(&mut train, &class_rows, train_fraction, rng);
        }
    } else {
        let rows = sample.records().iter().collect::<Vec<_>>();
        draw_into(&mut train, &rows, train_fraction, rng);
    }

    let train_ids = train.iter().map(|r| r.id).collect::<HashSet<RowId>>();
    let test = sample
        .records()
        .iter()
        .filter(|r| !train_ids.contains(&r.id))
        .copied()
        .collect();

    Ok((Sample::new(train), test))
}

fn draw_into(train: &mut Vec<Record>, rows: &[&Record], fraction: f64, rng: &mut RandomSource) {
    let take = fraction_of(rows.len(), fraction);
    train.extend(
        rng.sample_indices(rows.len(), take)
            .into_iter()
            .map(|i| *rows[i]),
    );
}

/// Checks that a train fraction lies in `(0, 1]`.
pub fn check_train_fraction(train_fraction: f64) -> Result<(), InvalidParameterError> {
    if train_fraction > 0.0 && train_fraction <= 1.0 {
        Ok(())
    } else {
        Err(InvalidParameterError::new(
            "train fraction",
            train_fraction,
            "a value in (0, 1]",
        ))
    }
}
