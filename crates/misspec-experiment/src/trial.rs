use misspec_core::{TrialError, generator, lda::LdaModel, random::RandomSource, score, split};
use serde::{Deserialize, Serialize};

use crate::{config::ExperimentConfig, scenario::Scenario};

/// Outcome of one generate → split → perturb → fit → predict → score run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// Misclassification rate on the untouched test partition.
    pub error: f64,
    /// Realized class-1 share of the perturbed training set, when the
    /// scenario resamples classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class1_ratio: Option<f64>,
}

/// A trial together with the model it fitted, for inspecting single runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialDetail {
    pub outcome: TrialOutcome,
    pub model: LdaModel,
    /// Class counts `[class 0, class 1]` of the perturbed training set.
    pub train_counts: [usize; 2],
    pub test_records: usize,
}

/// Runs a single trial. All state is local to the call.
pub fn run_trial(
    scenario: Scenario,
    severity: f64,
    config: &ExperimentConfig,
    rng: &mut RandomSource,
) -> Result<TrialOutcome, TrialError> {
    run_trial_detailed(scenario, severity, config, rng).map(|detail| detail.outcome)
}

/// Like [`run_trial`], keeping the fitted model.
///
/// Consumes exactly the same randomness as [`run_trial`], so a trial seed
/// taken from a sweep reproduces that trial.
pub fn run_trial_detailed(
    scenario: Scenario,
    severity: f64,
    config: &ExperimentConfig,
    rng: &mut RandomSource,
) -> Result<TrialDetail, TrialError> {
    let sample = generator::generate(
        config.n_class0,
        config.n_class1,
        scenario.distribution(severity),
        rng,
    )?;
    let (train, test) =
        split::split_with(&sample, config.train_fraction, config.stratify_split, rng)?;
    let (train, effect) = scenario.perturb_training(train, severity, rng)?;

    let model = LdaModel::fit(&train)?;
    let predicted = model.predict(test.features());
    let truth = test.labels().collect::<Vec<_>>();
    let error = score::error_rate(&predicted, &truth)?;

    Ok(TrialDetail {
        outcome: TrialOutcome {
            error,
            class1_ratio: effect.class1_ratio,
        },
        model,
        train_counts: train.class_counts(),
        test_records: test.len(),
    })
}

#[cfg(test)]
mod tests {
    use misspec_core::{lda::FitError, random::SimSeed, score::ScoreError};

    use super::*;

    fn config() -> ExperimentConfig {
        ExperimentConfig {
            n_class0: 200,
            n_class1: 200,
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn test_trial_is_reproducible() {
        let seed = SimSeed::from_u64(99);
        let a = run_trial(Scenario::LabelFlip, 0.2, &config(), &mut RandomSource::with_seed(seed));
        let b = run_trial(Scenario::LabelFlip, 0.2, &config(), &mut RandomSource::with_seed(seed));
        assert_eq!(a, b);
    }

    #[test]
    fn test_imbalance_reports_ratio() {
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(1));
        let outcome = run_trial(Scenario::Imbalance, 0.5, &config(), &mut rng).unwrap();
        assert_eq!(outcome.class1_ratio, Some(0.5));
        assert!((0.0..=1.0).contains(&outcome.error));
    }

    #[test]
    fn test_detail_matches_plain_trial() {
        let seed = SimSeed::from_u64(12);
        let mut rng = RandomSource::with_seed(seed);
        let plain = run_trial(Scenario::HeavyTail, 4.0, &config(), &mut rng).unwrap();
        let mut rng = RandomSource::with_seed(seed);
        let detail = run_trial_detailed(Scenario::HeavyTail, 4.0, &config(), &mut rng).unwrap();
        assert_eq!(detail.outcome, plain);
        assert_eq!(detail.train_counts, [140, 140]);
        assert_eq!(detail.test_records, 120);
    }

    #[test]
    fn test_unstratified_split_keeps_total_train_size() {
        let config = ExperimentConfig {
            stratify_split: false,
            ..config()
        };
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(3));
        let detail = run_trial_detailed(Scenario::Baseline, 1.0, &config, &mut rng).unwrap();
        assert_eq!(detail.train_counts.iter().sum::<usize>(), 280);
        assert_eq!(detail.test_records, 120);
    }

    #[test]
    fn test_imbalance_extreme_is_a_fit_error() {
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(1));
        let err = run_trial(Scenario::Imbalance, 0.0, &config(), &mut rng).unwrap_err();
        assert!(matches!(err, TrialError::Fit(FitError::MissingClass { .. })));
    }

    #[test]
    fn test_full_train_fraction_cannot_be_scored() {
        let config = ExperimentConfig {
            train_fraction: 1.0,
            ..config()
        };
        let mut rng = RandomSource::with_seed(SimSeed::from_u64(1));
        let err = run_trial(Scenario::Baseline, 1.0, &config, &mut rng).unwrap_err();
        assert_eq!(err, TrialError::Score(ScoreError::Empty));
    }
}
