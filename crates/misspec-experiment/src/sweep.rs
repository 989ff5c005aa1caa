//! Severity sweep × repeated trials.
//!
//! For every severity value, in the given order, the runner executes
//! `trials_per_value` independent trials and averages their error rates into
//! one [`SweepPoint`].
//!
//! # Determinism
//!
//! A master [`RandomSource`] seeded from the config (or a freshly drawn seed,
//! which is then recorded on the result) forks one child seed per trial, in
//! sweep order, before any trial runs. Trials are then distributed over
//! worker threads, each building its own source from its seed. The output is
//! therefore identical for any worker count.

use std::{panic, thread};

use misspec_core::{
    InvalidParameterError, TrialError,
    random::{RandomSource, SimSeed},
};
use misspec_stats::descriptive::DescriptiveStats;
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::{ExperimentConfig, FailurePolicy},
    scenario::Scenario,
    trial::{self, TrialOutcome},
};

/// Aggregated outcome for one severity value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub severity: f64,
    /// Arithmetic mean of the completed trials' error rates.
    pub mean_error: f64,
    pub error_stats: DescriptiveStats,
    pub completed_trials: usize,
    pub failed_trials: usize,
    /// Mean realized class-1 training share (imbalance scenario only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_class1_ratio: Option<f64>,
}

/// Ordered `(severity, mean error)` results for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub scenario: Scenario,
    /// Meaning of [`SweepPoint::severity`].
    pub parameter: String,
    /// Seed the sweep was run with.
    pub seed: SimSeed,
    pub points: Vec<SweepPoint>,
}

impl SweepResult {
    /// `(severity, mean error)` pairs in sweep order.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(|p| (p.severity, p.mean_error))
    }

    /// Mean of the per-severity mean errors.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn grand_mean(&self) -> f64 {
        self.points.iter().map(|p| p.mean_error).sum::<f64>() / self.points.len() as f64
    }

    /// The point whose severity equals `severity`, if any.
    #[must_use]
    pub fn point_at(&self, severity: f64) -> Option<&SweepPoint> {
        self.points.iter().find(|p| p.severity == severity)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SweepError {
    #[display("{_0}")]
    InvalidParameter(InvalidParameterError),
    #[display("{scenario} trial {trial} at severity {severity} failed: {source}")]
    TrialFailed {
        scenario: Scenario,
        severity: f64,
        trial: usize,
        source: TrialError,
    },
    #[display("every {scenario} trial at severity {severity} failed")]
    AllTrialsFailed { scenario: Scenario, severity: f64 },
}

impl From<InvalidParameterError> for SweepError {
    fn from(err: InvalidParameterError) -> Self {
        Self::InvalidParameter(err)
    }
}

/// Runs a full sweep for one scenario.
///
/// All arguments are validated before any randomness is consumed.
/// `severities` must be strictly increasing.
///
/// # Example
///
/// ```
/// use misspec_core::random::SimSeed;
/// use misspec_experiment::{config::ExperimentConfig, scenario::Scenario, sweep::run_sweep};
///
/// let config = ExperimentConfig {
///     n_class0: 100,
///     n_class1: 100,
///     trials_per_value: 3,
///     seed: Some(SimSeed::from_u64(1)),
///     ..ExperimentConfig::default()
/// };
/// let result = run_sweep(Scenario::LabelFlip, &[0.1, 0.5], &config).unwrap();
/// assert_eq!(result.points.len(), 2);
/// ```
pub fn run_sweep(
    scenario: Scenario,
    severities: &[f64],
    config: &ExperimentConfig,
) -> Result<SweepResult, SweepError> {
    config.validate()?;
    scenario.validate_grid(severities)?;

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut master = RandomSource::with_seed(seed);
    info!(
        %scenario,
        values = severities.len(),
        trials = config.trials_per_value,
        %seed,
        "starting sweep"
    );

    let mut points = Vec::with_capacity(severities.len());
    for &severity in severities {
        let seeds = (0..config.trials_per_value)
            .map(|_| master.fork())
            .collect::<Vec<_>>();
        let outcomes = run_trials(scenario, severity, &seeds, config);
        let point = aggregate(scenario, severity, outcomes, config.failure_policy)?;
        info!(
            %scenario,
            severity,
            mean_error = point.mean_error,
            failed = point.failed_trials,
            "sweep point complete"
        );
        points.push(point);
    }

    Ok(SweepResult {
        scenario,
        parameter: scenario.parameter_name().to_owned(),
        seed,
        points,
    })
}

fn run_trials(
    scenario: Scenario,
    severity: f64,
    seeds: &[SimSeed],
    config: &ExperimentConfig,
) -> Vec<Result<TrialOutcome, TrialError>> {
    let run = |seed: SimSeed| {
        let mut rng = RandomSource::with_seed(seed);
        trial::run_trial(scenario, severity, config, &mut rng)
    };

    let workers = config.workers.min(seeds.len());
    if workers <= 1 {
        return seeds.iter().copied().map(run).collect();
    }

    let chunk_size = seeds.len().div_ceil(workers);
    thread::scope(|s| {
        let handles = seeds
            .chunks(chunk_size)
            .map(|chunk| s.spawn(move || chunk.iter().copied().map(run).collect::<Vec<_>>()))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    })
}

fn aggregate(
    scenario: Scenario,
    severity: f64,
    outcomes: Vec<Result<TrialOutcome, TrialError>>,
    policy: FailurePolicy,
) -> Result<SweepPoint, SweepError> {
    let mut errors = Vec::with_capacity(outcomes.len());
    let mut ratios = vec![];
    let mut failed_trials = 0;

    for (trial, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(outcome) => {
                debug!(%scenario, severity, trial, error = outcome.error, "trial complete");
                errors.push(outcome.error);
                ratios.extend(outcome.class1_ratio);
            }
            Err(source) => match policy {
                FailurePolicy::Abort => {
                    return Err(SweepError::TrialFailed {
                        scenario,
                        severity,
                        trial,
                        source,
                    });
                }
                FailurePolicy::Skip => {
                    warn!(%scenario, severity, trial, error = %source, "trial failed, excluded from mean");
                    failed_trials += 1;
                }
            },
        }
    }

    let error_stats = DescriptiveStats::new(errors)
        .ok_or(SweepError::AllTrialsFailed { scenario, severity })?;
    #[expect(clippy::cast_precision_loss)]
    let mean_class1_ratio =
        (!ratios.is_empty()).then(|| ratios.iter().sum::<f64>() / ratios.len() as f64);

    Ok(SweepPoint {
        severity,
        mean_error: error_stats.mean,
        completed_trials: error_stats.count,
        failed_trials,
        error_stats,
        mean_class1_ratio,
    })
}
