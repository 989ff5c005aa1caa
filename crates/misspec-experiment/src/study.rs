//! The full study: baseline reference plus the three misspecification sweeps.

use chrono::{DateTime, Utc};
use misspec_core::random::{RandomSource, SimSeed};
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::{ExperimentConfig, StudyConfig},
    scenario::Scenario,
    sweep::{self, SweepError, SweepResult},
};

/// Reference error rate of LDA without misspecification.
///
/// The grand mean over every point of the baseline sweep. Computed once and
/// carried alongside the other scenarios for comparison; never recomputed
/// from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineReference {
    pub mean_error: f64,
    /// Trials that contributed to the mean.
    pub trials: usize,
}

impl BaselineReference {
    #[must_use]
    pub fn from_sweep(baseline: &SweepResult) -> Self {
        Self {
            mean_error: baseline.grand_mean(),
            trials: baseline.points.iter().map(|p| p.completed_trials).sum(),
        }
    }

    /// The error a fully label-flipped training set converges to.
    #[must_use]
    pub fn fully_flipped_error(&self) -> f64 {
        1.0 - self.mean_error
    }
}

/// Everything a reporting or plotting layer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub generated_at: DateTime<Utc>,
    /// The configuration the study ran with, including the resolved seed.
    pub config: StudyConfig,
    pub baseline: BaselineReference,
    /// One result per scenario, baseline first.
    pub sweeps: Vec<SweepResult>,
}

impl StudyReport {
    #[must_use]
    pub fn sweep(&self, scenario: Scenario) -> Option<&SweepResult> {
        self.sweeps.iter().find(|s| s.scenario == scenario)
    }
}

/// Runs the baseline sweep, derives the [`BaselineReference`], then runs
/// every other scenario.
///
/// Each scenario gets its own seed forked from the study seed, in
/// [`Scenario::ALL`] order.
pub fn run_study(config: &StudyConfig) -> Result<StudyReport, SweepError> {
    run_scenarios(config, &Scenario::ALL)
}

/// Like [`run_study`], restricted to `scenarios`. The baseline always runs.
///
/// Every selected severity grid is validated before any sweep starts.
pub fn run_scenarios(
    config: &StudyConfig,
    scenarios: &[Scenario],
) -> Result<StudyReport, SweepError> {
    config.experiment.validate()?;
    for scenario in selected(scenarios) {
        scenario.validate_grid(config.grids.get(scenario).values())?;
    }
    let seed = config.experiment.seed.unwrap_or_else(|| rand::rng().random());

    let run = |scenario: Scenario| {
        let experiment = ExperimentConfig {
            seed: Some(scenario_seed(seed, scenario)),
            ..config.experiment.clone()
        };
        sweep::run_sweep(scenario, config.grids.get(scenario).values(), &experiment)
    };

    let baseline_sweep = run(Scenario::Baseline)?;
    let baseline = BaselineReference::from_sweep(&baseline_sweep);
    info!(mean_error = baseline.mean_error, trials = baseline.trials, "baseline reference");

    let mut sweeps = vec![baseline_sweep];
    for scenario in selected(scenarios).skip(1) {
        sweeps.push(run(scenario)?);
    }

    let mut config = config.clone();
    config.experiment.seed = Some(seed);
    Ok(StudyReport {
        generated_at: Utc::now(),
        config,
        baseline,
        sweeps,
    })
}

/// The baseline followed by the requested scenarios, in [`Scenario::ALL`] order.
fn selected(scenarios: &[Scenario]) -> impl Iterator<Item = Scenario> + '_ {
    Scenario::ALL
        .into_iter()
        .filter(|s| *s == Scenario::Baseline || scenarios.contains(s))
}

/// Study seed → per-scenario seed, as used by [`run_scenarios`].
#[must_use]
pub fn scenario_seed(study_seed: SimSeed, scenario: Scenario) -> SimSeed {
    let mut master = RandomSource::with_seed(study_seed);
    Scenario::ALL
        .map(|s| (s, master.fork()))
        .into_iter()
        .find_map(|(s, seed)| (s == scenario).then_some(seed))
        .unwrap_or(study_seed)
}
