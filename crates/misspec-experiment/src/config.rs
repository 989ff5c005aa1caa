//! Adjustable study parameters and their documented defaults.

use std::thread;

use misspec_core::{InvalidParameterError, random::SimSeed, split};
use serde::{Deserialize, Serialize};

use crate::scenario::Scenario;

pub const DEFAULT_CLASS_SIZE: usize = 1000;
pub const DEFAULT_TRIALS_PER_VALUE: usize = 100;
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.7;

/// What the runner does when a single trial fails (e.g. a singular fit).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the sweep and return the trial's error.
    Abort,
    /// Log the failure, exclude the trial from the mean and count it on the
    /// sweep point.
    #[default]
    Skip,
}

/// Per-trial design shared by every sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub n_class0: usize,
    pub n_class1: usize,
    pub trials_per_value: usize,
    pub train_fraction: f64,
    /// Draw the training rows per class (the default) or from the whole sample.
    pub stratify_split: bool,
    /// Master seed. `None` draws a fresh one; the seed actually used is
    /// recorded on the result.
    pub seed: Option<SimSeed>,
    /// Number of worker threads trials are distributed over.
    pub workers: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_class0: DEFAULT_CLASS_SIZE,
            n_class1: DEFAULT_CLASS_SIZE,
            trials_per_value: DEFAULT_TRIALS_PER_VALUE,
            train_fraction: DEFAULT_TRAIN_FRACTION,
            stratify_split: true,
            seed: None,
            workers: thread::available_parallelism().map_or(1, usize::from),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl ExperimentConfig {
    /// Checks every field against its domain.
    #[expect(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        let at_least_one = [
            ("class-0 size", self.n_class0),
            ("class-1 size", self.n_class1),
            ("trials per value", self.trials_per_value),
            ("worker count", self.workers),
        ];
        for (parameter, value) in at_least_one {
            if value == 0 {
                return Err(InvalidParameterError::new(parameter, value as f64, "at least 1"));
            }
        }
        split::check_train_fraction(self.train_fraction)
    }
}

/// Upper bound on the number of values [`SeverityGrid::range`] produces.
pub const MAX_GRID_POINTS: usize = 100_000;

/// An ordered list of severity values for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityGrid(pub Vec<f64>);

impl SeverityGrid {
    /// `start, start + step, ...` up to and including `end` (within rounding).
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn range(start: f64, end: f64, step: f64) -> Result<Self, InvalidParameterError> {
        if !(step.is_finite() && step > 0.0) {
            return Err(InvalidParameterError::new("grid step", step, "a finite value > 0"));
        }
        if !(start.is_finite() && end.is_finite() && start <= end) {
            return Err(InvalidParameterError::new("grid end", end, "a finite value >= start"));
        }
        let steps = ((end - start) / step + 1e-9).floor();
        if steps >= MAX_GRID_POINTS as f64 {
            return Err(InvalidParameterError::new(
                "grid step",
                step,
                "a step giving at most 100000 grid points",
            ));
        }
        let steps = steps as usize;
        Ok(Self(
            (0..=steps)
                .map(|i| (start + i as f64 * step).min(end))
                .collect(),
        ))
    }

    /// Percentages `from%..=to%` as fractions (`percent(1, 3)` is `[0.01, 0.02, 0.03]`).
    #[must_use]
    pub fn percent(from: u32, to: u32) -> Self {
        Self((from..=to).map(|p| f64::from(p) / 100.0).collect())
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// The documented default grid for a scenario.
    #[must_use]
    pub fn default_for(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Baseline => Self((1..=10).map(f64::from).collect()),
            Scenario::HeavyTail => Self((1..=20).map(|i| f64::from(2 * i)).collect()),
            Scenario::Imbalance => Self::percent(1, 99),
            Scenario::LabelFlip => Self::percent(1, 100),
        }
    }
}

/// Severity grids for every scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityGrids {
    pub baseline: SeverityGrid,
    pub heavy_tail: SeverityGrid,
    pub imbalance: SeverityGrid,
    pub label_flip: SeverityGrid,
}

impl Default for SeverityGrids {
    fn default() -> Self {
        Self {
            baseline: SeverityGrid::default_for(Scenario::Baseline),
            heavy_tail: SeverityGrid::default_for(Scenario::HeavyTail),
            imbalance: SeverityGrid::default_for(Scenario::Imbalance),
            label_flip: SeverityGrid::default_for(Scenario::LabelFlip),
        }
    }
}

impl SeverityGrids {
    #[must_use]
    pub fn get(&self, scenario: Scenario) -> &SeverityGrid {
        match scenario {
            Scenario::Baseline => &self.baseline,
            Scenario::HeavyTail => &self.heavy_tail,
            Scenario::Imbalance => &self.imbalance,
            Scenario::LabelFlip => &self.label_flip,
        }
    }

    pub fn get_mut(&mut self, scenario: Scenario) -> &mut SeverityGrid {
        match scenario {
            Scenario::Baseline => &mut self.baseline,
            Scenario::HeavyTail => &mut self.heavy_tail,
            Scenario::Imbalance => &mut self.imbalance,
            Scenario::LabelFlip => &mut self.label_flip,
        }
    }
}

/// Everything [`crate::study::run_study`] needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub experiment: ExperimentConfig,
    pub grids: SeverityGrids,
}
