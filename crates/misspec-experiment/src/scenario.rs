//! The four study scenarios and what their severity parameter means.

use std::{fmt, str::FromStr};

use misspec_core::{
    InvalidParameterError, Sample,
    generator::LatentDistribution,
    perturb,
    random::RandomSource,
};
use serde::{Deserialize, Serialize};

/// A family of training-data misspecifications indexed by one severity value.
///
/// | scenario     | severity                       | latents        | training perturbation      |
/// |--------------|--------------------------------|----------------|----------------------------|
/// | `baseline`   | nominal replicate index        | normal         | none                       |
/// | `heavy-tail` | Student-t degrees of freedom   | Student-t(dof) | none                       |
/// | `imbalance`  | retained share of class 0, `m` | normal         | [`perturb::imbalance`]     |
/// | `label-flip` | flipped share of rows, `m`     | normal         | [`perturb::flip_labels`]   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    Baseline,
    HeavyTail,
    Imbalance,
    LabelFlip,
}

/// What a perturbation did to the training partition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerturbationEffect {
    /// Realized class-1 share after imbalance resampling.
    pub class1_ratio: Option<f64>,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Baseline,
        Scenario::HeavyTail,
        Scenario::Imbalance,
        Scenario::LabelFlip,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::HeavyTail => "heavy-tail",
            Scenario::Imbalance => "imbalance",
            Scenario::LabelFlip => "label-flip",
        }
    }

    /// Human-readable meaning of the severity value.
    #[must_use]
    pub const fn parameter_name(self) -> &'static str {
        match self {
            Scenario::Baseline => "replicate",
            Scenario::HeavyTail => "degrees of freedom",
            Scenario::Imbalance => "retained class-0 fraction",
            Scenario::LabelFlip => "flip fraction",
        }
    }

    /// Rejects severity values outside the scenario's domain.
    pub fn validate_severity(self, severity: f64) -> Result<(), InvalidParameterError> {
        match self {
            Scenario::Baseline if !severity.is_finite() => Err(InvalidParameterError::new(
                "baseline replicate",
                severity,
                "a finite value",
            )),
            Scenario::Baseline => Ok(()),
            Scenario::HeavyTail => RandomSource::student_t(severity).map(|_| ()),
            Scenario::Imbalance | Scenario::LabelFlip if !(0.0..=1.0).contains(&severity) => Err(
                InvalidParameterError::new("severity", severity, "a value in [0, 1]"),
            ),
            Scenario::Imbalance | Scenario::LabelFlip => Ok(()),
        }
    }

    /// Checks a whole severity grid: non-empty, every value in the
    /// scenario's domain, strictly increasing.
    pub fn validate_grid(self, severities: &[f64]) -> Result<(), InvalidParameterError> {
        if severities.is_empty() {
            return Err(InvalidParameterError::new("severity count", 0.0, "at least 1 value"));
        }
        for &severity in severities {
            self.validate_severity(severity)?;
        }
        if let Some(w) = severities.windows(2).find(|w| w[0] >= w[1]) {
            return Err(InvalidParameterError::new(
                "severity order",
                w[1],
                "strictly increasing severities",
            ));
        }
        Ok(())
    }

    /// Latent distribution used to generate data at `severity`.
    #[must_use]
    pub fn distribution(self, severity: f64) -> LatentDistribution {
        match self {
            Scenario::HeavyTail => LatentDistribution::StudentT { dof: severity },
            Scenario::Baseline | Scenario::Imbalance | Scenario::LabelFlip => {
                LatentDistribution::Normal
            }
        }
    }

    /// Applies the scenario's corruption to the training partition.
    pub fn perturb_training(
        self,
        train: Sample,
        severity: f64,
        rng: &mut RandomSource,
    ) -> Result<(Sample, PerturbationEffect), InvalidParameterError> {
        match self {
            Scenario::Baseline | Scenario::HeavyTail => Ok((train, PerturbationEffect::default())),
            Scenario::Imbalance => {
                let skewed = perturb::imbalance(&train, severity, rng)?;
                Ok((
                    skewed.sample,
                    PerturbationEffect {
                        class1_ratio: skewed.class1_ratio,
                    },
                ))
            }
            Scenario::LabelFlip => Ok((
                perturb::flip_labels(&train, severity, rng)?,
                PerturbationEffect::default(),
            )),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown scenario {input:?} (expected baseline, heavy-tail, imbalance or label-flip)")]
pub struct ParseScenarioError {
    input: String,
}

impl FromStr for Scenario {
    type Err = ParseScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseScenarioError { input: s.to_owned() })
    }
}
