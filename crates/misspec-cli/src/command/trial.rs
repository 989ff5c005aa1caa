use std::path::PathBuf;

use misspec_core::{
    Label,
    random::{RandomSource, SimSeed},
};
use misspec_experiment::{
    scenario::Scenario,
    trial::{TrialDetail, run_trial_detailed},
};
use rand::Rng as _;
use serde::Serialize;

use super::ExperimentArg;
use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrialArg {
    #[clap(flatten)]
    pub(super) experiment: ExperimentArg,
    /// Scenario the trial belongs to
    #[arg(long, default_value = "baseline")]
    scenario: Scenario,
    /// Severity value of the scenario
    #[arg(long, default_value_t = 1.0)]
    severity: f64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TrialRecord<'a> {
    scenario: Scenario,
    severity: f64,
    seed: SimSeed,
    #[serde(flatten)]
    detail: &'a TrialDetail,
}

pub(crate) fn run(arg: &TrialArg) -> anyhow::Result<()> {
    let TrialArg {
        experiment,
        scenario,
        severity,
        output,
    } = arg;
    let config = experiment.load()?.experiment;
    scenario.validate_severity(*severity)?;

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = RandomSource::with_seed(seed);
    let detail = run_trial_detailed(*scenario, *severity, &config, &mut rng)?;

    let [train0, train1] = detail.train_counts;
    eprintln!(
        "{scenario} trial, {} = {severity}, seed {seed}",
        scenario.parameter_name()
    );
    eprintln!("  Training rows: {train0} class 0, {train1} class 1");
    eprintln!("  Test rows:     {}", detail.test_records);
    eprintln!("  Discriminants:");
    for label in Label::ALL {
        let d = detail.model.discriminant(label);
        eprintln!(
            "    δ{}(x) = {:+.4}·x1 {:+.4}·x2 {:+.4}",
            label.index(),
            d.weights[0],
            d.weights[1],
            d.intercept
        );
    }
    eprintln!("  Error rate:    {:.4}", detail.outcome.error);

    let record = TrialRecord {
        scenario: *scenario,
        severity: *severity,
        seed,
        detail: &detail,
    };
    Output::save_json(&record, output.clone())?;
    Ok(())
}
