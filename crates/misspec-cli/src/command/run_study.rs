use std::path::PathBuf;

use misspec_experiment::{scenario::Scenario, study};

use super::ExperimentArg;
use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    #[clap(flatten)]
    pub(super) experiment: ExperimentArg,
    /// Restrict the study to these scenarios (repeatable); the baseline always runs
    #[arg(long = "scenario")]
    scenarios: Vec<Scenario>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let RunArg {
        experiment,
        scenarios,
        output,
    } = arg;
    let config = experiment.load()?;

    let report = if scenarios.is_empty() {
        study::run_study(&config)?
    } else {
        study::run_scenarios(&config, scenarios)?
    };

    eprintln!(
        "Baseline reference error: {:.4} ({} trials, fully flipped: {:.4})",
        report.baseline.mean_error,
        report.baseline.trials,
        report.baseline.fully_flipped_error(),
    );
    for sweep in &report.sweeps {
        eprintln!();
        util::print_sweep_table(sweep);
    }

    Output::save_json(&report, output.clone())?;
    Ok(())
}
