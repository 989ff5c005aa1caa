use std::path::PathBuf;

use misspec_experiment::{config::SeverityGrid, scenario::Scenario, sweep};

use super::ExperimentArg;
use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SweepArg {
    #[clap(flatten)]
    pub(super) experiment: ExperimentArg,
    /// Scenario to sweep: baseline, heavy-tail, imbalance or label-flip
    #[arg(long)]
    scenario: Scenario,
    /// Comma-separated severity values, strictly increasing (defaults to the configured grid)
    #[arg(long, value_delimiter = ',', conflicts_with = "range")]
    severities: Vec<f64>,
    /// Evenly spaced severities from START to END inclusive
    #[arg(long, num_args = 3, value_names = ["START", "END", "STEP"])]
    range: Option<Vec<f64>>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SweepArg) -> anyhow::Result<()> {
    let SweepArg {
        experiment,
        scenario,
        severities,
        range,
        output,
    } = arg;
    let mut config = experiment.load()?;
    let grid = config.grids.get_mut(*scenario);
    if let Some(&[start, end, step]) = range.as_deref() {
        *grid = SeverityGrid::range(start, end, step)?;
    } else if !severities.is_empty() {
        grid.0.clone_from(severities);
    }

    let result = sweep::run_sweep(
        *scenario,
        config.grids.get(*scenario).values(),
        &config.experiment,
    )?;
    util::print_sweep_table(&result);

    Output::save_json(&result, output.clone())?;
    Ok(())
}
