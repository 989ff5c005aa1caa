use std::{io, path::PathBuf};

use clap::{Parser, Subcommand};
use misspec_core::random::SimSeed;
use misspec_experiment::config::{FailurePolicy, StudyConfig};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use self::{run_study::RunArg, sweep::SweepArg, trial::TrialArg};
use crate::util;

mod run_study;
mod sweep;
mod trial;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to run (defaults to the full study)
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the baseline and every misspecification sweep
    Run(#[clap(flatten)] RunArg),
    /// Run the sweep of a single scenario
    Sweep(#[clap(flatten)] SweepArg),
    /// Run one trial and show the fitted discriminant functions
    Trial(#[clap(flatten)] TrialArg),
}

/// Study parameters shared by every mode.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ExperimentArg {
    /// JSON study configuration; the flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of class-0 rows generated per trial
    #[arg(long)]
    n_class0: Option<usize>,
    /// Number of class-1 rows generated per trial
    #[arg(long)]
    n_class1: Option<usize>,
    /// Trials per severity value
    #[arg(long)]
    trials: Option<usize>,
    /// Share of each class used for training, in (0, 1]
    #[arg(long)]
    train_fraction: Option<f64>,
    /// Draw training rows from the whole sample instead of per class
    #[arg(long)]
    no_stratify: bool,
    /// Master seed as up to 32 hex digits
    #[arg(long)]
    seed: Option<SimSeed>,
    /// Worker threads trials are distributed over
    #[arg(long)]
    workers: Option<usize>,
    /// Stop at the first failed trial instead of excluding it from the mean
    #[arg(long)]
    abort_on_failure: bool,
}

impl ExperimentArg {
    pub(crate) fn load(&self) -> anyhow::Result<StudyConfig> {
        let mut config: StudyConfig = match &self.config {
            Some(path) => util::read_json_file("study config", path)?,
            None => StudyConfig::default(),
        };

        let experiment = &mut config.experiment;
        if let Some(n) = self.n_class0 {
            experiment.n_class0 = n;
        }
        if let Some(n) = self.n_class1 {
            experiment.n_class1 = n;
        }
        if let Some(trials) = self.trials {
            experiment.trials_per_value = trials;
        }
        if let Some(fraction) = self.train_fraction {
            experiment.train_fraction = fraction;
        }
        if self.no_stratify {
            experiment.stratify_split = false;
        }
        if let Some(seed) = self.seed {
            experiment.seed = Some(seed);
        }
        if let Some(workers) = self.workers {
            experiment.workers = workers;
        }
        if self.abort_on_failure {
            experiment.failure_policy = FailurePolicy::Abort;
        }
        experiment.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing();
    match args.mode.unwrap_or(Mode::Run(RunArg::default())) {
        Mode::Run(arg) => run_study::run(&arg)?,
        Mode::Sweep(arg) => sweep::run(&arg)?,
        Mode::Trial(arg) => trial::run(&arg)?,
    }
    Ok(())
}
