//! Monte Carlo sweeps measuring how LDA degrades under misspecified training data.
//!
//! # How a Study Runs
//!
//! 1. **Baseline** - normal latents, no perturbation; its grand mean error
//!    becomes the [`study::BaselineReference`]
//! 2. **Heavy tails** - Student-t latents, sweeping the degrees of freedom
//! 3. **Class imbalance** - the training partition is resampled toward one class
//! 4. **Label flips** - a share of training labels is inverted
//!
//! For every severity value each scenario repeats the trial pipeline
//! (see [`trial::run_trial`]) `trials_per_value` times and records the mean
//! error as one [`sweep::SweepPoint`].
//!
//! ```text
//! StudyConfig
//!     ↓
//! run_study ── per scenario ──→ run_sweep ── per severity ──→ trials (worker threads)
//!     ↓                              ↓                              ↓
//! StudyReport  ←──────────────  SweepResult  ←───────────────  TrialOutcome
//! ```
//!
//! # Reproducibility
//!
//! Seeds are forked deterministically: study seed → scenario seed → trial
//! seed. Results do not depend on how many worker threads are used, and a
//! run without an explicit seed records the one it drew.
//!
//! # Failed Trials
//!
//! A trial can fail, most notably when a perturbed training set loses a
//! class or its pooled covariance is singular. Depending on
//! [`config::FailurePolicy`] the sweep either aborts with the error or logs a
//! warning and counts the trial in [`sweep::SweepPoint::failed_trials`]; the
//! mean is never silently taken over fewer trials.

pub mod config;
pub mod scenario;
pub mod study;
pub mod sweep;
pub mod trial;
