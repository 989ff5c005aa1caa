//! Statistical properties of the study, checked on seeded, reduced-size sweeps.

use misspec_core::random::SimSeed;
use misspec_experiment::{
    config::ExperimentConfig,
    scenario::Scenario,
    sweep::{SweepResult, run_sweep},
};

const BAYES_ERROR: f64 = 0.123;

fn config(seed: u64, trials: usize) -> ExperimentConfig {
    ExperimentConfig {
        trials_per_value: trials,
        seed: Some(SimSeed::from_u64(seed)),
        ..ExperimentConfig::default()
    }
}

fn error_at(result: &SweepResult, severity: f64) -> f64 {
    result.point_at(severity).unwrap().mean_error
}

#[test]
fn test_baseline_matches_bayes_rate() {
    let result = run_sweep(Scenario::Baseline, &[1.0, 2.0], &config(1, 25)).unwrap();
    let mean = result.grand_mean();
    assert!((mean - BAYES_ERROR).abs() < 0.02, "baseline error = {mean}");
}

#[test]
fn test_heavy_tails_hurt_and_converge_to_baseline() {
    let result = run_sweep(Scenario::HeavyTail, &[2.0, 10.0, 40.0], &config(2, 20)).unwrap();
    let heavy = error_at(&result, 2.0);
    let light = error_at(&result, 40.0);
    assert!(heavy > light + 0.02, "dof 2: {heavy}, dof 40: {light}");
    assert!(error_at(&result, 10.0) < heavy);
    assert!((light - BAYES_ERROR).abs() < 0.025, "dof 40: {light}");
}

#[test]
fn test_imbalance_is_worst_at_the_extremes() {
    let result = run_sweep(Scenario::Imbalance, &[0.01, 0.5, 0.99], &config(3, 20)).unwrap();
    let balanced = error_at(&result, 0.5);
    assert!((balanced - BAYES_ERROR).abs() < 0.025, "m = 0.5: {balanced}");
    for extreme in [0.01, 0.99] {
        let err = error_at(&result, extreme);
        assert!(err > balanced + 0.03, "m = {extreme}: {err}");
    }
    let ratio = result.point_at(0.5).unwrap().mean_class1_ratio.unwrap();
    assert!((ratio - 0.5).abs() < 1e-9);
}

#[test]
fn test_heavy_tail_error_is_non_increasing_in_dof() {
    let dofs = [2.0, 4.0, 8.0, 16.0, 40.0];
    let result = run_sweep(Scenario::HeavyTail, &dofs, &config(6, 30)).unwrap();
    let errors = result.pairs().map(|(_, err)| err).collect::<Vec<_>>();
    for (w, pair) in errors.windows(2).zip(dofs.windows(2)) {
        // Monte Carlo noise allowance per step
        assert!(w[1] <= w[0] + 0.015, "dof {} -> {}: {errors:?}", pair[0], pair[1]);
    }
    assert!(errors[0] > errors[4] + 0.02, "{errors:?}");
}

#[test]
fn test_imbalance_is_symmetric() {
    let grid = [0.01, 0.2, 0.5, 0.8, 0.99];
    let result = run_sweep(Scenario::Imbalance, &grid, &config(7, 20)).unwrap();
    for (low, high) in [(0.01, 0.99), (0.2, 0.8)] {
        let a = error_at(&result, low);
        let b = error_at(&result, high);
        assert!((a - b).abs() < 0.03, "m = {low}: {a}, m = {high}: {b}");
    }
    let balanced = error_at(&result, 0.5);
    assert!(error_at(&result, 0.2) > balanced, "m = 0.5 should be the minimum");
    assert!(error_at(&result, 0.8) > balanced, "m = 0.5 should be the minimum");
}

#[test]
fn test_full_label_flip_mirrors_baseline() {
    let result = run_sweep(Scenario::LabelFlip, &[0.0, 1.0], &config(4, 20)).unwrap();
    let clean = error_at(&result, 0.0);
    let flipped = error_at(&result, 1.0);
    assert!((clean - BAYES_ERROR).abs() < 0.02, "m = 0: {clean}");
    assert!((flipped - (1.0 - BAYES_ERROR)).abs() < 0.02, "m = 1: {flipped}");
}

#[test]
fn test_seeded_sweep_is_reproducible() {
    let a = run_sweep(Scenario::LabelFlip, &[0.3], &config(5, 4)).unwrap();
    let b = run_sweep(Scenario::LabelFlip, &[0.3], &config(5, 4)).unwrap();
    assert_eq!(a, b);
}
