//! Integration tests for the ranked result summary

use crate::test_helpers::reference_experiment;
use enzkin_rs::kinetics::{integrate_on_grid, IntegratorConfig, KineticConstants, KineticSystem};
use enzkin_rs::report::MISSING;
use enzkin_rs::{Experiment, FitOptions, Measurement, Mechanism, ParameterEstimator, ResultSummary};

/// Competitive inhibition assay in mM substrate and uM inhibitor.
fn inhibition_experiment() -> Experiment {
    let time = vec![0.0, 1.0, 2.0, 4.0, 6.0, 8.0];
    let constants = KineticConstants::new(10.0, 3.0).with_k_ic(2.0);
    let system = KineticSystem::new(Mechanism::Competitive.rate_law(), constants, false);

    let mut experiment = Experiment::new("s", "mM", "substrate", time.clone());
    for &inhibitor in &[0.0, 2.0, 6.0] {
        for &s0 in &[2.0, 8.0] {
            let states =
                integrate_on_grid(system, [s0, 0.1, 0.0, inhibitor], 0.0, &time, &IntegratorConfig::default())
                    .unwrap();
            experiment.add_measurement(
                Measurement::new(s0, 0.1)
                    .with_inhibitor(inhibitor, "uM")
                    .with_replicate(states.iter().map(|s| s[0]).collect()),
            );
        }
    }
    experiment
}

#[test]
fn test_summary_rows_are_sorted() {
    let mut estimator = ParameterEstimator::new(reference_experiment()).unwrap();
    let summary = estimator.fit_models(&FitOptions::default()).unwrap();

    for pair in summary.rows().windows(2) {
        assert!(pair[0].aic <= pair[1].aic);
    }
    assert_eq!(
        summary.columns(),
        &[
            "kcat [1/min]",
            "Km [mM]",
            "Ki competitive [mM]",
            "Ki uncompetitive [mM]"
        ]
    );
    assert_eq!(
        summary.value(Mechanism::Irreversible.name(), "Ki competitive [mM]"),
        Some(MISSING)
    );
    let kcat = summary.value(Mechanism::Irreversible.name(), "kcat [1/min]").unwrap();
    assert!(kcat.contains(" +/- ") && kcat.ends_with('%'));
}

#[test]
fn test_inhibitor_units_and_model_family() {
    let mut estimator = ParameterEstimator::new(inhibition_experiment()).unwrap();
    let summary = estimator.fit_models(&FitOptions::default()).unwrap();

    assert_eq!(summary.len(), 4);
    assert!(summary.columns().iter().any(|c| c == "Ki competitive [uM]"));
    assert!(summary.columns().iter().any(|c| c == "Ki uncompetitive [uM]"));
    assert!(summary.columns().iter().any(|c| c == "kcat [1/s]"));
    assert!(summary.get(Mechanism::Irreversible.name()).is_none());
}

#[test]
fn test_summary_display_and_json() {
    let mut estimator = ParameterEstimator::new(reference_experiment()).unwrap();
    let summary = estimator.fit_models(&FitOptions::default()).unwrap().clone();

    let table = summary.to_string();
    assert_eq!(table.lines().count(), summary.len() + 1);
    assert!(table.lines().next().unwrap().contains("Km [mM]"));

    let parsed: ResultSummary = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
    assert_eq!(parsed, summary);
}
