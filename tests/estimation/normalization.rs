//! Integration tests for data normalization and initial guesses

use crate::test_helpers::reference_experiment;
use approx::assert_relative_eq;
use enzkin_rs::{Experiment, InitialGuesses, KineticsError, Measurement, NormalizedDataset, Stoichiometry};

#[test]
fn test_reference_experiment_normalizes() {
    let dataset = NormalizedDataset::from_experiment(&reference_experiment()).unwrap();

    assert_eq!(dataset.n_rows(), 9);
    assert_eq!(dataset.n_times(), 6);
    assert_eq!(dataset.stoichiometry(), Stoichiometry::Product);
    assert!(dataset.is_inhibitor_free());
    assert_eq!(dataset.known_initial_substrates(), vec![100.0, 200.0, 300.0]);

    // Substrate is derived from the measured product.
    assert_eq!(dataset.substrate()[[0, 1]], 92.0);
    assert_eq!(dataset.substrate()[[6, 5]], 300.0 - 89.8);
}

#[test]
fn test_mass_balance_holds_everywhere() {
    let dataset = NormalizedDataset::from_experiment(&reference_experiment()).unwrap();

    for row in 0..dataset.n_rows() {
        for t in 0..dataset.n_times() {
            assert_relative_eq!(
                dataset.product()[[row, t]] + dataset.substrate()[[row, t]],
                dataset.initial_substrate()[row],
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn test_inhibitor_is_broadcast_per_row() {
    let experiment = Experiment::new("min", "mM", "substrate", vec![0.0, 1.0, 2.0])
        .with_measurement(
            Measurement::new(10.0, 0.1)
                .with_inhibitor(2.5, "uM")
                .with_replicate(vec![10.0, 9.0, 8.0]),
        )
        .with_measurement(Measurement::new(10.0, 0.1).with_replicate(vec![10.0, 8.0, 6.0]));
    let dataset = NormalizedDataset::from_experiment(&experiment).unwrap();

    assert!(!dataset.is_inhibitor_free());
    assert!(dataset.inhibitor().row(0).iter().all(|&i| i == 2.5));
    assert!(dataset.inhibitor().row(1).iter().all(|&i| i == 0.0));
}

#[test]
fn test_unknown_stoichiometry() {
    let experiment = Experiment::new("min", "mM", "enzyme", vec![0.0, 1.0])
        .with_measurement(Measurement::new(10.0, 0.1).with_replicate(vec![10.0, 9.0]));

    match NormalizedDataset::from_experiment(&experiment) {
        Err(KineticsError::UnknownStoichiometry(selector)) => assert_eq!(selector, "enzyme"),
        other => panic!("expected stoichiometry error, got {:?}", other),
    }
}

#[test]
fn test_product_above_initial_substrate_is_rejected() {
    let experiment = Experiment::new("min", "mM", "product", vec![0.0, 1.0])
        .with_measurement(Measurement::new(10.0, 0.1).with_replicate(vec![0.0, 15.0]));

    let err = NormalizedDataset::from_experiment(&experiment).unwrap_err();
    assert!(matches!(err, KineticsError::NegativeConcentration { array: "Substrate", .. }));
    assert!(err.to_string().contains("negative concentrations"));
}

#[test]
fn test_replicate_length_must_match_grid() {
    let experiment = Experiment::new("min", "mM", "product", vec![0.0, 1.0, 2.0])
        .with_measurement(Measurement::new(10.0, 0.1).with_replicate(vec![0.0, 1.0]));

    assert!(matches!(
        NormalizedDataset::from_experiment(&experiment),
        Err(KineticsError::DimensionMismatch(_))
    ));
}

#[test]
fn test_experiment_json_roundtrip_normalizes_identically() {
    let experiment = reference_experiment();
    let json = experiment.to_json_string().unwrap();
    let parsed = Experiment::from_json_str(&json).unwrap();

    assert_eq!(parsed, experiment);
    assert_eq!(
        NormalizedDataset::from_experiment(&parsed).unwrap(),
        NormalizedDataset::from_experiment(&experiment).unwrap()
    );
}

#[test]
fn test_guesses_from_reference_data() {
    let dataset = NormalizedDataset::from_experiment(&reference_experiment()).unwrap();
    let guesses = InitialGuesses::from_dataset(&dataset).unwrap();

    // Fastest interval: row 7, 0 -> 2 min, 21.6 mM / 2 min on 0.11 enzyme.
    assert_relative_eq!(guesses.km, 10.8 / 2.0, epsilon = 1e-9);
    assert_relative_eq!(guesses.k_cat, 10.8 / 0.11, epsilon = 1e-9);
}
