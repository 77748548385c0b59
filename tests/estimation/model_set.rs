//! Integration tests for model-set construction

use crate::test_helpers::reference_experiment;
use enzkin_rs::kinetics::Driver;
use enzkin_rs::{
    build_model_set, Experiment, FitOptions, InitialGuesses, Measurement, Mechanism, NormalizedDataset, Subset,
    SubsetSpec,
};
use std::sync::Arc;

fn inhibitor_experiment(first_inhibitor: f64) -> Experiment {
    Experiment::new("min", "mM", "substrate", vec![0.0, 1.0, 2.0, 3.0])
        .with_measurement(
            Measurement::new(10.0, 0.1)
                .with_inhibitor(first_inhibitor, "uM")
                .with_replicate(vec![10.0, 9.2, 8.5, 7.9]),
        )
        .with_measurement(
            Measurement::new(12.0, 0.1)
                .with_inhibitor(0.0, "uM")
                .with_replicate(vec![12.0, 10.8, 9.7, 8.7]),
        )
}

fn model_set(experiment: &Experiment, spec: SubsetSpec) -> Vec<enzkin_rs::KineticModel> {
    let dataset = NormalizedDataset::from_experiment(experiment).unwrap();
    let guesses = InitialGuesses::from_dataset(&dataset).unwrap();
    let subset = Arc::new(Subset::select(&dataset, &spec).unwrap());
    build_model_set(dataset.is_inhibitor_free(), subset, guesses, &FitOptions::default()).unwrap()
}

#[test]
fn test_zero_inhibitor_gives_five_models() {
    let models = model_set(&inhibitor_experiment(0.0), SubsetSpec::new());
    let mechanisms: Vec<_> = models.iter().map(|m| m.mechanism()).collect();
    assert_eq!(mechanisms, Mechanism::INHIBITOR_FREE.to_vec());
}

#[test]
fn test_any_inhibitor_gives_four_models() {
    let models = model_set(&inhibitor_experiment(5.0), SubsetSpec::new());
    let mechanisms: Vec<_> = models.iter().map(|m| m.mechanism()).collect();
    assert_eq!(mechanisms, Mechanism::WITH_INHIBITOR.to_vec());

    for model in &models {
        assert_eq!(model.mechanism().driver(), Driver::Inhibitor);
        assert_eq!(model.initial_state().driver.to_vec(), vec![5.0, 0.0]);
    }
}

#[test]
fn test_family_follows_full_dataset() {
    // The selected row has no inhibitor, but the experiment does.
    let spec = SubsetSpec::new().with_initial_substrates(vec![12.0]);
    let dataset = NormalizedDataset::from_experiment(&inhibitor_experiment(5.0)).unwrap();
    let subset = Subset::select(&dataset, &spec).unwrap();
    assert_eq!(subset.n_rows(), 1);
    assert!(subset.inhibitor().iter().all(|&i| i == 0.0));

    let models = model_set(&inhibitor_experiment(5.0), spec);
    assert_eq!(models.len(), 4);
}

#[test]
fn test_models_share_subset_and_guesses() {
    let models = model_set(&reference_experiment(), SubsetSpec::new());
    let first = &models[0];

    for model in &models[1..] {
        assert_eq!(model.subset(), first.subset());
        assert_eq!(model.guesses(), first.guesses());
        assert_eq!(model.start_time(), 0.0);
    }
    assert_eq!(models[4].initial_state().driver, models[4].initial_state().substrate);
    assert!(models[1].initial_state().driver.iter().all(|&p| p == 0.0));
}

#[test]
fn test_building_twice_is_identical() {
    let first = model_set(&reference_experiment(), SubsetSpec::new().with_start_time_index(2));
    let second = model_set(&reference_experiment(), SubsetSpec::new().with_start_time_index(2));

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.name(), b.name());
        assert_eq!(a.guesses(), b.guesses());
        assert_eq!(a.initial_state(), b.initial_state());
        assert_eq!(a.seed_parameters(), b.seed_parameters());
    }
}
