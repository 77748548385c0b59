//! Integration tests for model fitting through the estimator

use crate::test_helpers::{init_logging, reference_experiment, SyntheticAssay};
use approx::assert_relative_eq;
use enzkin_rs::{Experiment, FitOptions, InitialStatePolicy, KineticConstant, Measurement, Mechanism, ParameterEstimator};

#[test]
fn test_reference_experiment_end_to_end() {
    init_logging();
    let mut estimator = ParameterEstimator::new(reference_experiment()).unwrap();
    let summary = estimator.fit_models(&FitOptions::default()).unwrap().clone();

    assert_eq!(estimator.models().len(), 5);
    assert_eq!(summary.len(), 5);
    for mechanism in Mechanism::INHIBITOR_FREE {
        assert!(summary.get(mechanism.name()).is_some(), "{} missing", mechanism);
    }

    let lowest = summary.rows().iter().map(|r| r.aic).min().unwrap();
    assert_eq!(summary.rows()[0].aic, lowest);
    assert_eq!(estimator.best_model().unwrap().model().name(), summary.rows()[0].model);
}

#[test]
fn test_noise_free_michaelis_menten_is_recovered() {
    init_logging();
    let assay = SyntheticAssay::default();
    let mut estimator = ParameterEstimator::new(assay.experiment()).unwrap();
    estimator.fit_models(&FitOptions::default()).unwrap();

    let model = estimator.model(Mechanism::Irreversible.name()).unwrap().model();
    let result = model.result().unwrap();
    assert!(result.success, "{}", result.message);
    assert_relative_eq!(result.value(KineticConstant::KCat).unwrap(), assay.k_cat, max_relative = 1e-3);
    assert_relative_eq!(result.value(KineticConstant::Km).unwrap(), assay.km, max_relative = 1e-3);
}

#[test]
fn test_noisy_michaelis_menten_ranks_irreversible_near_top() {
    init_logging();
    let assay = SyntheticAssay::default().with_noise(0.05);
    let mut estimator = ParameterEstimator::new(assay.experiment()).unwrap();
    let summary = estimator.fit_models(&FitOptions::default()).unwrap();

    let best = summary.best().unwrap().aic;
    let irreversible = summary.get(Mechanism::Irreversible.name()).unwrap().aic;
    assert!(irreversible - best <= 6, "irreversible AIC {} vs best {}", irreversible, best);

    let fitted = estimator.model(Mechanism::Irreversible.name()).unwrap().model().result().unwrap();
    assert_relative_eq!(fitted.value(KineticConstant::KCat).unwrap(), assay.k_cat, max_relative = 0.1);
    assert_relative_eq!(fitted.value(KineticConstant::Km).unwrap(), assay.km, max_relative = 0.25);
    let stderr = fitted.stderr(KineticConstant::KCat).unwrap();
    assert!(stderr.is_finite() && stderr > 0.0);
}

#[test]
fn test_initial_state_policies_agree_on_exact_data() {
    let assay = SyntheticAssay::default();
    let mut estimator = ParameterEstimator::new(assay.experiment()).unwrap();

    for policy in [InitialStatePolicy::WindowStart, InitialStatePolicy::ExperimentStart] {
        let options = FitOptions::default()
            .with_start_time_index(2)
            .with_initial_state(policy)
            .with_parallel(false);
        estimator.fit_models(&options).unwrap();

        let model = estimator.model(Mechanism::Irreversible.name()).unwrap().model();
        assert_eq!(model.subset().n_times(), assay.time.len() - 2);
        let result = model.result().unwrap();
        assert_eq!(result.statistics.ndata, 8 * (assay.time.len() - 2));
        assert_relative_eq!(result.value(KineticConstant::KCat).unwrap(), assay.k_cat, max_relative = 1e-3);
    }
}

#[test]
fn test_enzyme_inactivation_adds_a_constant() {
    let assay = SyntheticAssay::default();
    let mut estimator = ParameterEstimator::new(assay.experiment()).unwrap();
    let summary = estimator
        .fit_models(&FitOptions::default().with_enzyme_inactivation(true))
        .unwrap();

    assert!(summary
        .columns()
        .iter()
        .any(|c| c == "ki time-dep enzyme-inactiv. [1/min]"));
    for model in estimator.models() {
        assert!(model.parameters().contains("K_ie"));
        assert!(model.enzyme_inactivation());
    }
}

#[test]
fn test_parallel_and_sequential_fits_match() {
    let experiment = SyntheticAssay::default().with_noise(0.02).experiment();
    let mut estimator = ParameterEstimator::new(experiment).unwrap();

    let sequential = estimator
        .fit_models(&FitOptions::default().with_parallel(false))
        .unwrap()
        .clone();
    let parallel = estimator
        .fit_models(&FitOptions::default().with_parallel(true))
        .unwrap()
        .clone();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_subset_rows_are_fitted_alone() {
    let assay = SyntheticAssay::default();
    let mut estimator = ParameterEstimator::new(assay.experiment()).unwrap();
    let options = FitOptions::default().with_initial_substrates(vec![20.0, 5.0]);
    estimator.fit_models(&options).unwrap();

    let selection = estimator.model(Mechanism::Irreversible.name()).unwrap();
    assert_eq!(selection.subset().unique_initial_substrates(), vec![5.0, 20.0]);
    assert_eq!(selection.model().result().unwrap().statistics.ndata, 4 * assay.time.len());

    // Re-simulating the fitted model reproduces the exact data.
    let trace = assay.substrate_trace(20.0);
    let simulated = selection.model().simulate(0, &assay.time).unwrap();
    for (t, expected) in trace.iter().enumerate() {
        assert_relative_eq!(simulated[[t, 0]], *expected, epsilon = 1e-3);
    }
}

#[test]
fn test_depleted_assay_with_long_tail_fits_every_model() {
    init_logging();
    // Substrate is used up within a minute and then sampled hourly.
    let experiment = Experiment::new("s", "mM", "substrate", vec![0.0, 60.0, 3600.0, 7200.0])
        .with_measurement(Measurement::new(100.0, 1.0).with_replicate(vec![100.0, 1.0, 0.0, 0.0]))
        .with_measurement(Measurement::new(50.0, 1.0).with_replicate(vec![50.0, 0.5, 0.0, 0.0]));
    let mut estimator = ParameterEstimator::new(experiment).unwrap();
    let summary = estimator
        .fit_models(&FitOptions::default().with_parallel(false))
        .unwrap()
        .clone();

    assert_eq!(summary.len(), 5);
    for mechanism in Mechanism::INHIBITOR_FREE {
        let row = summary.get(mechanism.name());
        assert!(row.is_some(), "{} missing from the summary", mechanism);
    }
    let irreversible = estimator.model(Mechanism::Irreversible.name()).unwrap().model();
    let result = irreversible.result().unwrap();
    assert!(result.aic().is_finite());
    assert!(result.statistics.chisqr < 100.0, "chisqr {}", result.statistics.chisqr);
}
