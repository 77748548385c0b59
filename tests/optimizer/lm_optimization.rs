//! Integration tests for LM optimization on kinetic problems.

use crate::test_helpers::SyntheticAssay;
use approx::assert_relative_eq;
use enzkin_rs::fitting::KineticProblem;
use enzkin_rs::lm::{DecompositionMethod, LevenbergMarquardt, LmConfig};
use enzkin_rs::{FitOptions, InitialGuesses, KineticModel, Mechanism, NormalizedDataset, Problem, Result, Subset};
use ndarray::{array, Array1, Array2};
use std::sync::Arc;

/// Initial-rate Michaelis-Menten: v = Vmax S / (Km + S)
struct InitialRates {
    substrate: Array1<f64>,
    rate: Array1<f64>,
}

impl InitialRates {
    fn generate(vmax: f64, km: f64) -> Self {
        let substrate = array![0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0];
        let rate = substrate.mapv(|s| vmax * s / (km + s));
        Self { substrate, rate }
    }
}

impl Problem for InitialRates {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let (vmax, km) = (params[0], params[1]);
        Ok(self
            .substrate
            .iter()
            .zip(self.rate.iter())
            .map(|(s, v)| v - vmax * s / (km + s))
            .collect())
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        self.substrate.len()
    }

    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>> {
        let (vmax, km) = (params[0], params[1]);
        let mut jac = Array2::zeros((self.substrate.len(), 2));
        for (i, &s) in self.substrate.iter().enumerate() {
            jac[[i, 0]] = -s / (km + s);
            jac[[i, 1]] = vmax * s / (km + s).powi(2);
        }
        Ok(jac)
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}

#[test]
fn test_initial_rate_fit_with_analytic_jacobian() {
    let problem = InitialRates::generate(3.5, 2.5);
    let result = LevenbergMarquardt::new()
        .minimize(&problem, array![1.0, 1.0])
        .unwrap();

    assert!(result.success, "{}", result.message);
    assert_relative_eq!(result.params[0], 3.5, epsilon = 1e-6);
    assert_relative_eq!(result.params[1], 2.5, epsilon = 1e-6);
}

#[test]
fn test_custom_config_is_used() {
    let problem = InitialRates::generate(3.5, 2.5);
    let config = LmConfig {
        max_iterations: 2,
        ..LmConfig::default()
    };
    let optimizer = LevenbergMarquardt::with_config(config);
    assert_eq!(optimizer.config().max_iterations, 2);

    let result = optimizer.minimize(&problem, array![0.1, 40.0]).unwrap();
    assert!(!result.success);
    assert!(result.iterations <= 2);
    assert!(result.message.contains("Maximum iterations"));
}

#[test]
fn test_kinetic_problem_in_bounded_coordinates() {
    let assay = SyntheticAssay::default();
    let dataset = NormalizedDataset::from_experiment(&assay.experiment()).unwrap();
    let guesses = InitialGuesses::from_dataset(&dataset).unwrap();
    let subset = Arc::new(Subset::full(&dataset).unwrap());
    let model = KineticModel::new(Mechanism::Irreversible, subset, guesses, &FitOptions::default()).unwrap();

    let problem = KineticProblem::new(&model);
    assert_eq!(problem.parameter_count(), 2);
    assert_eq!(problem.residual_count(), 8 * assay.time.len());

    for method in [DecompositionMethod::Cholesky, DecompositionMethod::SVD, DecompositionMethod::Auto] {
        let start = model.seed_parameters().varying_internal_values().unwrap();
        let result = LevenbergMarquardt::new()
            .with_decomposition_method(method)
            .minimize(&problem, start)
            .unwrap();
        assert!(result.success, "{:?}: {}", method, result.message);

        let external = model.seed_parameters().external_from_internal(&result.params).unwrap();
        assert_relative_eq!(external[0], assay.k_cat, max_relative = 1e-3);
        assert_relative_eq!(external[1], assay.km, max_relative = 1e-3);
    }
}
