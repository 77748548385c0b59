//! Integration tests for fit statistics and covariance estimates

use approx::assert_relative_eq;
use enzkin_rs::uncertainty::{calculate_correlation, calculate_covariance, standard_errors_from_covariance, FitStatistics};
use enzkin_rs::KineticsError;
use ndarray::{array, Array1};

#[test]
fn test_statistics_follow_lmfit_conventions() {
    let residuals = array![0.1, -0.2, 0.15, -0.05, 0.0, 0.1];
    let stats = FitStatistics::new(&residuals, 2);

    let chisqr: f64 = residuals.iter().map(|r| r * r).sum();
    assert_eq!(stats.ndata, 6);
    assert_eq!(stats.nfree, 4);
    assert_relative_eq!(stats.chisqr, chisqr);
    assert_relative_eq!(stats.redchi, chisqr / 4.0);
    assert_relative_eq!(stats.aic, 6.0 * (chisqr / 6.0).ln() + 4.0);
    assert_relative_eq!(stats.bic, 6.0 * (chisqr / 6.0).ln() + 6f64.ln() * 2.0);
}

#[test]
fn test_aic_penalises_parameters() {
    let residuals = Array1::from_elem(20, 0.1);
    let two = FitStatistics::new(&residuals, 2);
    let three = FitStatistics::new(&residuals, 3);
    assert_relative_eq!(three.aic - two.aic, 2.0, epsilon = 1e-12);
}

#[test]
fn test_covariance_of_a_straight_line() {
    // J = [x, 1] for y = a x + b
    let jacobian = array![[1.0, 1.0], [2.0, 1.0], [3.0, 1.0], [4.0, 1.0]];
    let covar = calculate_covariance(&jacobian, 0.5).unwrap();

    // (JᵀJ)⁻¹ = [[0.2, -0.5], [-0.5, 1.5]]
    assert_relative_eq!(covar[[0, 0]], 0.1, epsilon = 1e-12);
    assert_relative_eq!(covar[[0, 1]], -0.25, epsilon = 1e-12);
    assert_relative_eq!(covar[[1, 1]], 0.75, epsilon = 1e-12);

    let stderr = standard_errors_from_covariance(&covar);
    assert_relative_eq!(stderr[0], 0.1f64.sqrt(), epsilon = 1e-12);

    let correl = calculate_correlation(&covar);
    assert_relative_eq!(correl[[0, 1]], -0.25 / (0.1f64 * 0.75).sqrt(), epsilon = 1e-12);
    assert_eq!(correl[[1, 1]], 1.0);
}

#[test]
fn test_degenerate_jacobian_is_singular() {
    // Second column has no influence on the residuals.
    let jacobian = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]];
    assert!(matches!(
        calculate_covariance(&jacobian, 1.0),
        Err(KineticsError::SingularMatrix(_))
    ));
}
