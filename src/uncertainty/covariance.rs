//! # Covariance Matrix Calculations
//!
//! Covariance, correlation and standard errors from the Jacobian at the
//! optimum, following lmfit-py: `covar = redchi * inv(JᵀJ)`.

use crate::error::{KineticsError, Result};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// Largest condition number of `JᵀJ` accepted for inversion.
pub const MAX_CONDITION_NUMBER: f64 = 1e14;

/// Calculate covariance matrix from Jacobian matrix.
///
/// For nonlinear least-squares problems, the covariance matrix is estimated as:
///   covar = redchi * inv(J^T * J)
/// where:
///   - J is the Jacobian matrix
///   - redchi is the reduced chi-square (chi^2 / dof)
///
/// Fails with [`KineticsError::SingularMatrix`] when `JᵀJ` is singular or so
/// ill-conditioned that its inverse is meaningless.
pub fn calculate_covariance(jacobian: &Array2<f64>, redchi: f64) -> Result<Array2<f64>> {
    if jacobian.iter().any(|v| !v.is_finite()) {
        return Err(KineticsError::SingularMatrix(
            "Jacobian contains non-finite entries".to_string(),
        ));
    }

    let jtj = jacobian.t().dot(jacobian);
    let n = jtj.nrows();
    let matrix = DMatrix::from_fn(n, n, |i, j| jtj[[i, j]]);

    let singular_values = matrix.clone().svd(false, false).singular_values;
    let largest = singular_values.max();
    let smallest = singular_values.min();
    if n > 0 && (smallest <= 0.0 || largest / smallest > MAX_CONDITION_NUMBER) {
        return Err(KineticsError::SingularMatrix(format!(
            "JᵀJ is ill-conditioned (singular values {:.3e} .. {:.3e})",
            smallest, largest
        )));
    }

    let inverse = matrix
        .try_inverse()
        .ok_or_else(|| KineticsError::SingularMatrix("JᵀJ is not invertible".to_string()))?;

    Ok(Array2::from_shape_fn((n, n), |(i, j)| inverse[(i, j)] * redchi))
}

/// Calculate correlation matrix from covariance matrix.
///
///   correl[i,j] = covar[i,j] / sqrt(covar[i,i] * covar[j,j])
pub fn calculate_correlation(covar: &Array2<f64>) -> Array2<f64> {
    let n = covar.nrows();
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            return 1.0;
        }
        let denom = (covar[[i, i]] * covar[[j, j]]).sqrt();
        if denom > 0.0 {
            covar[[i, j]] / denom
        } else {
            0.0
        }
    })
}

/// Extract standard errors from the covariance matrix.
///
/// Square roots of the diagonal; a non-positive or non-finite variance yields
/// `NaN` (undefined) rather than zero.
pub fn standard_errors_from_covariance(covar: &Array2<f64>) -> Array1<f64> {
    covar
        .diag()
        .mapv(|v| if v > 0.0 && v.is_finite() { v.sqrt() } else { f64::NAN })
}
