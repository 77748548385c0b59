//! # Uncertainty Calculation
//!
//! Goodness-of-fit statistics and covariance-based standard errors for fitted
//! kinetic constants. The conventions follow lmfit-py, so the Akaike criterion
//! reported for each mechanism matches what `lmfit.minimize` prints:
//!
//! - `chisqr = Σ r²`
//! - `redchi = chisqr / (ndata - nvarys)`
//! - `aic = ndata · ln(chisqr / ndata) + 2 · nvarys`
//! - `bic = ndata · ln(chisqr / ndata) + ln(ndata) · nvarys`

mod covariance;

pub use covariance::{
    calculate_correlation, calculate_covariance, standard_errors_from_covariance,
    MAX_CONDITION_NUMBER,
};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Smallest chi-square used inside the logarithm, so perfect fits stay finite.
const MIN_CHISQR: f64 = 1e-250;

/// Goodness-of-fit summary for one least-squares fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    /// Number of residuals
    pub ndata: usize,
    /// Number of varied parameters
    pub nvarys: usize,
    /// Degrees of freedom (ndata - nvarys)
    pub nfree: usize,
    /// Chi-square value at minimum
    pub chisqr: f64,
    /// Reduced chi-square (chi^2 / nfree); NaN without degrees of freedom
    pub redchi: f64,
    /// Akaike information criterion
    pub aic: f64,
    /// Bayesian information criterion
    pub bic: f64,
}

impl FitStatistics {
    pub fn new(residuals: &Array1<f64>, nvarys: usize) -> Self {
        let ndata = residuals.len();
        let chisqr: f64 = residuals.iter().map(|r| r * r).sum();
        let nfree = ndata.saturating_sub(nvarys);

        let redchi = if nfree > 0 {
            chisqr / nfree as f64
        } else {
            f64::NAN
        };

        let (aic, bic) = if ndata > 0 {
            let n = ndata as f64;
            let neg2_log_likelihood = n * (chisqr.max(MIN_CHISQR) / n).ln();
            (
                neg2_log_likelihood + 2.0 * nvarys as f64,
                neg2_log_likelihood + n.ln() * nvarys as f64,
            )
        } else {
            (f64::NAN, f64::NAN)
        };

        Self {
            ndata,
            nvarys,
            nfree,
            chisqr,
            redchi,
            aic,
            bic,
        }
    }

    /// Statistics of a fit that produced no residuals.
    pub fn undefined(nvarys: usize) -> Self {
        Self {
            ndata: 0,
            nvarys,
            nfree: 0,
            chisqr: f64::NAN,
            redchi: f64::NAN,
            aic: f64::NAN,
            bic: f64::NAN,
        }
    }
}
