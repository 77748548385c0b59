//! Initial parameter guesses from finite-difference reaction rates.

use crate::dataset::NormalizedDataset;
use crate::error::{KineticsError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Seeds for the two constants every mechanism shares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialGuesses {
    pub k_cat: f64,
    pub km: f64,
}

impl InitialGuesses {
    /// Estimate seeds from the full, unsubset dataset.
    ///
    /// `k_cat` is the largest observed rate per unit enzyme and `Km` is half the
    /// largest observed rate. Non-finite rates (zero enzyme, repeated time
    /// points) are ignored.
    pub fn from_dataset(dataset: &NormalizedDataset) -> Result<Self> {
        let rates = reaction_rates(dataset);

        let max_rate = nan_max(rates.iter().copied());
        let max_turnover = nan_max(
            rates
                .axis_iter(Axis(0))
                .zip(dataset.enzyme().iter())
                .flat_map(|(row, &enzyme)| row.into_iter().map(move |rate| rate / enzyme)),
        );

        match (max_turnover, max_rate) {
            (Some(k_cat), Some(max_rate)) if k_cat > 0.0 && max_rate > 0.0 => {
                let guesses = Self {
                    k_cat,
                    km: max_rate / 2.0,
                };
                log::debug!("initial guesses: k_cat = {:.5}, Km = {:.5}", guesses.k_cat, guesses.km);
                Ok(guesses)
            }
            _ => Err(KineticsError::InvalidInput(
                "no positive finite reaction rate: need at least two time points, a changing signal and a nonzero enzyme concentration"
                    .to_string(),
            )),
        }
    }
}

/// `|Δsubstrate / Δtime|` per row and interval, shape `[rows, times - 1]`.
pub fn reaction_rates(dataset: &NormalizedDataset) -> Array2<f64> {
    let substrate = dataset.substrate();
    let time = dataset.time();
    let n_intervals = dataset.n_times().saturating_sub(1);

    Array2::from_shape_fn((dataset.n_rows(), n_intervals), |(row, t)| {
        ((substrate[[row, t + 1]] - substrate[[row, t]]) / (time[t + 1] - time[t])).abs()
    })
}

/// Maximum over the finite values, or `None` if there are none.
fn nan_max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        Some(max) if max >= v => Some(max),
        _ => Some(v),
    })
}
