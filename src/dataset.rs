//! Data normalization.
//!
//! Flattens an [`Experiment`] into row-aligned arrays: one row per replicate trace,
//! paired with its condition's initial substrate, enzyme and inhibitor
//! concentration. The unmeasured half of the substrate/product pair is closed by
//! mass balance, `other = initial_substrate - measured`.

use crate::error::{KineticsError, Result};
use crate::experiment::{Experiment, Stoichiometry};
use ndarray::{Array1, Array2, Axis};

/// Row-aligned numeric view of an experiment.
///
/// Invariants, checked on construction:
/// - every array has one row per replicate trace;
/// - `substrate`, `product` and `inhibitor` have one column per time point;
/// - no substrate or product entry is negative.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDataset {
    pub(crate) substrate: Array2<f64>,
    pub(crate) product: Array2<f64>,
    pub(crate) initial_substrate: Array1<f64>,
    pub(crate) enzyme: Array1<f64>,
    pub(crate) inhibitor: Array2<f64>,
    pub(crate) time: Array1<f64>,
    stoichiometry: Stoichiometry,
}

impl NormalizedDataset {
    /// Normalize and validate an experiment.
    pub fn from_experiment(experiment: &Experiment) -> Result<Self> {
        let stoichiometry = experiment.stoichiometry()?;
        let time = Array1::from_vec(experiment.time.clone());
        check_time_grid(&time)?;

        let n_times = time.len();
        let mut rows = Vec::new();
        let mut initial_substrate = Vec::new();
        let mut enzyme = Vec::new();
        let mut inhibitor = Vec::new();

        for (m_idx, measurement) in experiment.measurements.iter().enumerate() {
            for (r_idx, replicate) in measurement.replicates.iter().enumerate() {
                if replicate.len() != n_times {
                    return Err(KineticsError::DimensionMismatch(format!(
                        "replicate {} of measurement {} has {} values, expected {} (one per time point)",
                        r_idx,
                        m_idx,
                        replicate.len(),
                        n_times
                    )));
                }
                rows.extend_from_slice(replicate);
                initial_substrate.push(measurement.initial_substrate_conc);
                enzyme.push(measurement.enzyme_conc);
                inhibitor.push(measurement.inhibitor_conc_or_zero());
            }
        }

        let n_rows = initial_substrate.len();
        if n_rows == 0 {
            return Err(KineticsError::InvalidInput(
                "experiment contains no replicate measurements".to_string(),
            ));
        }

        let measured = Array2::from_shape_vec((n_rows, n_times), rows)
            .map_err(|e| KineticsError::DimensionMismatch(e.to_string()))?;
        let initial_substrate = Array1::from_vec(initial_substrate);
        let counterpart = mass_balance(&measured, &initial_substrate);

        let (substrate, product) = match stoichiometry {
            Stoichiometry::Substrate => (measured, counterpart),
            Stoichiometry::Product => (counterpart, measured),
        };

        // Constant driver per replicate, repeated over every time point.
        let inhibitor = Array1::from_vec(inhibitor)
            .insert_axis(Axis(1))
            .broadcast((n_rows, n_times))
            .map(|view| view.to_owned())
            .ok_or_else(|| {
                KineticsError::DimensionMismatch("cannot broadcast inhibitor concentrations".to_string())
            })?;

        let dataset = Self {
            substrate,
            product,
            initial_substrate,
            enzyme: Array1::from_vec(enzyme),
            inhibitor,
            time,
            stoichiometry,
        };
        dataset.check_negative_concentrations()?;

        log::debug!(
            "normalized {} replicate rows x {} time points ({} measured)",
            n_rows,
            n_times,
            stoichiometry
        );
        Ok(dataset)
    }

    fn check_negative_concentrations(&self) -> Result<()> {
        for (array, values) in [("Substrate", &self.substrate), ("Product", &self.product)] {
            if let Some(((row, column), &value)) = values.indexed_iter().find(|&(_, &v)| v < 0.0) {
                return Err(KineticsError::NegativeConcentration {
                    array,
                    row,
                    column,
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn substrate(&self) -> &Array2<f64> {
        &self.substrate
    }

    pub fn product(&self) -> &Array2<f64> {
        &self.product
    }

    pub fn initial_substrate(&self) -> &Array1<f64> {
        &self.initial_substrate
    }

    pub fn enzyme(&self) -> &Array1<f64> {
        &self.enzyme
    }

    pub fn inhibitor(&self) -> &Array2<f64> {
        &self.inhibitor
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    pub fn stoichiometry(&self) -> Stoichiometry {
        self.stoichiometry
    }

    pub fn n_rows(&self) -> usize {
        self.substrate.nrows()
    }

    pub fn n_times(&self) -> usize {
        self.time.len()
    }

    /// True when no replicate carries an inhibitor, selecting the inhibitor-free model family.
    pub fn is_inhibitor_free(&self) -> bool {
        self.inhibitor.iter().all(|&c| c == 0.0)
    }

    /// Unique initial substrate concentrations in ascending order.
    pub fn known_initial_substrates(&self) -> Vec<f64> {
        let mut known: Vec<f64> = self.initial_substrate.to_vec();
        known.sort_by(f64::total_cmp);
        known.dedup();
        known
    }
}

/// `initial_substrate[row] - values[row, t]` for every row and time point.
fn mass_balance(values: &Array2<f64>, initial_substrate: &Array1<f64>) -> Array2<f64> {
    let column = initial_substrate.view().insert_axis(Axis(1));
    &column - values
}

fn check_time_grid(time: &Array1<f64>) -> Result<()> {
    if time.is_empty() {
        return Err(KineticsError::InvalidInput("time grid is empty".to_string()));
    }
    if let Some(idx) = time.iter().position(|t| !t.is_finite()) {
        return Err(KineticsError::InvalidInput(format!(
            "time grid contains a non-finite value at index {}",
            idx
        )));
    }
    if let Some(idx) = time
        .windows(2)
        .into_iter()
        .position(|pair| pair[1] <= pair[0])
    {
        return Err(KineticsError::InvalidInput(format!(
            "time grid must be strictly increasing, but t[{}] = {} follows t[{}] = {}",
            idx + 1,
            time[idx + 1],
            idx,
            time[idx]
        )));
    }
    Ok(())
}
