//! Selection of rows and a time window from a normalized dataset.
//!
//! A [`Subset`] is an owned copy: fitting and re-simulation read from it, and the
//! [`NormalizedDataset`] it came from is never modified.

use crate::dataset::NormalizedDataset;
use crate::error::{KineticsError, Result};
use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Which rows and time points to keep.
///
/// Time indices follow slice semantics: `start` is inclusive, `stop` exclusive,
/// negative values count from the end, and out-of-range values are clamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubsetSpec {
    /// Initial substrate concentrations to keep; `None` or empty keeps every row.
    pub initial_substrates: Option<Vec<f64>>,
    pub start_time_index: Option<isize>,
    pub stop_time_index: Option<isize>,
}

impl SubsetSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_substrates(mut self, concentrations: Vec<f64>) -> Self {
        self.initial_substrates = Some(concentrations);
        self
    }

    pub fn with_start_time_index(mut self, index: isize) -> Self {
        self.start_time_index = Some(index);
        self
    }

    pub fn with_stop_time_index(mut self, index: isize) -> Self {
        self.stop_time_index = Some(index);
        self
    }

    /// Resolve the time window against a grid of `len` points.
    pub fn time_window(&self, len: usize) -> Range<usize> {
        let start = resolve_index(self.start_time_index, len, 0);
        let stop = resolve_index(self.stop_time_index, len, len);
        start..stop.max(start)
    }
}

fn resolve_index(index: Option<isize>, len: usize, default: usize) -> usize {
    match index {
        None => default,
        Some(i) if i < 0 => len.saturating_sub(i.unsigned_abs()),
        Some(i) => (i as usize).min(len),
    }
}

/// Rows and time window of a dataset, copied out for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct Subset {
    rows: Vec<usize>,
    window: Range<usize>,
    substrate: Array2<f64>,
    product: Array2<f64>,
    enzyme: Array1<f64>,
    initial_substrate: Array1<f64>,
    time: Array1<f64>,
    inhibitor: Array2<f64>,
    origin_time: f64,
    origin_substrate: Array1<f64>,
    origin_product: Array1<f64>,
    origin_inhibitor: Array1<f64>,
}

impl Subset {
    /// Select rows and a time window from `dataset`.
    ///
    /// Rows are returned in request order: for each requested concentration, every
    /// row with exactly that initial substrate concentration. A concentration that
    /// does not occur fails with [`KineticsError::UnknownInitialSubstrate`].
    pub fn select(dataset: &NormalizedDataset, spec: &SubsetSpec) -> Result<Self> {
        let rows = match spec.initial_substrates.as_deref() {
            None | Some([]) => (0..dataset.n_rows()).collect(),
            Some(requested) => select_rows(dataset, requested)?,
        };

        let window = spec.time_window(dataset.n_times());
        if window.is_empty() {
            return Err(KineticsError::EmptySelection(format!(
                "time window {:?}..{:?} selects no points of a {}-point time grid",
                spec.start_time_index,
                spec.stop_time_index,
                dataset.n_times()
            )));
        }

        let rows_of = |values: &Array2<f64>| values.select(Axis(0), &rows);
        let window_of = |values: Array2<f64>| values.slice(s![.., window.clone()]).to_owned();

        let full_substrate = rows_of(dataset.substrate());
        let full_product = rows_of(dataset.product());
        let full_inhibitor = rows_of(dataset.inhibitor());

        let subset = Self {
            origin_time: dataset.time()[0],
            origin_substrate: full_substrate.column(0).to_owned(),
            origin_product: full_product.column(0).to_owned(),
            origin_inhibitor: full_inhibitor.column(0).to_owned(),
            substrate: window_of(full_substrate),
            product: window_of(full_product),
            inhibitor: window_of(full_inhibitor),
            enzyme: dataset.enzyme().select(Axis(0), &rows),
            initial_substrate: dataset.initial_substrate().select(Axis(0), &rows),
            time: dataset.time().slice(s![window.clone()]).to_owned(),
            rows,
            window,
        };

        log::debug!(
            "subset: {} of {} rows, time indices {:?}",
            subset.n_rows(),
            dataset.n_rows(),
            subset.window
        );
        Ok(subset)
    }

    /// Every row and time point of `dataset`.
    pub fn full(dataset: &NormalizedDataset) -> Result<Self> {
        Self::select(dataset, &SubsetSpec::default())
    }

    /// Indices of the selected rows in the source dataset.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Selected time indices of the source grid.
    pub fn window(&self) -> Range<usize> {
        self.window.clone()
    }

    pub fn substrate(&self) -> &Array2<f64> {
        &self.substrate
    }

    pub fn product(&self) -> &Array2<f64> {
        &self.product
    }

    pub fn enzyme(&self) -> &Array1<f64> {
        &self.enzyme
    }

    pub fn initial_substrate(&self) -> &Array1<f64> {
        &self.initial_substrate
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    pub fn inhibitor(&self) -> &Array2<f64> {
        &self.inhibitor
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_times(&self) -> usize {
        self.time.len()
    }

    /// First time point of the source grid, before windowing.
    pub fn origin_time(&self) -> f64 {
        self.origin_time
    }

    /// Substrate at the first time point of the source grid, per selected row.
    pub fn origin_substrate(&self) -> &Array1<f64> {
        &self.origin_substrate
    }

    pub fn origin_product(&self) -> &Array1<f64> {
        &self.origin_product
    }

    pub fn origin_inhibitor(&self) -> &Array1<f64> {
        &self.origin_inhibitor
    }

    /// Unique initial substrate concentrations of the selected rows, ascending.
    pub fn unique_initial_substrates(&self) -> Vec<f64> {
        let mut unique = self.initial_substrate.to_vec();
        unique.sort_by(f64::total_cmp);
        unique.dedup();
        unique
    }

    /// Mean and population standard deviation of `values` across the replicates
    /// of each initial substrate concentration.
    ///
    /// `values` must have one row per selected row, for example
    /// [`Subset::substrate`] or a simulated trajectory stacked row by row.
    pub fn replicate_statistics(&self, values: ArrayView2<'_, f64>) -> Result<ReplicateStatistics> {
        if values.nrows() != self.n_rows() {
            return Err(KineticsError::DimensionMismatch(format!(
                "expected {} rows (one per selected replicate), got {}",
                self.n_rows(),
                values.nrows()
            )));
        }

        let initial_substrates = self.unique_initial_substrates();
        let n_cols = values.ncols();
        let mut mean = Array2::zeros((initial_substrates.len(), n_cols));
        let mut std = Array2::zeros((initial_substrates.len(), n_cols));

        for (group, &concentration) in initial_substrates.iter().enumerate() {
            let members: Vec<usize> = self
                .initial_substrate
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c == concentration)
                .map(|(row, _)| row)
                .collect();
            let block = values.select(Axis(0), &members);

            if let Some(m) = block.mean_axis(Axis(0)) {
                mean.row_mut(group).assign(&m);
                std.row_mut(group).assign(&block.std_axis(Axis(0), 0.0));
            }
        }

        Ok(ReplicateStatistics {
            initial_substrates,
            mean,
            std,
        })
    }
}

fn select_rows(dataset: &NormalizedDataset, requested: &[f64]) -> Result<Vec<usize>> {
    let initial = dataset.initial_substrate();
    let mut rows = Vec::new();

    for &concentration in requested {
        let matches: Vec<usize> = initial
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == concentration)
            .map(|(row, _)| row)
            .collect();

        if matches.is_empty() {
            return Err(KineticsError::UnknownInitialSubstrate {
                requested: concentration,
                known: dataset.known_initial_substrates(),
            });
        }
        rows.extend(matches);
    }
    Ok(rows)
}

/// Per-concentration replicate aggregates; row `k` belongs to `initial_substrates[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateStatistics {
    pub initial_substrates: Vec<f64>,
    pub mean: Array2<f64>,
    pub std: Array2<f64>,
}
