//! Parameter estimation front end.
//!
//! [`ParameterEstimator`] normalizes an experiment once, derives the initial guesses
//! from the full dataset, and on every [`ParameterEstimator::fit_models`] call builds
//! a fresh model set for the requested subset, fits it and ranks the results.

use crate::dataset::NormalizedDataset;
use crate::error::Result;
use crate::experiment::{Experiment, Stoichiometry};
use crate::fitting::{self, FitOptions};
use crate::guess::InitialGuesses;
use crate::model::{build_model_set, KineticModel};
use crate::report::{validate_label_table, ResultSummary, UnitLabels};
use crate::subset::{ReplicateStatistics, Subset};
use ndarray::Array2;
use std::sync::Arc;

/// Fits every candidate mechanism to one experiment and ranks them by AIC.
///
/// ```no_run
/// use enzkin_rs::{Experiment, FitOptions, ParameterEstimator};
///
/// let experiment = Experiment::from_json_file("assay.json")?;
/// let mut estimator = ParameterEstimator::new(experiment)?;
///
/// let summary = estimator.fit_models(&FitOptions::default().with_start_time_index(1))?;
/// println!("{}", summary);
///
/// if let Some(best) = estimator.best_model() {
///     let trajectory = best.model().simulate(0, &[1.0, 2.0, 4.0])?;
///     println!("{:?}", trajectory);
/// }
/// # Ok::<(), enzkin_rs::KineticsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ParameterEstimator {
    experiment: Experiment,
    dataset: NormalizedDataset,
    guesses: InitialGuesses,
    units: UnitLabels,
    subset: Option<Arc<Subset>>,
    models: Vec<KineticModel>,
    summary: ResultSummary,
}

impl ParameterEstimator {
    /// Normalize `experiment` and derive initial guesses.
    ///
    /// Fails before any fitting if the stoichiometry is unknown, the data has the
    /// wrong shape or a concentration is negative.
    pub fn new(experiment: Experiment) -> Result<Self> {
        validate_label_table()?;
        let dataset = NormalizedDataset::from_experiment(&experiment)?;
        let guesses = InitialGuesses::from_dataset(&dataset)?;
        let units = UnitLabels::from_experiment(&experiment, dataset.is_inhibitor_free());

        Ok(Self {
            experiment,
            dataset,
            guesses,
            units,
            subset: None,
            models: Vec::new(),
            summary: ResultSummary::default(),
        })
    }

    pub fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    pub fn dataset(&self) -> &NormalizedDataset {
        &self.dataset
    }

    pub fn initial_guesses(&self) -> &InitialGuesses {
        &self.guesses
    }

    pub fn units(&self) -> &UnitLabels {
        &self.units
    }

    /// Fit all candidate models to the subset selected by `options`.
    ///
    /// Models from a previous call are discarded first. A model that fails to fit
    /// keeps an unconverged result and is logged; it is left out of the summary
    /// when no AIC could be computed. Only an invalid subset or model set, such as
    /// a row without a finite first observation, is an error.
    pub fn fit_models(&mut self, options: &FitOptions) -> Result<&ResultSummary> {
        self.models.clear();
        self.summary = ResultSummary::default();
        self.subset = None;

        let subset = Arc::new(Subset::select(&self.dataset, &options.subset)?);
        let mut models = build_model_set(
            self.dataset.is_inhibitor_free(),
            Arc::clone(&subset),
            self.guesses,
            options,
        )?;

        fitting::fit_models(&mut models, options);
        self.summary = ResultSummary::from_models(&models, &self.units);
        if let Some(best) = self.summary.best() {
            log::info!("Best model: {} (AIC {})", best.model, best.aic);
        }

        self.models = models;
        self.subset = Some(subset);
        Ok(&self.summary)
    }

    /// Summary of the last fit; empty before the first call to `fit_models`.
    pub fn summary(&self) -> &ResultSummary {
        &self.summary
    }

    pub fn models(&self) -> &[KineticModel] {
        &self.models
    }

    /// Subset of the last fit.
    pub fn subset(&self) -> Option<&Subset> {
        self.subset.as_deref()
    }

    /// A fitted model by name, with the data it was fitted to.
    pub fn model(&self, name: &str) -> Option<ModelSelection<'_>> {
        let model = self.models.iter().find(|m| m.name() == name)?;
        Some(ModelSelection {
            model,
            measured: self.dataset.stoichiometry(),
        })
    }

    /// The lowest-AIC model of the last fit.
    pub fn best_model(&self) -> Option<ModelSelection<'_>> {
        self.summary.best().and_then(|row| self.model(&row.model))
    }
}

/// A model together with the subset arrays it was fitted against, for
/// re-simulation and plotting.
#[derive(Debug, Clone, Copy)]
pub struct ModelSelection<'a> {
    model: &'a KineticModel,
    measured: Stoichiometry,
}

impl<'a> ModelSelection<'a> {
    pub fn model(&self) -> &'a KineticModel {
        self.model
    }

    pub fn subset(&self) -> &'a Subset {
        self.model.subset()
    }

    /// The species the experiment measured, shown by default.
    pub fn measured_species(&self) -> Stoichiometry {
        self.measured
    }

    /// Observed concentrations of `species` on the subset grid, `[rows, times]`.
    pub fn observed(&self, species: Stoichiometry) -> &'a Array2<f64> {
        match species {
            Stoichiometry::Substrate => self.subset().substrate(),
            Stoichiometry::Product => self.subset().product(),
        }
    }

    /// Replicate means and standard deviations of `species` per initial substrate.
    pub fn observed_statistics(&self, species: Stoichiometry) -> Result<ReplicateStatistics> {
        self.subset().replicate_statistics(self.observed(species).view())
    }

    /// Model trajectory of `species` for every row on the subset grid, `[rows, times]`.
    pub fn simulated(&self, species: Stoichiometry) -> Result<Array2<f64>> {
        let subset = self.subset();
        let times = subset.time().to_vec();
        let column = match species {
            Stoichiometry::Substrate => 0,
            Stoichiometry::Product => 2,
        };

        let mut values = Array2::zeros((subset.n_rows(), times.len()));
        for (row, mut out) in values.rows_mut().into_iter().enumerate() {
            out.assign(&self.model.simulate(row, &times)?.column(column));
        }
        Ok(values)
    }
}
