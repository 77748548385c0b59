//! # Fitting Engine
//!
//! Each candidate model is fitted independently: its ODE system is integrated for
//! every replicate row, the residuals `observed substrate - simulated substrate`
//! are minimised with Levenberg-Marquardt in the bounded-parameter coordinates,
//! and standard errors come from the covariance at the optimum.
//!
//! A model whose fit fails outright still gets a result, marked unconverged with
//! the seed parameters and undefined statistics; the remaining models are fitted
//! regardless.

use crate::error::{KineticsError, Result};
use crate::kinetics::{IntegratorConfig, KineticConstant, KineticConstants};
use crate::lm::{LevenbergMarquardt, LmConfig};
use crate::model::KineticModel;
use crate::parameters::Parameters;
use crate::problem::Problem;
use crate::subset::SubsetSpec;
use crate::uncertainty::{
    calculate_correlation, calculate_covariance, standard_errors_from_covariance, FitStatistics,
};
use crate::utils::finite_difference;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Where each row's initial state is taken from when the time window does not
/// start at the first measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialStatePolicy {
    /// First column of the windowed arrays; integration starts at the window's first time.
    #[default]
    WindowStart,
    /// First column of the full arrays; integration starts at the first measured
    /// time and residuals are taken on the window only.
    ExperimentStart,
}

/// Options of one fitting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Rows and time window to fit
    pub subset: SubsetSpec,

    /// Fit a first-order enzyme inactivation constant `K_ie`. Default: false
    pub enzyme_inactivation: bool,

    /// Fit the candidate models on the rayon thread pool. Default: true
    pub parallel: bool,

    pub initial_state: InitialStatePolicy,

    pub lm: LmConfig,

    pub integrator: IntegratorConfig,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            subset: SubsetSpec::default(),
            enzyme_inactivation: false,
            parallel: true,
            initial_state: InitialStatePolicy::default(),
            lm: LmConfig::default(),
            integrator: IntegratorConfig::default(),
        }
    }
}

impl FitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit only rows with these initial substrate concentrations.
    pub fn with_initial_substrates(mut self, concentrations: Vec<f64>) -> Self {
        self.subset = self.subset.with_initial_substrates(concentrations);
        self
    }

    pub fn with_start_time_index(mut self, index: isize) -> Self {
        self.subset = self.subset.with_start_time_index(index);
        self
    }

    pub fn with_stop_time_index(mut self, index: isize) -> Self {
        self.subset = self.subset.with_stop_time_index(index);
        self
    }

    pub fn with_subset(mut self, subset: SubsetSpec) -> Self {
        self.subset = subset;
        self
    }

    pub fn with_enzyme_inactivation(mut self, enzyme_inactivation: bool) -> Self {
        self.enzyme_inactivation = enzyme_inactivation;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_initial_state(mut self, policy: InitialStatePolicy) -> Self {
        self.initial_state = policy;
        self
    }

    pub fn with_lm_config(mut self, config: LmConfig) -> Self {
        self.lm = config;
        self
    }

    pub fn with_integrator_config(mut self, config: IntegratorConfig) -> Self {
        self.integrator = config;
        self
    }
}

/// Outcome of fitting one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Fitted parameters; `stderr` is set where the covariance could be estimated
    pub params: Parameters,

    pub statistics: FitStatistics,

    /// Whether the optimizer reported convergence
    pub success: bool,

    pub message: String,

    pub iterations: usize,

    pub func_evals: usize,

    /// Covariance of the varied parameters in fitting order
    pub covariance: Option<Array2<f64>>,
}

impl FitResult {
    /// Result of a fit that never reached an optimizer iterate.
    pub fn failed(params: Parameters, message: impl Into<String>) -> Self {
        let statistics = FitStatistics::undefined(params.varying_count());
        Self {
            params,
            statistics,
            success: false,
            message: message.into(),
            iterations: 0,
            func_evals: 0,
            covariance: None,
        }
    }

    pub fn aic(&self) -> f64 {
        self.statistics.aic
    }

    /// Fitted value of `constant`, if the model has it.
    pub fn value(&self, constant: KineticConstant) -> Option<f64> {
        self.params.get(constant.id()).map(|p| p.value())
    }

    /// Standard error of `constant`, if it could be estimated.
    pub fn stderr(&self, constant: KineticConstant) -> Option<f64> {
        self.params.get(constant.id()).and_then(|p| p.stderr())
    }

    /// Correlation matrix of the varied parameters, in fitting order.
    pub fn correlation(&self) -> Option<Array2<f64>> {
        self.covariance.as_ref().map(calculate_correlation)
    }
}

/// Coordinates the optimizer's parameter vector lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coordinates {
    /// Unbounded Minuit coordinates, used during minimisation
    Internal,
    /// Physical parameter values, used for the covariance
    External,
}

/// Least-squares problem of one kinetic model against its subset.
///
/// Non-finite observations are excluded from the residual vector instead of
/// being zeroed, so `residual_count` is the number of finite observations.
pub struct KineticProblem<'a> {
    model: &'a KineticModel,
    coordinates: Coordinates,
    observed: Vec<((usize, usize), f64)>,
}

impl<'a> KineticProblem<'a> {
    /// Problem in the optimizer's unbounded coordinates.
    pub fn new(model: &'a KineticModel) -> Self {
        Self::with_coordinates(model, Coordinates::Internal)
    }

    /// Problem in physical parameter units.
    pub fn external(model: &'a KineticModel) -> Self {
        Self::with_coordinates(model, Coordinates::External)
    }

    fn with_coordinates(model: &'a KineticModel, coordinates: Coordinates) -> Self {
        let observed = model
            .subset()
            .substrate()
            .indexed_iter()
            .filter(|(_, value)| value.is_finite())
            .map(|(index, &value)| (index, value))
            .collect();

        Self {
            model,
            coordinates,
            observed,
        }
    }

    fn constants_at(&self, params: &Array1<f64>) -> Result<KineticConstants> {
        let seeds = self.model.seed_parameters();
        let external = match self.coordinates {
            Coordinates::Internal => seeds.external_from_internal(params)?,
            Coordinates::External => params.clone(),
        };

        let mut constants = KineticConstants::from_parameters(seeds)?;
        for (param, &value) in seeds.varying().iter().zip(external.iter()) {
            let constant = KineticConstant::from_id(param.name()).ok_or_else(|| {
                KineticsError::InvalidInput(format!("'{}' is not a kinetic constant", param.name()))
            })?;
            constants.set(constant, value);
        }
        Ok(constants)
    }
}

impl Problem for KineticProblem<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let constants = self.constants_at(params)?;
        let simulated = self.model.simulate_substrate(constants)?;

        Ok(self
            .observed
            .iter()
            .map(|&(index, value)| value - simulated[index])
            .collect())
    }

    fn parameter_count(&self) -> usize {
        self.model.seed_parameters().varying_count()
    }

    fn residual_count(&self) -> usize {
        self.observed.len()
    }
}

/// Fit one model, without storing the result on it.
pub fn fit_model(model: &KineticModel, options: &FitOptions) -> Result<FitResult> {
    let optimizer = LevenbergMarquardt::with_config(options.lm.clone());
    let problem = KineticProblem::new(model);
    if problem.residual_count() == 0 {
        return Err(KineticsError::EmptySelection(format!(
            "{}: no finite substrate observations to fit",
            model.name()
        )));
    }

    let start = model.seed_parameters().varying_internal_values()?;
    let outcome = optimizer.minimize(&problem, start)?;

    let mut params = model.seed_parameters().clone();
    params.update_from_internal(&outcome.params)?;
    let statistics = FitStatistics::new(&outcome.residuals, params.varying_count());

    let covariance = estimate_covariance(model, &params, statistics.redchi, options);
    if let Some(covar) = &covariance {
        let stderrs = standard_errors_from_covariance(covar);
        for (param, &stderr) in params.iter_mut().filter(|p| p.vary()).zip(stderrs.iter()) {
            param.set_stderr(Some(stderr));
        }
    }

    if outcome.success {
        log::debug!(
            "{}: converged after {} iterations, AIC {:.2} ({})",
            model.name(),
            outcome.iterations,
            statistics.aic,
            outcome.message
        );
    } else {
        log::warn!("{}: did not converge: {}", model.name(), outcome.message);
    }

    Ok(FitResult {
        params,
        statistics,
        success: outcome.success,
        message: outcome.message,
        iterations: outcome.iterations,
        func_evals: outcome.func_evals,
        covariance,
    })
}

/// Covariance of the fitted parameters in physical units, or `None` if the
/// Jacobian at the optimum is unusable.
fn estimate_covariance(
    model: &KineticModel,
    params: &Parameters,
    redchi: f64,
    options: &FitOptions,
) -> Option<Array2<f64>> {
    let problem = KineticProblem::external(model);
    let jacobian = finite_difference::jacobian(&problem, &params.varying_values(), Some(options.lm.jacobian_epsilon))
        .and_then(|jac| calculate_covariance(&jac, redchi));

    match jacobian {
        Ok(covariance) => Some(covariance),
        Err(e) => {
            log::warn!("{}: standard errors unavailable: {}", model.name(), e);
            None
        }
    }
}

fn fit_and_store(model: &mut KineticModel, options: &FitOptions) {
    match fit_model(model, options) {
        Ok(result) => model.set_result(result),
        Err(e) => {
            log::warn!("{}: fit failed: {}", model.name(), e);
            let result = FitResult::failed(model.seed_parameters().clone(), e.to_string());
            model.set_result(result);
        }
    }
}

/// Fit every model and store each result on its descriptor.
///
/// Runs on the rayon thread pool when `options.parallel` is set and the
/// `parallel` feature is enabled. Models keep their order either way.
pub fn fit_models(models: &mut [KineticModel], options: &FitOptions) {
    log::info!(
        "Fitting {} models: {}",
        models.len(),
        models.iter().map(|m| m.name()).collect::<Vec<_>>().join(", ")
    );

    #[cfg(feature = "parallel")]
    if options.parallel {
        models.par_iter_mut().for_each(|model| fit_and_store(model, options));
        return;
    }

    models.iter_mut().for_each(|model| fit_and_store(model, options));
}
