//! Kinetic model descriptors.
//!
//! A [`KineticModel`] ties a [`Mechanism`] to the data it is fitted against: the
//! shared subset, the initial state of every replicate row, the seeded parameters
//! and, once fitted, the [`FitResult`]. Descriptors are cheap to rebuild and are
//! created fresh for every fitting run.

use crate::error::{KineticsError, Result};
use crate::fitting::{FitOptions, FitResult, InitialStatePolicy};
use crate::guess::InitialGuesses;
use crate::kinetics::{
    integrate_on_grid, Driver, IntegratorConfig, KineticConstant, KineticConstants, KineticSystem, Mechanism,
};
use crate::parameters::{Parameter, Parameters};
use crate::subset::{ReplicateStatistics, Subset};
use ndarray::{Array1, Array2};
use std::sync::Arc;

/// Seed of the time-dependent enzyme inactivation constant.
const K_IE_SEED: f64 = 0.01;
const K_IE_BOUNDS: (f64, f64) = (1e-4, 0.9999);

/// `k_cat` and `Km` may move two orders of magnitude either way from their seeds.
const UNIVERSAL_SPAN: f64 = 100.0;

/// Inhibition constants start at the `Km` guess and range over `[seed/1e3, seed·1e4]`.
const INHIBITION_LOWER: f64 = 1e-3;
const INHIBITION_UPPER: f64 = 1e4;

/// Initial concentrations of the four state slots, one entry per replicate row.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    pub substrate: Array1<f64>,
    pub enzyme: Array1<f64>,
    pub product: Array1<f64>,
    /// Driver of the inhibition term: inhibitor, substrate or product
    pub driver: Array1<f64>,
}

impl InitialState {
    /// Fill the slots from a subset according to `policy`.
    ///
    /// Fails if any row has a missing or non-finite starting value, since no
    /// trajectory can be integrated from it.
    pub fn from_subset(subset: &Subset, driver: Driver, policy: InitialStatePolicy) -> Result<Self> {
        let (substrate, product, inhibitor) = match policy {
            InitialStatePolicy::WindowStart => (
                subset.substrate().column(0).to_owned(),
                subset.product().column(0).to_owned(),
                subset.inhibitor().column(0).to_owned(),
            ),
            InitialStatePolicy::ExperimentStart => (
                subset.origin_substrate().clone(),
                subset.origin_product().clone(),
                subset.origin_inhibitor().clone(),
            ),
        };

        let driver = match driver {
            Driver::Inhibitor => inhibitor,
            Driver::Substrate => substrate.clone(),
            Driver::Product => product.clone(),
        };

        let state = Self {
            substrate,
            enzyme: subset.enzyme().clone(),
            product,
            driver,
        };
        state.check_finite()?;
        Ok(state)
    }

    fn check_finite(&self) -> Result<()> {
        let slots = [
            ("substrate", &self.substrate),
            ("enzyme", &self.enzyme),
            ("product", &self.product),
            ("driver", &self.driver),
        ];
        for (species, values) in slots {
            if let Some((row, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(KineticsError::InvalidInput(format!(
                    "replicate row {} has no finite initial {} concentration ({}); \
                     the first fitted time point must be measured",
                    row, species, value
                )));
            }
        }
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.substrate.len()
    }

    /// State vector `[S, E, P, X]` of one row.
    pub fn row(&self, row: usize) -> Result<[f64; 4]> {
        if row >= self.n_rows() {
            return Err(KineticsError::InvalidInput(format!(
                "row {} out of range for {} replicate rows",
                row,
                self.n_rows()
            )));
        }
        Ok([
            self.substrate[row],
            self.enzyme[row],
            self.product[row],
            self.driver[row],
        ])
    }

    /// The four slots stacked as a `[rows, 4]` array.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.n_rows(), 4), |(row, slot)| match slot {
            0 => self.substrate[row],
            1 => self.enzyme[row],
            2 => self.product[row],
            _ => self.driver[row],
        })
    }
}

/// Seeded, bounded parameters of `mechanism`, in fitting order.
pub fn seed_parameters(
    mechanism: Mechanism,
    guesses: &InitialGuesses,
    enzyme_inactivation: bool,
) -> Result<Parameters> {
    let mut params = Parameters::new();

    for constant in mechanism.constants(enzyme_inactivation) {
        let param = match constant {
            KineticConstant::KCat => Parameter::with_bounds(
                constant.id(),
                guesses.k_cat,
                guesses.k_cat / UNIVERSAL_SPAN,
                guesses.k_cat * UNIVERSAL_SPAN,
            )?,
            KineticConstant::Km => Parameter::with_bounds(
                constant.id(),
                guesses.km,
                guesses.km / UNIVERSAL_SPAN,
                guesses.km * UNIVERSAL_SPAN,
            )?,
            KineticConstant::Kic | KineticConstant::Kiu => Parameter::with_bounds(
                constant.id(),
                guesses.km,
                guesses.km * INHIBITION_LOWER,
                guesses.km * INHIBITION_UPPER,
            )?,
            KineticConstant::Kie => {
                Parameter::with_bounds(constant.id(), K_IE_SEED, K_IE_BOUNDS.0, K_IE_BOUNDS.1)?
            }
        };
        params.add(param)?;
    }

    Ok(params)
}

/// One candidate mechanism prepared for fitting against a subset.
#[derive(Debug, Clone)]
pub struct KineticModel {
    mechanism: Mechanism,
    subset: Arc<Subset>,
    initial_state: InitialState,
    start_time: f64,
    guesses: InitialGuesses,
    params: Parameters,
    enzyme_inactivation: bool,
    integrator: IntegratorConfig,
    result: Option<FitResult>,
}

impl KineticModel {
    pub fn new(
        mechanism: Mechanism,
        subset: Arc<Subset>,
        guesses: InitialGuesses,
        options: &FitOptions,
    ) -> Result<Self> {
        let initial_state = InitialState::from_subset(&subset, mechanism.driver(), options.initial_state)?;
        let start_time = match options.initial_state {
            InitialStatePolicy::WindowStart => subset.time()[0],
            InitialStatePolicy::ExperimentStart => subset.origin_time(),
        };
        let params = seed_parameters(mechanism, &guesses, options.enzyme_inactivation)?;

        Ok(Self {
            mechanism,
            subset,
            initial_state,
            start_time,
            guesses,
            params,
            enzyme_inactivation: options.enzyme_inactivation,
            integrator: options.integrator,
            result: None,
        })
    }

    pub fn name(&self) -> &'static str {
        self.mechanism.name()
    }

    pub fn mechanism(&self) -> Mechanism {
        self.mechanism
    }

    /// Inhibition constants fitted on top of `k_cat` and `Km`.
    pub fn free_parameters(&self) -> &'static [KineticConstant] {
        self.mechanism.free_parameters()
    }

    pub fn subset(&self) -> &Subset {
        &self.subset
    }

    pub fn initial_state(&self) -> &InitialState {
        &self.initial_state
    }

    /// Time at which every row's initial state applies.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn guesses(&self) -> &InitialGuesses {
        &self.guesses
    }

    /// Seeded parameters, as handed to the optimizer.
    pub fn seed_parameters(&self) -> &Parameters {
        &self.params
    }

    /// Fitted parameters if a fit has been stored, otherwise the seeds.
    pub fn parameters(&self) -> &Parameters {
        self.result.as_ref().map_or(&self.params, |r| &r.params)
    }

    pub fn enzyme_inactivation(&self) -> bool {
        self.enzyme_inactivation
    }

    pub fn integrator(&self) -> &IntegratorConfig {
        &self.integrator
    }

    pub fn result(&self) -> Option<&FitResult> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, result: FitResult) {
        self.result = Some(result);
    }

    pub fn is_fitted(&self) -> bool {
        self.result.is_some()
    }

    fn system(&self, constants: KineticConstants) -> KineticSystem {
        KineticSystem::new(self.mechanism.rate_law(), constants, self.enzyme_inactivation)
    }

    /// Simulated substrate of every row on the subset's time grid, shape `[rows, times]`.
    pub fn simulate_substrate(&self, constants: KineticConstants) -> Result<Array2<f64>> {
        let system = self.system(constants);
        let times = self.subset.time().to_vec();
        let mut substrate = Array2::zeros((self.initial_state.n_rows(), times.len()));

        for (row, mut out) in substrate.rows_mut().into_iter().enumerate() {
            let states = integrate_on_grid(
                system,
                self.initial_state.row(row)?,
                self.start_time,
                &times,
                &self.integrator,
            )?;
            for (slot, state) in out.iter_mut().zip(states) {
                *slot = state[0];
            }
        }
        Ok(substrate)
    }

    /// Full trajectory `[S, E, P, X]` of one row at `times`, shape `[times, 4]`,
    /// using the fitted parameters (or the seeds before fitting).
    ///
    /// `times` must not start before [`KineticModel::start_time`].
    pub fn simulate(&self, row: usize, times: &[f64]) -> Result<Array2<f64>> {
        let constants = KineticConstants::from_parameters(self.parameters())?;
        let states = integrate_on_grid(
            self.system(constants),
            self.initial_state.row(row)?,
            self.start_time,
            times,
            &self.integrator,
        )?;

        Ok(Array2::from_shape_fn((states.len(), 4), |(i, slot)| states[i][slot]))
    }

    /// Initial state averaged over the replicates of each initial substrate
    /// concentration; `mean` has columns `[S, E, P, X]`.
    pub fn mean_initial_state(&self) -> Result<ReplicateStatistics> {
        self.subset.replicate_statistics(self.initial_state.to_array().view())
    }
}

/// Build the candidate models for a subset.
///
/// `inhibitor_free` must describe the full dataset, not the subset, so that
/// subsetting never switches the model family.
pub fn build_model_set(
    inhibitor_free: bool,
    subset: Arc<Subset>,
    guesses: InitialGuesses,
    options: &FitOptions,
) -> Result<Vec<KineticModel>> {
    let mechanisms: &[Mechanism] = if inhibitor_free {
        &Mechanism::INHIBITOR_FREE
    } else {
        &Mechanism::WITH_INHIBITOR
    };

    mechanisms
        .iter()
        .map(|&mechanism| KineticModel::new(mechanism, Arc::clone(&subset), guesses, options))
        .collect()
}
