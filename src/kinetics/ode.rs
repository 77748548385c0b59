//! Integration of rate laws with the Dormand-Prince 5(4) method.
//!
//! The solver runs interval by interval between consecutive requested time points,
//! so the returned states sit exactly on the measurement grid however unevenly it is
//! spaced. Stiffness detection is switched off: once the substrate is used up the
//! system turns mildly stiff, and the explicit stepper is left to crawl through the
//! tail under its step budget instead of aborting.

use crate::error::{KineticsError, Result};
use crate::kinetics::rate_law::{KineticConstants, RateLaw};
use nalgebra::SVector;
use ode_solvers::dop_shared::OutputType;
use ode_solvers::dopri5::Dopri5;
use ode_solvers::System;
use serde::{Deserialize, Serialize};

/// State vector `[S, E, P, X]` handed to the solver.
pub type Species = SVector<f64, 4>;

// Step-size controller settings of the Dormand-Prince reference code.
const SAFETY_FACTOR: f64 = 0.9;
const BETA: f64 = 0.04;
const FAC_MIN: f64 = 0.2;
const FAC_MAX: f64 = 10.0;

/// Tolerances and step budget of the adaptive integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Relative tolerance. Default: 1e-8
    pub rtol: f64,
    /// Absolute tolerance. Default: 1e-10
    pub atol: f64,
    /// Maximum number of steps per output interval. Default: 100_000
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_max_steps() -> u32 {
    100_000
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            max_steps: default_max_steps(),
        }
    }
}

impl IntegratorConfig {
    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// A rate law with fixed constants, as an ODE system.
///
/// The solver always starts at zero; `t_offset` maps solver time back to
/// experiment time for rate laws that depend on it.
#[derive(Debug, Clone, Copy)]
pub struct KineticSystem {
    rate_law: RateLaw,
    constants: KineticConstants,
    inactivation: bool,
    t_offset: f64,
}

impl KineticSystem {
    pub fn new(rate_law: RateLaw, constants: KineticConstants, inactivation: bool) -> Self {
        Self {
            rate_law,
            constants,
            inactivation,
            t_offset: 0.0,
        }
    }

    fn starting_at(mut self, t: f64) -> Self {
        self.t_offset = t;
        self
    }

    /// Derivative at experiment time `t`.
    pub fn derivative(&self, t: f64, state: &[f64; 4]) -> [f64; 4] {
        (self.rate_law)(state, t, &self.constants, self.inactivation)
    }
}

impl System<f64, Species> for KineticSystem {
    fn system(&self, t: f64, y: &Species, dy: &mut Species) {
        let d = self.derivative(t + self.t_offset, &[y[0], y[1], y[2], y[3]]);
        for (slot, value) in d.into_iter().enumerate() {
            dy[slot] = value;
        }
    }
}

/// Integrate from `(t0, y0)` and return the state at every time in `times`.
///
/// `times` must be non-decreasing and not before `t0`. Fails with
/// [`KineticsError::Integration`] if the solver gives up or the state stops being
/// finite.
pub fn integrate_on_grid(
    system: KineticSystem,
    y0: [f64; 4],
    t0: f64,
    times: &[f64],
    config: &IntegratorConfig,
) -> Result<Vec<[f64; 4]>> {
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(KineticsError::Integration(format!(
            "initial state {:?} is not finite",
            y0
        )));
    }

    let mut states = Vec::with_capacity(times.len());
    let mut t = t0;
    let mut y = y0;

    for &t_next in times {
        let h = t_next - t;
        if h < 0.0 {
            return Err(KineticsError::Integration(format!(
                "output time {} lies before the current time {}",
                t_next, t
            )));
        }
        if h > 0.0 {
            y = step_interval(system.starting_at(t), y, h, config)?;
            t = t_next;
        }
        states.push(y);
    }

    Ok(states)
}

fn step_interval(system: KineticSystem, y: [f64; 4], h: f64, config: &IntegratorConfig) -> Result<[f64; 4]> {
    let y0 = Species::from_column_slice(&y);
    let mut stepper = Dopri5::from_param(
        system,
        0.0,
        h,
        h,
        y0,
        config.rtol,
        config.atol,
        SAFETY_FACTOR,
        BETA,
        FAC_MIN,
        FAC_MAX,
        h,
        0.0,
        config.max_steps,
        u32::MAX,
        OutputType::Sparse,
    );

    stepper
        .integrate()
        .map_err(|e| KineticsError::Integration(format!("Dopri5 failed over an interval of {}: {}", h, e)))?;

    // Sparse output records every accepted step; the last one is clipped to land on `h`.
    let end = stepper
        .y_out()
        .last()
        .map(|state| [state[0], state[1], state[2], state[3]])
        .ok_or_else(|| KineticsError::Integration(format!("no output at the end of an interval of {}", h)))?;

    if end.iter().any(|v| !v.is_finite()) {
        return Err(KineticsError::Integration(format!(
            "state became non-finite: {:?}",
            end
        )));
    }
    Ok(end)
}
