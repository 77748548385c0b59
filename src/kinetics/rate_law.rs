//! Rate laws: right-hand sides of the kinetic ODE systems.
//!
//! Each function maps the state `[S, E, P, X]` (substrate, active enzyme, product,
//! inhibitory driver) to its time derivative. `X` follows whatever species drives
//! the mechanism: it grows with the product, shrinks with the substrate, and stays
//! constant for an added inhibitor.

use crate::error::{KineticsError, Result};
use crate::kinetics::KineticConstant;
use crate::parameters::Parameters;
use serde::{Deserialize, Serialize};

/// Rate-law signature shared by every mechanism.
pub type RateLaw = fn(state: &[f64; 4], t: f64, constants: &KineticConstants, inactivation: bool) -> [f64; 4];

/// Constant values seen by a rate law.
///
/// Inhibition constants a mechanism does not fit stay infinite, which removes
/// their term from the rate expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticConstants {
    pub k_cat: f64,
    pub km: f64,
    pub k_ic: f64,
    pub k_iu: f64,
    pub k_ie: f64,
}

impl KineticConstants {
    pub fn new(k_cat: f64, km: f64) -> Self {
        Self {
            k_cat,
            km,
            k_ic: f64::INFINITY,
            k_iu: f64::INFINITY,
            k_ie: 0.0,
        }
    }

    pub fn with_k_ic(mut self, k_ic: f64) -> Self {
        self.k_ic = k_ic;
        self
    }

    pub fn with_k_iu(mut self, k_iu: f64) -> Self {
        self.k_iu = k_iu;
        self
    }

    pub fn with_k_ie(mut self, k_ie: f64) -> Self {
        self.k_ie = k_ie;
        self
    }

    pub fn set(&mut self, constant: KineticConstant, value: f64) {
        match constant {
            KineticConstant::KCat => self.k_cat = value,
            KineticConstant::Km => self.km = value,
            KineticConstant::Kic => self.k_ic = value,
            KineticConstant::Kiu => self.k_iu = value,
            KineticConstant::Kie => self.k_ie = value,
        }
    }

    /// Read constants from a parameter set; `k_cat` and `Km` are required.
    pub fn from_parameters(params: &Parameters) -> Result<Self> {
        let mut constants = Self::new(
            params.value_of(KineticConstant::KCat.id())?,
            params.value_of(KineticConstant::Km.id())?,
        );
        for param in params.iter() {
            let constant = KineticConstant::from_id(param.name()).ok_or_else(|| {
                KineticsError::InvalidInput(format!("'{}' is not a kinetic constant", param.name()))
            })?;
            constants.set(constant, param.value());
        }
        Ok(constants)
    }
}

/// First-order enzyme decay, active only with inactivation enabled.
fn enzyme_rate(enzyme: f64, constants: &KineticConstants, inactivation: bool) -> f64 {
    if inactivation {
        -constants.k_ie * enzyme
    } else {
        0.0
    }
}

/// `1 + x / K`, with an infinite constant meaning no inhibition.
fn inhibition_factor(x: f64, k: f64) -> f64 {
    1.0 + x / k
}

fn derivatives(v: f64, de: f64, dx: f64) -> [f64; 4] {
    [-v, de, v, dx]
}

pub fn irreversible(state: &[f64; 4], _t: f64, c: &KineticConstants, inactivation: bool) -> [f64; 4] {
    let [s, e, _p, _x] = *state;
    let v = c.k_cat * e * s / (c.km + s);
    derivatives(v, enzyme_rate(e, c, inactivation), 0.0)
}

pub fn competitive_product_inhibition(
    state: &[f64; 4],
    _t: f64,
    c: &KineticConstants,
    inactivation: bool,
) -> [f64; 4] {
    let [s, e, _p, x] = *state;
    let v = c.k_cat * e * s / (c.km * inhibition_factor(x, c.k_ic) + s);
    derivatives(v, enzyme_rate(e, c, inactivation), v)
}

pub fn uncompetitive_product_inhibition(
    state: &[f64; 4],
    _t: f64,
    c: &KineticConstants,
    inactivation: bool,
) -> [f64; 4] {
    let [s, e, _p, x] = *state;
    let v = c.k_cat * e * s / (c.km + s * inhibition_factor(x, c.k_iu));
    derivatives(v, enzyme_rate(e, c, inactivation), v)
}

pub fn noncompetitive_product_inhibition(
    state: &[f64; 4],
    _t: f64,
    c: &KineticConstants,
    inactivation: bool,
) -> [f64; 4] {
    let [s, e, _p, x] = *state;
    let v = c.k_cat * e * s / (c.km * inhibition_factor(x, c.k_ic) + s * inhibition_factor(x, c.k_iu));
    derivatives(v, enzyme_rate(e, c, inactivation), v)
}

pub fn substrate_inhibition(state: &[f64; 4], _t: f64, c: &KineticConstants, inactivation: bool) -> [f64; 4] {
    let [s, e, _p, x] = *state;
    let v = c.k_cat * e * s / (c.km + s * inhibition_factor(x, c.k_iu));
    derivatives(v, enzyme_rate(e, c, inactivation), -v)
}

pub fn competitive_inhibition(state: &[f64; 4], _t: f64, c: &KineticConstants, inactivation: bool) -> [f64; 4] {
    let [s, e, _p, i] = *state;
    let v = c.k_cat * e * s / (c.km * inhibition_factor(i, c.k_ic) + s);
    derivatives(v, enzyme_rate(e, c, inactivation), 0.0)
}

pub fn uncompetitive_inhibition(state: &[f64; 4], _t: f64, c: &KineticConstants, inactivation: bool) -> [f64; 4] {
    let [s, e, _p, i] = *state;
    let v = c.k_cat * e * s / (c.km + s * inhibition_factor(i, c.k_iu));
    derivatives(v, enzyme_rate(e, c, inactivation), 0.0)
}

pub fn noncompetitive_inhibition(
    state: &[f64; 4],
    _t: f64,
    c: &KineticConstants,
    inactivation: bool,
) -> [f64; 4] {
    let [s, e, _p, i] = *state;
    let v = c.k_cat * e * s / (c.km * inhibition_factor(i, c.k_ic) + s * inhibition_factor(i, c.k_iu));
    derivatives(v, enzyme_rate(e, c, inactivation), 0.0)
}

/// The enzyme-inhibitor complex keeps partial affinity: binding the inhibitor
/// raises the apparent `Km` by `(1 + I/K_ic) / (1 + I/K_iu)` instead of blocking it.
pub fn partially_competitive_inhibition(
    state: &[f64; 4],
    _t: f64,
    c: &KineticConstants,
    inactivation: bool,
) -> [f64; 4] {
    let [s, e, _p, i] = *state;
    let apparent_km = c.km * inhibition_factor(i, c.k_ic) / inhibition_factor(i, c.k_iu);
    let v = c.k_cat * e * s / (apparent_km + s);
    derivatives(v, enzyme_rate(e, c, inactivation), 0.0)
}
