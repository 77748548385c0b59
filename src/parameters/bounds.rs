//! Parameter bounds and the Minuit-style bounds transform.
//!
//! The optimizer works on unbounded "internal" values. A bounded kinetic constant
//! is mapped onto its interval with the same transforms MINUIT and lmfit use, so
//! that every trial step of the Levenberg-Marquardt loop yields a value the rate
//! laws can safely evaluate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not exceed max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Parameter value {value} is outside bounds: [{min}, {max}]")]
    ValueOutsideBounds { value: f64, min: f64, max: f64 },

    #[error("Non-finite parameter value is not allowed")]
    NonFiniteValue,
}

/// Closed interval a parameter must stay in. Infinite ends mean "unbounded".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoundsRepr", into = "BoundsRepr")]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

/// JSON cannot carry infinities, so unbounded ends travel as `null`.
#[derive(Serialize, Deserialize)]
struct BoundsRepr {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

impl From<BoundsRepr> for Bounds {
    fn from(repr: BoundsRepr) -> Self {
        Self {
            min: repr.min.unwrap_or(f64::NEG_INFINITY),
            max: repr.max.unwrap_or(f64::INFINITY),
        }
    }
}

impl From<Bounds> for BoundsRepr {
    fn from(bounds: Bounds) -> Self {
        Self {
            min: bounds.min.is_finite().then_some(bounds.min),
            max: bounds.max.is_finite().then_some(bounds.max),
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Bounds {
    /// Create bounds `[min, max]`.
    ///
    /// ```
    /// use enzkin_rs::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(0.5, 50.0).unwrap();
    /// assert!(bounds.contains(1.0));
    /// assert!(Bounds::new(2.0, 1.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min > max || min.is_nan() || max.is_nan() {
            return Err(BoundsError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn unbounded() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    pub fn min_only(min: f64) -> Self {
        Self {
            min,
            max: f64::INFINITY,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Maps between internal (optimizer) and external (physical) parameter values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsTransform {
    bounds: Bounds,
}

impl BoundsTransform {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    /// Internal value to the physical value, always inside the bounds.
    pub fn to_external(&self, internal: f64) -> f64 {
        let Bounds { min, max } = self.bounds;
        match (self.bounds.has_lower_bound(), self.bounds.has_upper_bound()) {
            (false, false) => internal,
            (true, false) => min - 1.0 + (internal * internal + 1.0).sqrt(),
            (false, true) => max + 1.0 - (internal * internal + 1.0).sqrt(),
            (true, true) => min + (internal.sin() + 1.0) * (max - min) / 2.0,
        }
    }

    /// Physical value to the internal value the optimizer starts from.
    pub fn to_internal(&self, external: f64) -> Result<f64, BoundsError> {
        if !external.is_finite() {
            return Err(BoundsError::NonFiniteValue);
        }
        let Bounds { min, max } = self.bounds;
        if !self.bounds.contains(external) {
            return Err(BoundsError::ValueOutsideBounds {
                value: external,
                min,
                max,
            });
        }

        let internal = match (self.bounds.has_lower_bound(), self.bounds.has_upper_bound()) {
            (false, false) => external,
            (true, false) => ((external - min + 1.0).powi(2) - 1.0).sqrt(),
            (false, true) => ((max - external + 1.0).powi(2) - 1.0).sqrt(),
            (true, true) if max == min => 0.0,
            (true, true) => (2.0 * (external - min) / (max - min) - 1.0)
                .clamp(-1.0, 1.0)
                .asin(),
        };
        Ok(internal)
    }
}
