//! Parameter definition and implementation
//!
//! A [`Parameter`] is one named kinetic constant: its current value, the bounds it
//! may not leave, whether the optimizer varies it, and its standard error once a
//! fit has been performed.

use crate::parameters::bounds::{Bounds, BoundsError, BoundsTransform};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Bounds error: {0}")]
    BoundsError(#[from] BoundsError),

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("Parameter '{name}' already exists")]
    DuplicateParameter { name: String },

    #[error("Expected {expected} values for varying parameters, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// A named, optionally bounded parameter of a kinetic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,

    value: f64,

    vary: bool,

    bounds: Bounds,

    /// Standard error of the parameter (set after fitting)
    stderr: Option<f64>,
}

impl Parameter {
    /// Create an unbounded, varying parameter.
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            vary: true,
            bounds: Bounds::default(),
            stderr: None,
        }
    }

    /// Create a varying parameter restricted to `[min, max]`.
    ///
    /// The value is clamped into the bounds, matching how seeds outside a
    /// model's admissible range are handled when the model set is built.
    ///
    /// ```
    /// use enzkin_rs::parameters::Parameter;
    ///
    /// let km = Parameter::with_bounds("Km", 250.0, 0.1, 100.0).unwrap();
    /// assert_eq!(km.value(), 100.0);
    /// assert_eq!(km.min(), 0.1);
    /// ```
    pub fn with_bounds(name: &str, value: f64, min: f64, max: f64) -> Result<Self, ParameterError> {
        let bounds = Bounds::new(min, max)?;
        let value = bounds.clamp(value);

        Ok(Self {
            name: name.to_string(),
            value,
            vary: true,
            bounds,
            stderr: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value of the parameter, failing if it lies outside the bounds.
    pub fn set_value(&mut self, value: f64) -> Result<(), ParameterError> {
        if !self.bounds.contains(value) {
            return Err(ParameterError::BoundsError(BoundsError::ValueOutsideBounds {
                value,
                min: self.bounds.min,
                max: self.bounds.max,
            }));
        }

        self.value = value;
        Ok(())
    }

    pub fn vary(&self) -> bool {
        self.vary
    }

    pub fn set_vary(&mut self, vary: bool) {
        self.vary = vary;
    }

    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Standard error of the fitted value, `None` until a fit produced a
    /// well-conditioned covariance matrix.
    pub fn stderr(&self) -> Option<f64> {
        self.stderr
    }

    pub fn set_stderr(&mut self, stderr: Option<f64>) {
        self.stderr = stderr;
    }

    /// Value in the optimizer's unbounded coordinates.
    pub fn to_internal(&self) -> Result<f64, ParameterError> {
        Ok(BoundsTransform::new(self.bounds).to_internal(self.value)?)
    }

    /// Physical value for an internal coordinate, without modifying `self`.
    pub fn from_internal(&self, internal: f64) -> f64 {
        BoundsTransform::new(self.bounds).to_external(internal)
    }
}
