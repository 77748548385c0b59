//! Ordered parameter collection.
//!
//! Unlike a name-keyed map, [`Parameters`] keeps insertion order: the position of a
//! parameter is its column in the optimizer's parameter vector and in the Jacobian,
//! so the order must be stable from seeding through covariance estimation.

use crate::parameters::parameter::{Parameter, ParameterError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    params: Vec<Parameter>,
}

impl Parameters {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Append a parameter; names must be unique.
    pub fn add(&mut self, param: Parameter) -> Result<(), ParameterError> {
        if self.contains(param.name()) {
            return Err(ParameterError::DuplicateParameter {
                name: param.name().to_string(),
            });
        }
        self.params.push(param);
        Ok(())
    }

    pub fn add_param(&mut self, name: &str, value: f64) -> Result<(), ParameterError> {
        self.add(Parameter::new(name, value))
    }

    /// Add a parameter bounded to `[min, max]`.
    ///
    /// ```
    /// use enzkin_rs::parameters::Parameters;
    ///
    /// let mut params = Parameters::new();
    /// params.add_param_with_bounds("k_cat", 40.0, 0.4, 4000.0).unwrap();
    /// params.add_param_with_bounds("Km", 2.5, 0.025, 250.0).unwrap();
    /// assert_eq!(params.names(), vec!["k_cat", "Km"]);
    /// ```
    pub fn add_param_with_bounds(
        &mut self,
        name: &str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), ParameterError> {
        self.add(Parameter::with_bounds(name, value, min, max)?)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name() == name)
    }

    /// Value of a parameter, or an error naming the missing parameter.
    pub fn value_of(&self, name: &str) -> Result<f64, ParameterError> {
        self.get(name)
            .map(Parameter::value)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(Parameter::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.params.iter_mut()
    }

    /// Parameters the optimizer varies, in order.
    pub fn varying(&self) -> Vec<&Parameter> {
        self.params.iter().filter(|p| p.vary()).collect()
    }

    pub fn varying_count(&self) -> usize {
        self.params.iter().filter(|p| p.vary()).count()
    }

    /// Current external values of the varying parameters.
    pub fn varying_values(&self) -> Array1<f64> {
        self.params
            .iter()
            .filter(|p| p.vary())
            .map(Parameter::value)
            .collect()
    }

    /// Starting point for the optimizer in internal coordinates.
    pub fn varying_internal_values(&self) -> Result<Array1<f64>, ParameterError> {
        self.params
            .iter()
            .filter(|p| p.vary())
            .map(Parameter::to_internal)
            .collect::<Result<Vec<_>, _>>()
            .map(Array1::from_vec)
    }

    /// Map an internal vector to external values of the varying parameters
    /// without touching the collection.
    pub fn external_from_internal(&self, internal: &Array1<f64>) -> Result<Array1<f64>, ParameterError> {
        let varying = self.varying();
        if internal.len() != varying.len() {
            return Err(ParameterError::LengthMismatch {
                expected: varying.len(),
                actual: internal.len(),
            });
        }

        Ok(varying
            .iter()
            .zip(internal.iter())
            .map(|(param, &value)| param.from_internal(value))
            .collect())
    }

    /// Overwrite the varying parameters from an internal vector.
    pub fn update_from_internal(&mut self, internal: &Array1<f64>) -> Result<(), ParameterError> {
        let external = self.external_from_internal(internal)?;
        self.update_varying(&external)
    }

    /// Overwrite the varying parameters from external values.
    pub fn update_varying(&mut self, external: &Array1<f64>) -> Result<(), ParameterError> {
        let expected = self.varying_count();
        if external.len() != expected {
            return Err(ParameterError::LengthMismatch {
                expected,
                actual: external.len(),
            });
        }

        for (param, &value) in self
            .params
            .iter_mut()
            .filter(|p| p.vary())
            .zip(external.iter())
        {
            // Transforms can land a hair outside the interval through rounding.
            let value = param.bounds().clamp(value);
            param.set_value(value)?;
        }
        Ok(())
    }
}
