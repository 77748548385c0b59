//! Experiment input container.
//!
//! An [`Experiment`] holds what a kinetics assay produces: a shared time grid, unit
//! strings, which species was measured, and one [`Measurement`] per initial substrate
//! condition with its replicate traces. It carries no estimation logic; the
//! [`crate::dataset`] module turns it into aligned arrays.

use crate::error::{KineticsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which species the raw replicate values report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stoichiometry {
    Substrate,
    Product,
}

impl Stoichiometry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stoichiometry::Substrate => "substrate",
            Stoichiometry::Product => "product",
        }
    }
}

impl FromStr for Stoichiometry {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "substrate" => Ok(Stoichiometry::Substrate),
            "product" => Ok(Stoichiometry::Product),
            other => Err(KineticsError::UnknownStoichiometry(other.to_string())),
        }
    }
}

impl fmt::Display for Stoichiometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One assay condition and its replicate traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub initial_substrate_conc: f64,
    pub enzyme_conc: f64,
    /// Inhibitor concentration; `None` means the assay contained no inhibitor.
    #[serde(default)]
    pub inhibitor_conc: Option<f64>,
    #[serde(default)]
    pub inhibitor_conc_unit: Option<String>,
    /// Replicate traces, each aligned with the experiment's time grid.
    #[serde(default)]
    pub replicates: Vec<Vec<f64>>,
}

impl Measurement {
    pub fn new(initial_substrate_conc: f64, enzyme_conc: f64) -> Self {
        Self {
            initial_substrate_conc,
            enzyme_conc,
            inhibitor_conc: None,
            inhibitor_conc_unit: None,
            replicates: Vec::new(),
        }
    }

    pub fn with_inhibitor(mut self, conc: f64, unit: impl Into<String>) -> Self {
        self.inhibitor_conc = Some(conc);
        self.inhibitor_conc_unit = Some(unit.into());
        self
    }

    pub fn add_replicate(&mut self, values: Vec<f64>) {
        self.replicates.push(values);
    }

    pub fn with_replicate(mut self, values: Vec<f64>) -> Self {
        self.add_replicate(values);
        self
    }

    /// Inhibitor concentration with an absent inhibitor read as `0`.
    ///
    /// This is the single place where "no inhibitor recorded" becomes a numeric
    /// zero driver for the rate laws.
    pub fn inhibitor_conc_or_zero(&self) -> f64 {
        self.inhibitor_conc.unwrap_or(0.0)
    }
}

/// A complete kinetics experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub reactant_name: Option<String>,
    pub time_unit: String,
    pub data_conc_unit: String,
    /// Raw stoichiometry selector, parsed at normalization time.
    pub stoichiometry: String,
    pub time: Vec<f64>,
    pub measurements: Vec<Measurement>,
}

impl Experiment {
    pub fn new(
        time_unit: impl Into<String>,
        data_conc_unit: impl Into<String>,
        stoichiometry: impl Into<String>,
        time: Vec<f64>,
    ) -> Self {
        Self {
            title: None,
            reactant_name: None,
            time_unit: time_unit.into(),
            data_conc_unit: data_conc_unit.into(),
            stoichiometry: stoichiometry.into(),
            time,
            measurements: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_reactant_name(mut self, name: impl Into<String>) -> Self {
        self.reactant_name = Some(name.into());
        self
    }

    pub fn add_measurement(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    pub fn with_measurement(mut self, measurement: Measurement) -> Self {
        self.add_measurement(measurement);
        self
    }

    /// Parse the stoichiometry selector.
    pub fn stoichiometry(&self) -> Result<Stoichiometry> {
        self.stoichiometry.parse()
    }

    /// Species a plot of this experiment shows by default: the one that was measured.
    pub fn measured_species(&self) -> Result<Stoichiometry> {
        self.stoichiometry()
    }

    /// Unit of the inhibitor concentration, taken from the first measurement that
    /// declares one. Inhibitor-free controls usually carry no unit.
    pub fn inhibitor_unit(&self) -> Option<&str> {
        self.measurements
            .iter()
            .find_map(|m| m.inhibitor_conc_unit.as_deref())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
