//! Ranking and reporting of fitted models.
//!
//! [`ResultSummary`] holds one row per fitted model, sorted ascending by AIC so
//! row 0 is the preferred mechanism. Parameter columns carry unit-annotated labels
//! and cells read `"{value} +/- {relative stderr}%"`.

use crate::error::{KineticsError, Result};
use crate::experiment::Experiment;
use crate::kinetics::{KineticConstant, Mechanism};
use crate::model::KineticModel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Placeholder for a parameter a model does not have.
pub const MISSING: &str = "-";

/// Unit strings substituted into parameter labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitLabels {
    pub time: String,
    pub concentration: String,
    pub inhibitor: String,
}

impl UnitLabels {
    pub fn new(time: impl Into<String>, concentration: impl Into<String>, inhibitor: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            concentration: concentration.into(),
            inhibitor: inhibitor.into(),
        }
    }

    /// Units of an experiment. Without an inhibitor, inhibition constants are
    /// concentrations of the product or substrate and share the data unit.
    pub fn from_experiment(experiment: &Experiment, inhibitor_free: bool) -> Self {
        let inhibitor = if inhibitor_free {
            experiment.data_conc_unit.clone()
        } else {
            experiment
                .inhibitor_unit()
                .unwrap_or(experiment.data_conc_unit.as_str())
                .to_string()
        };
        Self::new(&experiment.time_unit, &experiment.data_conc_unit, inhibitor)
    }
}

/// Report label of a constant.
pub fn label(constant: KineticConstant, units: &UnitLabels) -> String {
    match constant {
        KineticConstant::KCat => format!("kcat [1/{}]", units.time),
        KineticConstant::Km => format!("Km [{}]", units.concentration),
        KineticConstant::Kic => format!("Ki competitive [{}]", units.inhibitor),
        KineticConstant::Kiu => format!("Ki uncompetitive [{}]", units.inhibitor),
        KineticConstant::Kie => format!("ki time-dep enzyme-inactiv. [1/{}]", units.time),
    }
}

/// Check that every constant any mechanism can fit maps to its own label.
pub fn validate_label_table() -> Result<()> {
    let units = UnitLabels::new("t", "c", "i");
    let mut seen = HashSet::new();

    for constant in KineticConstant::ALL {
        if !seen.insert(label(constant, &units)) {
            return Err(KineticsError::InvalidInput(format!(
                "label of '{}' is not unique",
                constant
            )));
        }
    }

    let labelled: HashSet<_> = KineticConstant::ALL.into_iter().collect();
    for mechanism in Mechanism::ALL {
        if let Some(constant) = mechanism
            .constants(true)
            .into_iter()
            .find(|c| !labelled.contains(c))
        {
            return Err(KineticsError::InvalidInput(format!(
                "{} fits '{}', which has no report label",
                mechanism, constant
            )));
        }
    }
    Ok(())
}

/// `"{value:.5} +/- {pct:.2}%"` with the standard error relative to the value.
pub fn format_estimate(value: f64, stderr: Option<f64>) -> String {
    let percent = stderr
        .map(|s| s / value * 100.0)
        .filter(|p| p.is_finite())
        .unwrap_or(f64::NAN);
    format!("{:.5} +/- {:.2}%", value, percent)
}

/// One model's line of the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub model: String,
    pub aic: i64,
    pub converged: bool,
    /// One cell per summary column, [`MISSING`] where the model lacks the constant
    pub values: Vec<String>,
}

/// Fitted models ranked by AIC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl ResultSummary {
    /// Summarise fitted models. Models without a result, or with a non-finite
    /// AIC such as a fit that failed at its seed, are left out.
    pub fn from_models(models: &[KineticModel], units: &UnitLabels) -> Self {
        let fitted: Vec<_> = models
            .iter()
            .filter_map(|model| match model.result() {
                Some(result) if result.aic().is_finite() => Some((model, result)),
                Some(result) => {
                    log::warn!(
                        "{}: omitted from summary, AIC is {} ({})",
                        model.name(),
                        result.aic(),
                        result.message
                    );
                    None
                }
                None => {
                    log::warn!("{}: omitted from summary, no fit result", model.name());
                    None
                }
            })
            .collect();

        let constants: Vec<KineticConstant> = KineticConstant::ALL
            .into_iter()
            .filter(|c| fitted.iter().any(|(_, result)| result.value(*c).is_some()))
            .collect();

        let mut rows: Vec<SummaryRow> = fitted
            .iter()
            .map(|(model, result)| SummaryRow {
                model: model.name().to_string(),
                aic: result.aic().round() as i64,
                converged: result.success,
                values: constants
                    .iter()
                    .map(|&c| match result.value(c) {
                        Some(value) => format_estimate(value, result.stderr(c)),
                        None => MISSING.to_string(),
                    })
                    .collect(),
            })
            .collect();
        rows.sort_by_key(|row| row.aic);

        Self {
            columns: constants.iter().map(|&c| label(c, units)).collect(),
            rows,
        }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lowest-AIC row.
    pub fn best(&self) -> Option<&SummaryRow> {
        self.rows.first()
    }

    pub fn get(&self, model: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.model == model)
    }

    /// Cell of `model` under the column labelled `column`.
    pub fn value(&self, model: &str, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.get(model)
            .and_then(|row| row.values.get(index))
            .map(String::as_str)
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.model.as_str()).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header = vec!["model".to_string(), "AIC".to_string(), "converged".to_string()];
        header.extend(self.columns.iter().cloned());

        let lines: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.model.clone(), row.aic.to_string(), row.converged.to_string()];
                cells.extend(row.values.iter().cloned());
                cells
            })
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|col| {
                lines
                    .iter()
                    .map(|cells| cells[col].chars().count())
                    .chain(std::iter::once(header[col].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for cells in std::iter::once(&header).chain(lines.iter()) {
            let line: Vec<String> = cells
                .iter()
                .zip(widths.iter())
                .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())?;
        }
        Ok(())
    }
}
