//! # enzkin-rs
//!
//! `enzkin-rs` estimates the kinetic constants of enzyme-catalysed reactions from
//! time-course concentration data. Every candidate reaction mechanism is written
//! as an ODE system, fitted to all replicates at once with a Levenberg-Marquardt
//! optimizer, and the mechanisms are ranked by the Akaike information criterion.
//!
//! The library provides:
//! - An [`Experiment`] container for raw measurements, loadable from JSON
//! - Data normalization with mass-balance closure and validity checks
//! - Nine rate laws (Michaelis-Menten, product, substrate and inhibitor inhibition)
//! - A bounded, lmfit-style parameter system and a Levenberg-Marquardt optimizer
//! - Covariance-based standard errors and an AIC-ranked [`ResultSummary`]
//!
//! ## Basic Usage
//!
//! ```
//! use enzkin_rs::{Experiment, FitOptions, Measurement, ParameterEstimator};
//!
//! let time = vec![0.0, 2.0, 4.0, 6.0, 8.0, 9.0];
//! let experiment = Experiment::new("min", "mM", "product", time)
//!     .with_measurement(
//!         Measurement::new(100.0, 0.05)
//!             .with_replicate(vec![0.0, 7.9, 15.2, 21.8, 27.9, 30.7])
//!             .with_replicate(vec![0.0, 8.1, 15.5, 22.3, 28.4, 31.2]),
//!     )
//!     .with_measurement(
//!         Measurement::new(200.0, 0.05).with_replicate(vec![0.0, 9.6, 18.8, 27.7, 36.2, 40.3]),
//!     );
//!
//! let mut estimator = ParameterEstimator::new(experiment).unwrap();
//! let options = FitOptions::default().with_parallel(false);
//! let summary = estimator.fit_models(&options).unwrap();
//!
//! assert!(!summary.is_empty());
//! for pair in summary.rows().windows(2) {
//!     assert!(pair[0].aic <= pair[1].aic);
//! }
//! ```

pub mod error;

// Parameter system
pub mod parameters;

// Input data
pub mod dataset;
pub mod experiment;
pub mod subset;

// Optimization
pub mod lm;
pub mod problem;
pub mod uncertainty;
pub mod utils;

// Kinetic modelling
pub mod estimator;
pub mod fitting;
pub mod guess;
pub mod kinetics;
pub mod model;
pub mod report;

// Re-exports for convenience
pub use error::{KineticsError, Result};

pub use dataset::NormalizedDataset;
pub use estimator::{ModelSelection, ParameterEstimator};
pub use experiment::{Experiment, Measurement, Stoichiometry};
pub use fitting::{fit_model, fit_models, FitOptions, FitResult, InitialStatePolicy};
pub use guess::InitialGuesses;
pub use kinetics::{KineticConstant, Mechanism};
pub use lm::{LevenbergMarquardt, LmConfig};
pub use model::{build_model_set, KineticModel};
pub use problem::Problem;
pub use report::{ResultSummary, UnitLabels};
pub use subset::{Subset, SubsetSpec};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
