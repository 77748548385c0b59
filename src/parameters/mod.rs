//! # Parameter System
//!
//! Named, bounded parameters in the style of lmfit-py, reduced to what kinetic
//! model fitting needs.
//!
//! - [`Parameter`]: one kinetic constant with value, bounds, varying flag and standard error
//! - [`Parameters`]: an ordered collection whose order defines the optimizer's parameter vector
//! - [`Bounds`] and [`BoundsTransform`]: the Minuit transform between bounded physical
//!   values and the unbounded coordinates the optimizer steps in
//!
//! ```rust
//! use enzkin_rs::parameters::Parameters;
//!
//! let mut params = Parameters::new();
//! params.add_param_with_bounds("k_cat", 10.0, 0.1, 1000.0).unwrap();
//! params.add_param_with_bounds("Km", 4.0, 0.04, 400.0).unwrap();
//!
//! // Optimizer coordinates, and back
//! let internal = params.varying_internal_values().unwrap();
//! params.update_from_internal(&internal).unwrap();
//! assert!((params.value_of("Km").unwrap() - 4.0).abs() < 1e-9);
//! ```

pub mod bounds;
pub mod parameter;
pub mod parameters;

// Re-export key types
pub use bounds::{Bounds, BoundsError, BoundsTransform};
pub use parameter::{Parameter, ParameterError};
pub use parameters::Parameters;
