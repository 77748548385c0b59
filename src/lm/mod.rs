//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides the nonlinear least-squares optimizer used to fit kinetic
//! models. It works on any [`crate::problem::Problem`]; bounded kinetic constants
//! are handled one level up by stepping in unbounded internal coordinates.

pub mod algorithm;
pub mod config;

// Re-export key types
pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::{DecompositionMethod, LmConfig};
