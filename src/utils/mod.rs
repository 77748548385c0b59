//! Utility functions and helpers for the enzkin-rs library.

pub mod finite_difference;

pub use finite_difference::jacobian;
