//! Integration tests for the estimation pipeline
//!
//! Each module follows one stage of the pipeline, from raw experiment to the
//! ranked result summary.

mod normalization;

mod subsetting;

mod model_set;

mod fitting;

mod report;
