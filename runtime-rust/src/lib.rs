//! Sampling side of the ecmnoise workspace.
//!
//! Evaluates filtered-mean queries over the portfolio dataset and privatizes
//! them with Laplace noise calibrated by `ecmnoise_validator`. The single
//! entry point for UI callers is [`query::run_query`].

pub mod components;
pub mod query;
pub mod utilities;

pub use ecmnoise_validator::errors;
