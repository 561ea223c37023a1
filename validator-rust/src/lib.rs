//! Deterministic side of the ecmnoise workspace.
//!
//! This crate owns the portfolio data model, the error taxonomy, and every
//! privacy computation that draws no randomness: Laplace scale calibration,
//! the reported error bound, and the session budget cost. The companion
//! `ecmnoise_runtime` crate consumes these to produce noisy releases.

// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]
#[macro_use]
extern crate error_chain;

#[doc(hidden)]
pub mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain! {
        errors {
            /// No records matched the query filter. A mean over zero records
            /// is undefined and its Laplace scale would divide by zero.
            EmptyResultSet {
                description("empty result set")
                display("no records match the filter; a mean cannot be released")
            }
            /// The privacy-loss parameter is unusable for calibration.
            InvalidEpsilon(epsilon: f64) {
                description("invalid epsilon")
                display("epsilon must be positive and finite, got {}", epsilon)
            }
            /// A declared sensitivity that cannot calibrate a mechanism.
            InvalidValueRange(value_range: f64) {
                description("invalid value range")
                display("value_range must be positive and finite, got {}", value_range)
            }
            /// An accuracy level outside the slider's domain.
            InvalidAccuracyLevel(level: i64) {
                description("invalid accuracy level")
                display("accuracy level must be within [1, 20], got {}", level)
            }
        }
    }
}

#[doc(hidden)]
pub use errors::*;

pub mod base;
pub mod utilities;

/// The numeric type of record fields and released values.
pub type Float = f64;
/// The numeric type of counts and counters.
pub type Integer = i64;
