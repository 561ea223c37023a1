//! The single operation exposed to the UI layer.
//!
//! `run_query` threads explicit state through a synchronous pipeline:
//! debounce, filter, calibrate, privatize, format. Every failure mode the
//! dashboard can encounter degrades to a placeholder outcome; only
//! operational faults (a failing entropy source) propagate as errors.

use tracing::debug;

use ecmnoise_validator::base::{
    Dataset, QueryOutcome, QueryResponse, QuerySpec, SessionState,
};
use ecmnoise_validator::errors::*;
use ecmnoise_validator::utilities::privacy::{laplace_error_bound, laplace_scale};
use ecmnoise_validator::Integer;

use crate::components::dp_mean::noisy_mean;
use crate::components::filter::apply_filter;

/// Decide whether a fresh noisy release may be served.
///
/// `false` when nothing has been submitted yet, or when the submit counter
/// has not advanced since the last release (the user changed a filter but
/// has not pressed submit again). The caller owns persisting the served
/// counter between invocations.
pub fn should_release_fresh(current_clicks: Option<Integer>, last_served_clicks: Integer) -> bool {
    match current_clicks {
        None => false,
        Some(clicks) => clicks != last_served_clicks,
    }
}

/// Evaluate one dashboard query.
///
/// The response always carries the matching-record count and, whenever the
/// result set is nonempty, the mechanism's error bound at the current
/// calibration; the noisy value itself is only computed and released when
/// the debouncer approves. Each approved release consumes exactly one
/// Laplace draw.
pub fn run_query(dataset: &Dataset, spec: &QuerySpec, session: SessionState) -> Result<QueryResponse> {
    let indices = apply_filter(dataset, &spec.filter);
    let count = indices.len() as Integer;
    let epsilon = spec.accuracy.epsilon();
    debug!(count, epsilon, filter = %spec.filter, "evaluating portfolio query");

    // The ±bound is a property of the calibration, not of any draw, and is
    // reported even before the first submit.
    let error_bound = match laplace_scale(spec.output.spec().value_range, count, epsilon) {
        Ok(scale) => Some(laplace_error_bound(scale)),
        Err(Error(ErrorKind::EmptyResultSet, _)) => None,
        Err(err) => return Err(err),
    };

    if !should_release_fresh(spec.clicks, session.last_served_clicks) {
        return Ok(QueryResponse {
            count,
            outcome: QueryOutcome::NoResultYet,
            error_bound,
            session,
        });
    }

    // clicks is present whenever the debouncer approves
    let session = SessionState {
        last_served_clicks: spec.clicks.unwrap_or(session.last_served_clicks),
    };

    let column = dataset.column(&indices, spec.output);
    let outcome = match noisy_mean(&column, spec.output.spec().value_range, epsilon) {
        Ok(release) => QueryOutcome::Ready {
            noisy_mean: release.noisy_mean,
            error_bound: release.error_bound,
        },
        Err(Error(ErrorKind::EmptyResultSet, _)) => QueryOutcome::EmptyResult,
        Err(err) => return Err(err),
    };

    Ok(QueryResponse { count, outcome, error_bound, session })
}
