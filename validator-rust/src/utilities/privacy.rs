//! Deterministic calibration arithmetic for the Laplace mechanism.
//!
//! Everything here is a pure function of the query parameters. The actual
//! noise draw lives in the runtime crate; keeping the two apart makes the
//! error bound trivially deterministic, a property of the mechanism rather
//! than of any particular sample.

use crate::errors::*;
use crate::{Float, Integer};

/// Confidence level of the reported two-sided error bound.
pub const RELEASE_CONFIDENCE: Float = 0.975;

/// Per-session privacy budget under basic composition. The cost display
/// reports each release as a percentage of this allowance.
pub const SESSION_EPSILON_BUDGET: Float = 4.0;

/// Reject privacy-loss parameters that cannot calibrate a mechanism.
pub fn check_epsilon(epsilon: Float) -> Result<()> {
    if !epsilon.is_finite() || epsilon <= 0.0 {
        return Err(ErrorKind::InvalidEpsilon(epsilon).into());
    }
    Ok(())
}

/// Laplace scale for a bounded-mean query: `(value_range / count) / epsilon`.
///
/// Each record contributes at most `value_range` to the sum, which is divided
/// by `count`, so `value_range / count` bounds the per-query sensitivity.
/// This is the standard simplified bound; records are not clipped against the
/// declared range, so the guarantee is conditional on the range being honest.
///
/// # Arguments
/// * `value_range` - declared max − min spread of the output field
/// * `count` - number of records in the result set
/// * `epsilon` - privacy-loss parameter
///
/// # Example
/// ```
/// use ecmnoise_validator::utilities::privacy::laplace_scale;
/// let scale = laplace_scale(100., 1000, 0.05).unwrap();
/// assert!((scale - 2.0).abs() < 1e-12);
/// ```
pub fn laplace_scale(value_range: Float, count: Integer, epsilon: Float) -> Result<Float> {
    check_epsilon(epsilon)?;
    if !value_range.is_finite() || value_range <= 0.0 {
        return Err(ErrorKind::InvalidValueRange(value_range).into());
    }
    if count <= 0 {
        return Err(ErrorKind::EmptyResultSet.into());
    }
    Ok((value_range / count as Float) / epsilon)
}

/// Two-sided error bound reported alongside a release:
/// `2 * (-scale * ln(2 - 2 * RELEASE_CONFIDENCE))`, the doubled 97.5th
/// Laplace quantile at the given scale.
pub fn laplace_error_bound(scale: Float) -> Float {
    2.0 * (-scale * (2.0 - 2.0 * RELEASE_CONFIDENCE).ln())
}

/// Percentage of the session budget one release at `epsilon` consumes.
pub fn privacy_cost_percent(epsilon: Float) -> Float {
    100.0 * epsilon / SESSION_EPSILON_BUDGET
}



#[cfg(test)]
mod test_budget {
    use super::*;

    #[test]
    fn cost_is_a_share_of_the_session_budget() {
        assert_eq!(privacy_cost_percent(0.05), 1.25);
        assert_eq!(privacy_cost_percent(0.2), 5.0);
    }
}
