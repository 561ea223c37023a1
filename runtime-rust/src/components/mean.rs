use ndarray::Array1;

use ecmnoise_validator::errors::*;
use ecmnoise_validator::Float;

/// Arithmetic mean of an output column.
///
/// An empty column is reported as [`ErrorKind::EmptyResultSet`] rather than
/// dividing by zero.
pub fn mean(column: &Array1<Float>) -> Result<Float> {
    column.mean()
        .ok_or_else(|| ErrorKind::EmptyResultSet.into())
}
