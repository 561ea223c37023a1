use ndarray::Array1;

use ecmnoise_validator::base::{Dataset, OutputField, QueryFilter};
use ecmnoise_validator::errors::*;
use ecmnoise_validator::utilities::privacy::{laplace_error_bound, laplace_scale};
use ecmnoise_validator::{Float, Integer};

use crate::components::filter::apply_filter;
use crate::components::mean::mean;
use crate::utilities::noise;

/// A differentially private mean release.
///
/// `true_mean` is retained for tests and auditing and must never reach the
/// display layer; `error_bound` is a deterministic property of the mechanism
/// at this scale, independent of the drawn noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoisyMeanRelease {
    pub count: Integer,
    pub true_mean: Float,
    pub noisy_mean: Float,
    pub scale: Float,
    pub error_bound: Float,
}

/// Privatize the mean of one extracted column with a single Laplace draw.
///
/// The scale is `(value_range / count) / epsilon`; an empty column surfaces
/// as [`ErrorKind::EmptyResultSet`] before any arithmetic can divide by zero.
pub fn noisy_mean(column: &Array1<Float>, value_range: Float, epsilon: Float) -> Result<NoisyMeanRelease> {
    let count = column.len() as Integer;
    let scale = laplace_scale(value_range, count, epsilon)?;
    let true_mean = mean(column)?;
    let draw = noise::sample_laplace(0., scale)?;

    Ok(NoisyMeanRelease {
        count,
        true_mean,
        noisy_mean: true_mean + draw,
        scale,
        error_bound: laplace_error_bound(scale),
    })
}

/// Filter the dataset, extract the output column, and privatize its mean
/// using the field's declared value range.
pub fn noisy_mean_release(
    dataset: &Dataset, filter: &QueryFilter, output: OutputField, epsilon: Float,
) -> Result<NoisyMeanRelease> {
    let indices = apply_filter(dataset, filter);
    let column = dataset.column(&indices, output);
    noisy_mean(&column, output.spec().value_range, epsilon)
}

#[cfg(test)]
mod test_noisy_mean {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn calibration_matches_the_worked_example() {
        // 1000 records, value_range=100, epsilon=0.05 => b=2, bound≈11.98
        let column = Array1::from(vec![10.; 1000]);
        let release = noisy_mean(&column, 100., 0.05).unwrap();

        assert_eq!(release.count, 1000);
        assert_eq!(release.true_mean, 10.);
        assert_eq!(release.scale, 2.);
        assert!((release.error_bound - 11.9829).abs() < 1e-3);
        // P(|noise| > 50) = exp(-25): a failure here means a broken sampler
        assert!((release.noisy_mean - release.true_mean).abs() < 50.);
    }

    #[test]
    fn empty_column_is_an_empty_result_error() {
        let err = noisy_mean(&arr1::<Float>(&[]), 100., 0.05).unwrap_err();
        assert!(matches!(err, Error(ErrorKind::EmptyResultSet, _)));
    }

    #[test]
    fn invalid_epsilon_is_rejected_before_sampling() {
        let column = arr1(&[1., 2., 3.]);
        assert!(matches!(
            noisy_mean(&column, 100., 0.).unwrap_err(),
            Error(ErrorKind::InvalidEpsilon(_), _)));
    }

    #[test]
    fn releases_are_nondeterministic() {
        let column = arr1(&[5., 10., 15.]);
        let first = noisy_mean(&column, 100., 0.1).unwrap();
        let second = noisy_mean(&column, 100., 0.1).unwrap();
        assert_ne!(first.noisy_mean, second.noisy_mean);
        // ... but the deterministic parts agree
        assert_eq!(first.error_bound, second.error_bound);
        assert_eq!(first.true_mean, second.true_mean);
    }

    #[test]
    fn empirical_noise_is_centered_on_the_true_mean() {
        let column = arr1(&[20.; 100]);
        let n = 10_000;
        let scale = (100. / 100.) / 0.05; // b = 20 at this calibration

        let total: Float = (0..n)
            .map(|_| noisy_mean(&column, 100., 0.05).map(|release| release.noisy_mean))
            .collect::<Result<Vec<Float>>>().unwrap()
            .into_iter().sum();
        let empirical = total / n as Float;

        let tolerance = 5. * scale * (2. / n as Float).sqrt();
        assert!((empirical - 20.).abs() < tolerance, "noisy mean drifted: {}", empirical);
    }
}
