//! Secure noise primitives.
//!
//! All draws pull entropy from OpenSSL; there is no seeding surface and no
//! reproducibility guarantee.

use std::cmp;

use ieee754::Ieee754;
use openssl::rand::rand_bytes;
use probability::distribution::{Inverse, Laplace};

use ecmnoise_validator::errors::*;

fn fill_secure(buffer: &mut [u8]) -> Result<()> {
    rand_bytes(buffer)
        .map_err(|err| Error::from(format!("entropy source failure: {}", err)))
}

/// Sample the exponent of a uniform draw on [0, 1) as a censored geometric:
/// the 1-based index of the first set bit in a stream of up to 1024 random
/// bits, capped at 1023.
///
/// This makes uniform draws land in each binary precision band [2^-k, 2^-k+1)
/// with probability 2^-k, so floats are produced proportionally to their unit
/// of least precision (Mironov 2012) rather than on a fixed 2^-53 grid.
fn sample_precision_band() -> Result<u16> {
    let mut zeros: u16 = 0;
    for _ in 0..128 {
        let mut byte = [0_u8; 1];
        fill_secure(&mut byte)?;
        if byte[0] == 0 {
            zeros += 8;
        } else {
            zeros += byte[0].leading_zeros() as u16;
            break;
        }
    }
    Ok(cmp::min(zeros + 1, 1023))
}

/// Sample from Uniform[min, max).
///
/// The [0, 1) draw recomposes an IEEE-754 double from a uniformly random
/// 52-bit mantissa and a geometrically sampled exponent, then scales into
/// the requested interval.
///
/// # Arguments
/// * `min` - lower bound, inclusive
/// * `max` - upper bound, exclusive
///
/// # Example
/// ```
/// use ecmnoise_runtime::utilities::noise::sample_uniform;
/// let draw = sample_uniform(0., 1.).unwrap();
/// assert!(draw >= 0. && draw < 1.);
/// ```
pub fn sample_uniform(min: f64, max: f64) -> Result<f64> {
    if !(min <= max) {
        return Err(format!("sample_uniform: min {} must not exceed max {}", min, max).into());
    }

    let mut buffer = [0_u8; 8];
    fill_secure(&mut buffer)?;
    let mantissa: u64 = u64::from_be_bytes(buffer) >> 12;

    let exponent: u16 = 1023 - sample_precision_band()?;
    let uniform = f64::recompose_raw(false, exponent, mantissa);

    Ok(uniform * (max - min) + min)
}

/// Sample from a Laplace distribution by inverse transform.
///
/// # Arguments
/// * `shift` - center of the distribution
/// * `scale` - scale parameter, must be positive and finite
///
/// # Example
/// ```
/// use ecmnoise_runtime::utilities::noise::sample_laplace;
/// let draw = sample_laplace(0., 2.).unwrap();
/// assert!(draw.is_finite());
/// ```
pub fn sample_laplace(shift: f64, scale: f64) -> Result<f64> {
    if !scale.is_finite() || scale <= 0. {
        return Err(format!("laplace scale must be positive and finite, got {}", scale).into());
    }
    let probability = sample_uniform(0., 1.)?;
    Ok(Laplace::new(shift, scale).inverse(probability))
}

/// Draw `n` independent Laplace samples. Used only for the illustrative
/// noise-distribution preview; authoritative releases take exactly one draw.
pub fn sample_laplace_batch(shift: f64, scale: f64, n: usize) -> Result<Vec<f64>> {
    (0..n).map(|_| sample_laplace(shift, scale)).collect()
}

#[cfg(test)]
mod test_uniform {
    use super::*;

    #[test]
    fn draws_stay_in_the_half_open_interval() {
        for _ in 0..1000 {
            let draw = sample_uniform(0., 1.).unwrap();
            assert!(draw >= 0. && draw < 1.);
        }
        for _ in 0..100 {
            let draw = sample_uniform(-5., 5.).unwrap();
            assert!(draw >= -5. && draw < 5.);
        }
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(sample_uniform(1., 0.).is_err());
    }

    #[test]
    fn empirical_mean_is_centered() {
        let n = 10_000;
        let total: f64 = (0..n)
            .map(|_| sample_uniform(0., 1.).unwrap())
            .sum();
        let mean = total / n as f64;
        // std of the mean is 1/sqrt(12 n) ≈ 0.0029; allow 5 sigma
        assert!((mean - 0.5).abs() < 0.015, "uniform mean drifted: {}", mean);
    }
}

#[cfg(test)]
mod test_laplace {
    use super::*;

    #[test]
    fn nonpositive_scale_is_rejected() {
        assert!(sample_laplace(0., 0.).is_err());
        assert!(sample_laplace(0., -2.).is_err());
        assert!(sample_laplace(0., f64::NAN).is_err());
    }

    #[test]
    fn repeated_draws_differ() {
        let first = sample_laplace(0., 2.).unwrap();
        let second = sample_laplace(0., 2.).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn empirical_moments_match_the_distribution() {
        let shift = 10.;
        let scale = 2.;
        let n = 10_000;
        let samples = sample_laplace_batch(shift, scale, n).unwrap();

        let mean: f64 = samples.iter().sum::<f64>() / n as f64;
        // std of the mean is scale * sqrt(2/n); allow 5 sigma
        let tolerance = 5. * scale * (2. / n as f64).sqrt();
        assert!((mean - shift).abs() < tolerance, "laplace mean drifted: {}", mean);

        // mean absolute deviation of Laplace(shift, b) is exactly b
        let mad: f64 = samples.iter().map(|draw| (draw - shift).abs()).sum::<f64>() / n as f64;
        assert!((mad - scale).abs() < 0.15 * scale, "laplace spread drifted: {}", mad);
    }
}
