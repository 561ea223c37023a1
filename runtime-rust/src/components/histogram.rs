//! Illustrative noise-distribution preview.
//!
//! The dashboard plots the noise a release at the current calibration could
//! have drawn. The batch drawn here is a display concern only: it is sampled
//! independently of, and after, the single authoritative draw, and nothing
//! from it feeds back into a released value.

use itertools::Itertools;
use itertools::MinMaxResult;

use ecmnoise_validator::errors::*;
use ecmnoise_validator::Float;

use crate::utilities::noise;

/// Batch size of the preview, matching the dashboard's accuracy plot.
pub const PREVIEW_SAMPLE_COUNT: usize = 5_000;
/// Bin count of the preview histogram.
pub const PREVIEW_BIN_COUNT: usize = 70;

/// A probability-normalized histogram of Laplace noise draws.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseHistogram {
    /// `bin_count + 1` ascending edges spanning the sampled range.
    pub edges: Vec<Float>,
    /// Per-bin empirical probabilities; sums to 1 for a nonempty batch.
    pub probabilities: Vec<Float>,
}

/// Draw the standard preview batch at the given scale.
pub fn noise_preview(scale: Float) -> Result<NoiseHistogram> {
    sampled_histogram(scale, PREVIEW_SAMPLE_COUNT, PREVIEW_BIN_COUNT)
}

/// Draw `sample_count` zero-centered Laplace samples and bin them into
/// `bin_count` equal-width bins over their observed range.
pub fn sampled_histogram(scale: Float, sample_count: usize, bin_count: usize) -> Result<NoiseHistogram> {
    if sample_count == 0 || bin_count == 0 {
        return Err("histogram requires at least one sample and one bin".into());
    }
    let samples = noise::sample_laplace_batch(0., scale, sample_count)?;

    let (lowest, highest) = match samples.iter().cloned().minmax() {
        MinMaxResult::MinMax(lowest, highest) => (lowest, highest),
        MinMaxResult::OneElement(only) => (only, only),
        MinMaxResult::NoElements => return Err("histogram requires at least one sample".into()),
    };

    let width = (highest - lowest) / bin_count as Float;
    let edges: Vec<Float> = (0..=bin_count)
        .map(|index| lowest + width * index as Float)
        .collect();

    let mut counts = vec![0_usize; bin_count];
    for sample in &samples {
        let index = if width > 0. {
            (((sample - lowest) / width) as usize).min(bin_count - 1)
        } else {
            // degenerate batch: every sample identical
            0
        };
        counts[index] += 1;
    }

    let probabilities = counts.into_iter()
        .map(|count| count as Float / sample_count as Float)
        .collect();

    Ok(NoiseHistogram { edges, probabilities })
}
