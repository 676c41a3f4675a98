//! Sample-rate conversion to the fixed analysis rate

use crate::error::DecodeError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Input frames per resampler call
const CHUNK_SIZE: usize = 4096;

/// Resample one mono channel from `source_rate` to `target_rate`
///
/// Input is fed in fixed chunks and the filter is flushed at the end, so the
/// output holds exactly `round(len * target_rate / source_rate)` frames.
pub fn resample_mono(
    samples: Vec<f32>,
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, DecodeError> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples);
    }

    let resample_error = |e: &dyn std::fmt::Display| DecodeError::Resample {
        from: source_rate,
        message: e.to_string(),
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = target_rate as f64 / source_rate as f64;
    let expected = (samples.len() as f64 * ratio).round() as usize;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_SIZE, 1)
        .map_err(|e| resample_error(&e))?;

    let mut output: Vec<f32> = Vec::with_capacity(expected + CHUNK_SIZE);
    let mut chunks = samples.chunks_exact(CHUNK_SIZE);
    for chunk in chunks.by_ref() {
        let input = [chunk];
        let out = resampler
            .process(&input[..], None)
            .map_err(|e| resample_error(&e))?;
        output.extend_from_slice(&out[0]);
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let input = [remainder];
        let out = resampler
            .process_partial(Some(&input[..]), None)
            .map_err(|e| resample_error(&e))?;
        output.extend_from_slice(&out[0]);
    }

    // Flush the samples still held back by the filter
    while output.len() < expected {
        let out = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(|e| resample_error(&e))?;
        if out[0].is_empty() {
            break;
        }
        output.extend_from_slice(&out[0]);
    }

    output.resize(expected, 0.0);

    log::debug!(
        "Resampled {} frames ({} Hz) -> {} frames ({} Hz)",
        samples.len(),
        source_rate,
        output.len(),
        target_rate
    );

    Ok(output)
}
