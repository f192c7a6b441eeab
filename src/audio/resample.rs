use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::DecodeError;

/// Band-limited conversion of a mono buffer from `from_rate` to `to_rate`.
///
/// The output holds `ceil(len * to_rate / from_rate)` samples with the filter
/// delay removed, so sample 0 stays at t = 0.
pub fn resample(samples: &[f64], from_rate: u32, to_rate: u32) -> Result<Vec<f64>, DecodeError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let expected = (samples.len() as f64 * ratio).ceil() as usize;

    let mut resampler = SincFixedIn::<f64>::new(
        ratio,
        1.0, // fixed ratio
        params,
        samples.len(),
        1, // mono
    )?;
    let delay = resampler.output_delay();

    let mut output = resampler
        .process(&[samples], None)?
        .into_iter()
        .next()
        .unwrap_or_default();

    // Push one chunk of silence through to flush the filter tail.
    while output.len() < expected + delay {
        let tail = resampler.process_partial::<&[f64]>(None, None)?;
        match tail.into_iter().next() {
            Some(chunk) if !chunk.is_empty() => output.extend(chunk),
            _ => break,
        }
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected, 0.0);
    Ok(output)
}
