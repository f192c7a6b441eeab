use serde::{Deserialize, Serialize};

use super::analysis::FrameFeatures;
use super::decode::AudioData;
use super::frames::FrameGrid;
use crate::error::{ExtractError, Result};

/// A normalized frame-rate feature and the time of each frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSeries {
    pub values: Vec<f64>,
    pub times: Vec<f64>,
}

/// Everything the renderer consumes, in file order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Audio length in seconds
    pub duration: f64,
    pub sample_rate: u32,
    pub rms: FeatureSeries,
    pub spectral_centroid: FeatureSeries,
    /// Onset times in seconds, non-decreasing
    pub onsets: Vec<f64>,
}

impl FeatureRecord {
    /// Build the record from raw frame features and onset times.
    pub fn assemble(
        audio: &AudioData,
        grid: FrameGrid,
        frames: &FrameFeatures,
        onsets: Vec<f64>,
        fill: f64,
    ) -> Self {
        let times = grid.time_axis(audio.samples.len(), audio.sample_rate);

        Self {
            duration: audio.duration(),
            sample_rate: audio.sample_rate,
            rms: FeatureSeries {
                values: normalize(&frames.rms, fill),
                times: times.clone(),
            },
            spectral_centroid: FeatureSeries {
                values: normalize(&frames.spectral_centroid, fill),
                times,
            },
            onsets,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.rms.values.len()
    }

    /// Check the length and finiteness invariants before the record is written.
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            self.rms.values.len(),
            self.rms.times.len(),
            self.spectral_centroid.values.len(),
            self.spectral_centroid.times.len(),
        ];
        if lengths.iter().any(|&len| len != lengths[0]) {
            return Err(ExtractError::LengthMismatch(format!(
                "rms.values={}, rms.times={}, spectral_centroid.values={}, spectral_centroid.times={}",
                lengths[0], lengths[1], lengths[2], lengths[3]
            )));
        }

        let fields: [(&'static str, &[f64]); 5] = [
            ("rms.values", &self.rms.values),
            ("rms.times", &self.rms.times),
            ("spectral_centroid.values", &self.spectral_centroid.values),
            ("spectral_centroid.times", &self.spectral_centroid.times),
            ("onsets", &self.onsets),
        ];
        if !self.duration.is_finite() {
            return Err(ExtractError::NonFinite { field: "duration" });
        }
        for (field, values) in fields {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ExtractError::NonFinite { field });
            }
        }

        Ok(())
    }
}

/// Min-max scale to [0, 1].
///
/// A constant sequence (zero range, e.g. silence) becomes `fill` everywhere.
pub fn normalize(values: &[f64], fill: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !(range.is_finite() && range > 0.0) {
        log::debug!("Degenerate feature (min={}, max={}), using fill {}", min, max, fill);
        return vec![fill; values.len()];
    }

    values
        .iter()
        .map(|&v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}
