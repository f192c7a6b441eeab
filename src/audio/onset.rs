//! Onset detection via log-power spectral flux and local-maximum peak picking.

use super::decode::AudioData;
use super::frames::{FrameGrid, Stft};
use crate::config::OnsetConfig;

const AMIN: f64 = 1e-10;

/// Peak-picking windows converted from seconds to frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeakWindows {
    pub pre_max: usize,
    pub post_max: usize,
    pub pre_avg: usize,
    pub post_avg: usize,
    pub wait: usize,
}

impl PeakWindows {
    pub fn from_config(config: &OnsetConfig, grid: FrameGrid, sample_rate: u32) -> Self {
        let frames_per_sec = sample_rate as f64 / grid.hop as f64;
        let to_frames = |seconds: f64| (seconds * frames_per_sec).floor() as usize;

        Self {
            pre_max: to_frames(config.pre_max),
            post_max: to_frames(config.post_max) + 1,
            pre_avg: to_frames(config.pre_avg),
            post_avg: to_frames(config.post_avg) + 1,
            wait: to_frames(config.wait),
        }
    }
}

/// Onset times in seconds, strictly increasing.
pub fn detect_onsets(audio: &AudioData, grid: FrameGrid, config: &OnsetConfig) -> Vec<f64> {
    let strength = onset_strength(audio, grid, config.top_db);
    if !strength.iter().any(|&s| s > 0.0) {
        log::info!("Onsets: none (flat onset envelope)");
        return Vec::new();
    }

    let envelope = normalize_envelope(&strength);
    let windows = PeakWindows::from_config(config, grid, audio.sample_rate);
    let peaks = pick_peaks(&envelope, windows, config.delta);

    log::info!("Onsets: {} detected over {} frames", peaks.len(), strength.len());

    peaks
        .into_iter()
        .map(|frame| grid.frame_time(frame, audio.sample_rate))
        .collect()
}

/// Per-frame mean of the rectified rise in log power across all bins.
///
/// Power is converted to dB and floored at `top_db` below the loudest bin of
/// the whole signal. The frame preceding frame 0 sits at that floor. Frames
/// past the first that reach into the zero padding after the last sample
/// score zero: the cut-off there is not a transient in the signal.
pub fn onset_strength(audio: &AudioData, grid: FrameGrid, top_db: f64) -> Vec<f64> {
    let max_db = {
        let mut stft = Stft::new(&audio.samples, grid);
        let mut peak = f64::NEG_INFINITY;
        while let Some(mags) = stft.next_magnitudes() {
            for &m in &mags {
                peak = peak.max(power_db(m));
            }
        }
        peak
    };
    let floor = (max_db - top_db).max(power_db(0.0));

    let len = audio.samples.len();
    let mut previous = vec![floor; grid.bins()];
    let mut strength = Vec::with_capacity(grid.frame_count(len));

    let mut stft = Stft::new(&audio.samples, grid);
    while let Some(mags) = stft.next_magnitudes() {
        let mut rise = 0.0;
        for (prev, &m) in previous.iter_mut().zip(&mags) {
            let db = power_db(m).max(floor);
            rise += (db - *prev).max(0.0);
            *prev = db;
        }

        let index = strength.len();
        if index > 0 && grid.overruns_end(index, len) {
            strength.push(0.0);
        } else {
            strength.push(rise / mags.len() as f64);
        }
    }

    strength
}

fn power_db(magnitude: f64) -> f64 {
    10.0 * (magnitude * magnitude).max(AMIN).log10()
}

/// Shift to zero minimum and scale to a maximum of (just under) one.
fn normalize_envelope(strength: &[f64]) -> Vec<f64> {
    let min = strength.iter().copied().fold(f64::INFINITY, f64::min);
    let shifted: Vec<f64> = strength.iter().map(|&s| s - min).collect();
    let max = shifted.iter().copied().fold(0.0f64, f64::max) + f64::MIN_POSITIVE;
    shifted.into_iter().map(|s| s / max).collect()
}

/// Frame indices where `x` is a local maximum that stands `delta` above the
/// local mean, with at least `wait` frames between consecutive picks.
pub fn pick_peaks(x: &[f64], windows: PeakWindows, delta: f64) -> Vec<usize> {
    let n = x.len();
    let mut peaks: Vec<usize> = Vec::new();

    for i in 0..n {
        let max_lo = i.saturating_sub(windows.pre_max);
        let max_hi = (i + windows.post_max).min(n);
        let local_max = x[max_lo..max_hi].iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if x[i] != local_max {
            continue;
        }

        let avg_lo = i.saturating_sub(windows.pre_avg);
        let avg_hi = (i + windows.post_avg).min(n);
        let local_mean = x[avg_lo..avg_hi].iter().sum::<f64>() / (avg_hi - avg_lo) as f64;
        if x[i] < local_mean + delta {
            continue;
        }

        let far_enough = peaks.last().map_or(true, |&last| i > last + windows.wait);
        if far_enough {
            peaks.push(i);
        }
    }

    peaks
}
