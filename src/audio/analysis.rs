use super::decode::AudioData;
use super::frames::{FrameGrid, Stft};

/// Frame-rate features before normalization. Both sequences have one entry per frame.
#[derive(Clone, Debug, Default)]
pub struct FrameFeatures {
    /// RMS energy (linear amplitude)
    pub rms: Vec<f64>,
    /// Spectral centroid (Hz)
    pub spectral_centroid: Vec<f64>,
}

impl FrameFeatures {
    pub fn len(&self) -> usize {
        self.rms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rms.is_empty()
    }
}

pub fn analyze_frames(audio: &AudioData, grid: FrameGrid) -> FrameFeatures {
    let count = grid.frame_count(audio.samples.len());
    let mut rms = Vec::with_capacity(count);
    let mut spectral_centroid = Vec::with_capacity(count);

    let mut stft = Stft::new(&audio.samples, grid);
    while let Some(magnitudes) = stft.next_magnitudes() {
        rms.push(frame_rms(stft.current_frame()));
        spectral_centroid.push(centroid(&magnitudes, grid, audio.sample_rate));
    }

    log::info!(
        "Frame analysis: {} frames (window={}, hop={}, centered={})",
        rms.len(),
        grid.window,
        grid.hop,
        grid.center
    );

    FrameFeatures {
        rms,
        spectral_centroid,
    }
}

/// Root-mean-square over the full (zero-padded) frame.
pub fn frame_rms(frame: &[f64]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|s| s * s).sum::<f64>() / frame.len() as f64).sqrt()
}

/// Magnitude-weighted mean frequency; 0 for a silent frame.
pub fn centroid(magnitudes: &[f64], grid: FrameGrid, sample_rate: u32) -> f64 {
    let total: f64 = magnitudes.iter().sum();
    if total <= 1e-10 {
        return 0.0;
    }
    magnitudes
        .iter()
        .enumerate()
        .map(|(k, &mag)| grid.bin_frequency(k, sample_rate) * mag)
        .sum::<f64>()
        / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: u32, seconds: f64) -> AudioData {
        let n = (seconds * sample_rate as f64) as usize;
        let samples = (0..n)
            .map(|i| 0.5 * (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin())
            .collect();
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn test_rms_of_constant_frame() {
        assert!((frame_rms(&[0.5; 64]) - 0.5).abs() < 1e-12);
        assert!((frame_rms(&[-0.25; 64]) - 0.25).abs() < 1e-12);
        assert_eq!(frame_rms(&[]), 0.0);
    }

    #[test]
    fn test_sequences_share_length() {
        let audio = sine(440.0, 22050, 1.0);
        let grid = FrameGrid::default();
        let features = analyze_frames(&audio, grid);

        assert_eq!(features.rms.len(), features.spectral_centroid.len());
        assert_eq!(features.len(), grid.frame_count(audio.samples.len()));
    }

    #[test]
    fn test_silence_has_zero_rms_and_centroid() {
        let audio = AudioData {
            samples: vec![0.0; 22050],
            sample_rate: 22050,
        };
        let features = analyze_frames(&audio, FrameGrid::default());

        assert!(features.rms.iter().all(|&v| v == 0.0));
        assert!(features.spectral_centroid.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_sine_centroid_near_its_frequency() {
        let audio = sine(440.0, 22050, 1.0);
        let features = analyze_frames(&audio, FrameGrid::default());

        // Interior frames see a full window of the tone.
        let n = features.len();
        for &c in &features.spectral_centroid[4..n - 4] {
            assert!((c - 440.0).abs() < 25.0, "centroid {:.1} Hz", c);
        }
    }

    #[test]
    fn test_sine_rms_in_steady_state() {
        let audio = sine(440.0, 22050, 1.0);
        let features = analyze_frames(&audio, FrameGrid::default());

        // 0.5 amplitude sine → RMS 0.5 / sqrt(2)
        let expected = 0.5 / 2f64.sqrt();
        let mid = features.len() / 2;
        assert!((features.rms[mid] - expected).abs() < 0.01);
        // Edge frames include zero padding.
        assert!(features.rms[0] < features.rms[mid]);
    }

    #[test]
    fn test_short_buffer_yields_single_frame() {
        let audio = AudioData {
            samples: vec![0.2; 300],
            sample_rate: 22050,
        };
        let grid = FrameGrid {
            center: false,
            ..FrameGrid::default()
        };
        let features = analyze_frames(&audio, grid);

        assert_eq!(features.len(), 1);
        let expected = (300.0 * 0.04 / 2048.0f64).sqrt();
        assert!((features.rms[0] - expected).abs() < 1e-12);
    }
}
