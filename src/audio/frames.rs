use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Sliding-window layout shared by every frame-rate feature.
///
/// When `center` is set, frame `i` is centered on sample `i * hop` and the
/// buffer is treated as zero-padded by `window / 2` on both sides. Otherwise
/// frame `i` starts at `i * hop` and only the tail is zero-padded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGrid {
    pub window: usize,
    pub hop: usize,
    pub center: bool,
}

impl Default for FrameGrid {
    fn default() -> Self {
        Self {
            window: 2048,
            hop: 512,
            center: true,
        }
    }
}

impl FrameGrid {
    fn pad(&self) -> usize {
        if self.center {
            self.window / 2
        } else {
            0
        }
    }

    /// Number of frames for a buffer of `len` samples. Never less than one.
    pub fn frame_count(&self, len: usize) -> usize {
        let padded = len + 2 * self.pad();
        if padded <= self.window {
            1
        } else {
            1 + (padded - self.window) / self.hop
        }
    }

    /// Copy frame `index` into `out` (length `window`), zero outside the buffer.
    pub fn fill_frame(&self, samples: &[f64], index: usize, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.window);
        let start = (index * self.hop) as isize - self.pad() as isize;
        for (j, slot) in out.iter_mut().enumerate() {
            let idx = start + j as isize;
            *slot = if idx >= 0 && (idx as usize) < samples.len() {
                samples[idx as usize]
            } else {
                0.0
            };
        }
    }

    pub fn frame(&self, samples: &[f64], index: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.window];
        self.fill_frame(samples, index, &mut out);
        out
    }

    /// Whether frame `index` extends into the zero padding after the last sample.
    pub fn overruns_end(&self, index: usize, len: usize) -> bool {
        index * self.hop + self.window > len + self.pad()
    }

    /// Time in seconds of frame `index`.
    pub fn frame_time(&self, index: usize, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        (index * self.hop) as f64 / sample_rate as f64
    }

    /// Time axis for the whole buffer; computed once and shared by all features.
    pub fn time_axis(&self, len: usize, sample_rate: u32) -> Vec<f64> {
        (0..self.frame_count(len))
            .map(|i| self.frame_time(i, sample_rate))
            .collect()
    }

    /// Center frequency of STFT bin `k`.
    pub fn bin_frequency(&self, k: usize, sample_rate: u32) -> f64 {
        k as f64 * sample_rate as f64 / self.window as f64
    }

    /// Number of non-negative frequency bins produced per frame.
    pub fn bins(&self) -> usize {
        self.window / 2 + 1
    }
}

/// Periodic Hann window.
pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / size as f64).cos()))
        .collect()
}

/// Magnitude spectrogram, one frame at a time.
pub struct Stft<'a> {
    samples: &'a [f64],
    grid: FrameGrid,
    fft: Arc<dyn Fft<f64>>,
    hann: Vec<f64>,
    frame: Vec<f64>,
    buffer: Vec<Complex<f64>>,
    index: usize,
    count: usize,
}

impl<'a> Stft<'a> {
    pub fn new(samples: &'a [f64], grid: FrameGrid) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(grid.window);

        Self {
            samples,
            grid,
            fft,
            hann: hann_window(grid.window),
            frame: vec![0.0; grid.window],
            buffer: vec![Complex::new(0.0, 0.0); grid.window],
            index: 0,
            count: grid.frame_count(samples.len()),
        }
    }

    /// Raw (un-windowed) samples of the frame most recently yielded.
    pub fn current_frame(&self) -> &[f64] {
        &self.frame
    }

    /// Advance one frame and return its magnitude spectrum (`window / 2 + 1` bins).
    pub fn next_magnitudes(&mut self) -> Option<Vec<f64>> {
        if self.index >= self.count {
            return None;
        }

        self.grid.fill_frame(self.samples, self.index, &mut self.frame);
        for ((slot, &s), &w) in self.buffer.iter_mut().zip(&self.frame).zip(&self.hann) {
            *slot = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.buffer);
        self.index += 1;

        Some(self.buffer[..self.grid.bins()].iter().map(|c| c.norm()).collect())
    }
}
