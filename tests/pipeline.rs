//! End-to-end feature extraction over synthesized WAV files.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use orbfeat::{analyze, decode_audio, write_features, Config, FeatureRecord};

const SR: u32 = 22050;

fn write_wav(path: &Path, samples: &[f64], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &s in samples {
        writer.write_sample(s as f32).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

fn sine(freq: f64, seconds: f64) -> Vec<f64> {
    (0..(seconds * SR as f64) as usize)
        .map(|i| 0.5 * (2.0 * PI * freq * i as f64 / SR as f64).sin())
        .collect()
}

/// Decaying tone bursts at the given start times.
fn bursts(starts: &[f64], seconds: f64) -> Vec<f64> {
    let mut samples = vec![0.0; (seconds * SR as f64) as usize];
    for &start in starts {
        let offset = (start * SR as f64) as usize;
        for n in 0..(SR as usize / 2) {
            if let Some(s) = samples.get_mut(offset + n) {
                let t = n as f64 / SR as f64;
                *s += 0.8 * (-t * 25.0).exp() * (2.0 * PI * 660.0 * t).sin();
            }
        }
    }
    samples
}

fn extract(dir: &Path, name: &str, samples: &[f64]) -> FeatureRecord {
    let path: PathBuf = dir.join(name);
    write_wav(&path, samples, SR);
    let audio = decode_audio(&path, Some(SR)).expect("decode");
    analyze(&audio, &Config::default())
}

fn assert_record_invariants(record: &FeatureRecord) {
    let n = record.rms.values.len();
    assert!(n > 0);
    assert_eq!(record.rms.times.len(), n);
    assert_eq!(record.spectral_centroid.values.len(), n);
    assert_eq!(record.spectral_centroid.times.len(), n);
    assert_eq!(record.rms.times, record.spectral_centroid.times);

    for &v in record.rms.values.iter().chain(&record.spectral_centroid.values) {
        assert!(v.is_finite() && (0.0..=1.0).contains(&v), "value {} out of range", v);
    }

    assert!(record.onsets.windows(2).all(|w| w[0] <= w[1]));
    for &t in &record.onsets {
        assert!(t >= 0.0 && t <= record.duration, "onset {} outside [0, {}]", t, record.duration);
    }
    assert!(record.validate().is_ok());
}

#[test]
fn test_silence_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let record = extract(dir.path(), "silence.wav", &vec![0.0; SR as usize]);

    assert_record_invariants(&record);
    assert!((record.duration - 1.0).abs() < 1e-6);
    assert_eq!(record.sample_rate, SR);
    assert!(record.rms.values.iter().all(|&v| v == 0.0));
    assert!(record.spectral_centroid.values.iter().all(|&v| v == 0.0));
    assert!(record.onsets.is_empty());
}

#[test]
fn test_sine_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a440.wav");
    write_wav(&path, &sine(440.0, 1.0), SR);

    let audio = decode_audio(&path, Some(SR)).unwrap();
    let config = Config::default();

    // Raw centroid before normalization sits near the tone.
    let frames = orbfeat::audio::analysis::analyze_frames(&audio, config.frame_grid());
    let mut sorted = frames.spectral_centroid.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = sorted[sorted.len() / 2];
    assert!((median - 440.0).abs() < 30.0, "median centroid {:.1} Hz", median);

    let record = analyze(&audio, &config);
    assert_record_invariants(&record);
    assert!(record.onsets.len() <= 1, "onsets: {:?}", record.onsets);
    if let Some(&t) = record.onsets.first() {
        assert!(t < 0.1);
    }
}

#[test]
fn test_burst_onsets() {
    let dir = tempfile::tempdir().unwrap();
    let starts = [0.3, 0.9, 1.5, 2.1];
    let record = extract(dir.path(), "bursts.wav", &bursts(&starts, 2.6));

    assert_record_invariants(&record);
    assert_eq!(record.onsets.len(), starts.len(), "onsets: {:?}", record.onsets);
    for (onset, start) in record.onsets.iter().zip(&starts) {
        assert!((onset - start).abs() < 0.1, "onset {:.3} vs burst {:.3}", onset, start);
    }
}

#[test]
fn test_resampled_input_keeps_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hi-rate.wav");
    let samples: Vec<f64> = (0..44100)
        .map(|i| 0.3 * (2.0 * PI * 1000.0 * i as f64 / 44100.0).sin())
        .collect();
    write_wav(&path, &samples, 44100);

    let audio = decode_audio(&path, Some(SR)).unwrap();
    assert_eq!(audio.sample_rate, SR);
    let record = analyze(&audio, &Config::default());

    assert_record_invariants(&record);
    assert_eq!(record.sample_rate, SR);
    assert!((record.duration - 1.0).abs() < 1e-3);
}

#[test]
fn test_native_rate_is_kept_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("native.wav");
    write_wav(&path, &vec![0.1; 16000], 16000);

    let audio = decode_audio(&path, None).unwrap();
    let record = analyze(&audio, &Config::default());
    assert_eq!(record.sample_rate, 16000);
    assert_eq!(record.rms.values.len(), 1 + 16000 / 512);
}

#[test]
fn test_output_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bursts.wav");
    write_wav(&input, &bursts(&[0.2, 0.7], 1.2), SR);

    let out_a = dir.path().join("a.json");
    let out_b = dir.path().join("b.json");
    for out in [&out_a, &out_b] {
        let audio = decode_audio(&input, Some(SR)).unwrap();
        let record = analyze(&audio, &Config::default());
        write_features(&record, out, true).unwrap();
    }

    assert_eq!(std::fs::read(&out_a).unwrap(), std::fs::read(&out_b).unwrap());
}
