use crate::audio::analysis::analyze_frames;
use crate::audio::decode::AudioData;
use crate::audio::features::FeatureRecord;
use crate::audio::onset::detect_onsets;
use crate::config::Config;

/// Run frame analysis and onset detection over one buffer and assemble the record.
pub fn analyze(audio: &AudioData, config: &Config) -> FeatureRecord {
    let grid = config.frame_grid();

    log::info!("Pass 1: RMS and spectral centroid...");
    let frames = analyze_frames(audio, grid);

    log::info!("Pass 2: Onset detection...");
    let onsets = detect_onsets(audio, grid, &config.onset);

    log::info!("Pass 3: Normalization & assembly...");
    FeatureRecord::assemble(audio, grid, &frames, onsets, config.normalize.fill)
}
