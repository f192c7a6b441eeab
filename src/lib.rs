//! Audio feature extraction for visualization: loudness (RMS), brightness
//! (spectral centroid) and onset times on a shared frame grid.

pub mod audio;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;

pub use audio::decode::{decode_audio, AudioData};
pub use audio::features::{FeatureRecord, FeatureSeries};
pub use audio::frames::FrameGrid;
pub use config::Config;
pub use error::{DecodeError, ExtractError};
pub use output::write_features;
pub use pipeline::analyze;
