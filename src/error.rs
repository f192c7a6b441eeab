use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning an audio file into a sample buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open file")]
    Open(#[source] std::io::Error),

    #[error("unrecognized audio format")]
    Probe(#[source] symphonia::core::errors::Error),

    #[error("no audio tracks found")]
    NoTrack,

    #[error("unknown sample rate")]
    UnknownSampleRate,

    #[error("audio decoding failed")]
    Codec(#[source] symphonia::core::errors::Error),

    #[error("failed to create resampler")]
    ResamplerInit(#[from] rubato::ResamplerConstructionError),

    #[error("resampling failed")]
    Resample(#[from] rubato::ResampleError),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("audio file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    #[error("cannot decode '{}'", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("non-finite value in '{field}'")]
    NonFinite { field: &'static str },

    #[error("feature sequences differ in length ({0})")]
    LengthMismatch(String),

    #[error("failed to serialize features")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
