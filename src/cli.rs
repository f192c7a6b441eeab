use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "orbfeat",
    version,
    about = "Extract RMS, spectral centroid and onset features from an audio file"
)]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
    pub input: PathBuf,

    /// Output JSON file
    pub output: PathBuf,

    /// Config file (defaults to orbfeat.toml or the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Analysis sample rate in Hz (0 keeps the file's native rate)
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Analysis window length in samples
    #[arg(long)]
    pub window: Option<usize>,

    /// Hop length in samples
    #[arg(long)]
    pub hop: Option<usize>,

    /// Start frames at sample 0 instead of centering them
    #[arg(long)]
    pub no_center: bool,

    /// Write single-line JSON
    #[arg(long)]
    pub compact: bool,
}
