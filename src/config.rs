use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::frames::FrameGrid;
use crate::error::ExtractError;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub onset: OnsetConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Analysis rate in Hz; 0 keeps the file's native rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_hop")]
    pub hop: usize,
    #[serde(default = "default_center")]
    pub center: bool,
}

/// Peak-picking policy for onset detection. Time spans are in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct OnsetConfig {
    #[serde(default = "default_pre_max")]
    pub pre_max: f64,
    #[serde(default = "default_post_max")]
    pub post_max: f64,
    #[serde(default = "default_pre_avg")]
    pub pre_avg: f64,
    #[serde(default = "default_post_avg")]
    pub post_avg: f64,
    #[serde(default = "default_wait")]
    pub wait: f64,
    #[serde(default = "default_delta")]
    pub delta: f64,
    #[serde(default = "default_top_db")]
    pub top_db: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeConfig {
    /// Emitted for every frame when a feature is constant (e.g. silence).
    #[serde(default = "default_fill")]
    pub fill: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            window: default_window(),
            hop: default_hop(),
            center: default_center(),
        }
    }
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            pre_max: default_pre_max(),
            post_max: default_post_max(),
            pre_avg: default_pre_avg(),
            post_avg: default_post_avg(),
            wait: default_wait(),
            delta: default_delta(),
            top_db: default_top_db(),
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            fill: default_fill(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

fn default_sample_rate() -> u32 { 22050 }
fn default_window() -> usize { 2048 }
fn default_hop() -> usize { 512 }
fn default_center() -> bool { true }
fn default_pre_max() -> f64 { 0.03 }
fn default_post_max() -> f64 { 0.0 }
fn default_pre_avg() -> f64 { 0.10 }
fn default_post_avg() -> f64 { 0.10 }
fn default_wait() -> f64 { 0.03 }
fn default_delta() -> f64 { 0.07 }
fn default_top_db() -> f64 { 80.0 }
fn default_fill() -> f64 { 0.0 }
fn default_pretty() -> bool { true }

impl Config {
    pub fn frame_grid(&self) -> FrameGrid {
        FrameGrid {
            window: self.analysis.window,
            hop: self.analysis.hop,
            center: self.analysis.center,
        }
    }

    /// Target rate for the decoder, `None` when the native rate is kept.
    pub fn target_sample_rate(&self) -> Option<u32> {
        match self.analysis.sample_rate {
            0 => None,
            rate => Some(rate),
        }
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        let invalid = |msg: String| Err(ExtractError::InvalidConfig(msg));

        if self.analysis.window < 2 {
            return invalid(format!("window must be at least 2, got {}", self.analysis.window));
        }
        if self.analysis.hop == 0 {
            return invalid("hop must be at least 1".into());
        }

        let o = &self.onset;
        let spans = [
            ("pre_max", o.pre_max),
            ("post_max", o.post_max),
            ("pre_avg", o.pre_avg),
            ("post_avg", o.post_avg),
            ("wait", o.wait),
        ];
        for (name, value) in spans {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("onset.{} must be a non-negative number, got {}", name, value));
            }
        }
        if !o.delta.is_finite() {
            return invalid(format!("onset.delta must be finite, got {}", o.delta));
        }
        if !o.top_db.is_finite() || o.top_db <= 0.0 {
            return invalid(format!("onset.top_db must be positive, got {}", o.top_db));
        }

        let fill = self.normalize.fill;
        if !(0.0..=1.0).contains(&fill) {
            return invalid(format!("normalize.fill must lie in [0, 1], got {}", fill));
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// First existing config file among `./orbfeat.toml`, `~/.config/orbfeat/config.toml`
/// and the platform config directory.
pub fn discover_config() -> Option<PathBuf> {
    let local = PathBuf::from("orbfeat.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("orbfeat").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("orbfeat").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
