mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;

use cli::Cli;
use orbfeat::config::{self, Config};
use orbfeat::{AudioData, ExtractError, FeatureRecord};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ExtractError>() {
                Some(ExtractError::InputNotFound(path)) => {
                    eprintln!("Error: Audio file '{}' not found.", path.display());
                }
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.input.exists() {
        return Err(ExtractError::InputNotFound(cli.input.clone()).into());
    }

    let config = load_settings(cli)?;
    config.validate()?;

    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!(
        "Grid: window={} hop={} centered={}, sample rate: {}",
        config.analysis.window,
        config.analysis.hop,
        config.analysis.center,
        match config.target_sample_rate() {
            Some(rate) => format!("{}Hz", rate),
            None => "native".to_string(),
        }
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = extract(cli, &config, &spinner);
    spinner.finish_and_clear();
    let record = result?;

    println!("Audio features extracted and saved to {}", cli.output.display());
    println!("Duration: {:.2} seconds", record.duration);
    println!("RMS frames: {}", record.rms.values.len());
    println!("Spectral centroid frames: {}", record.spectral_centroid.values.len());
    println!("Onset events: {}", record.onsets.len());

    Ok(())
}

fn extract(cli: &Cli, config: &Config, spinner: &ProgressBar) -> Result<FeatureRecord> {
    // 1. Decode audio
    spinner.set_message("Decoding audio...");
    let audio: AudioData = orbfeat::decode_audio(&cli.input, config.target_sample_rate())?;

    // 2. Analyze
    spinner.set_message(format!("Analyzing {:.1}s of audio...", audio.duration()));
    let record = orbfeat::analyze(&audio, config);

    // 3. Write
    spinner.set_message("Writing features...");
    orbfeat::write_features(&record, &cli.output, config.output.pretty)?;

    Ok(record)
}

/// Config file (explicit or discovered) with command-line overrides applied.
fn load_settings(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Cannot use config {}", path.display()))?,
        None => match config::discover_config() {
            Some(path) => match config::load_config(&path) {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", path.display());
                    cfg
                }
                Err(e) => {
                    log::warn!("Ignoring config {}: {:#}", path.display(), e);
                    Config::default()
                }
            },
            None => Config::default(),
        },
    };

    if let Some(rate) = cli.sample_rate {
        config.analysis.sample_rate = rate;
    }
    if let Some(window) = cli.window {
        config.analysis.window = window;
    }
    if let Some(hop) = cli.hop {
        config.analysis.hop = hop;
    }
    if cli.no_center {
        config.analysis.center = false;
    }
    if cli.compact {
        config.output.pretty = false;
    }

    Ok(config)
}
