//! Media self-test daemon entry point.
//!
//! Resolves the layered configuration, runs the display and audio probes,
//! then either exits with the verdict or idles as a long-running process.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use mediacheck::config::{self, Config};
use mediacheck::exit_codes;
use mediacheck::idle;
use mediacheck::io::process::SystemRunner;
use mediacheck::logging;
use mediacheck::selftest::run_self_test;

#[derive(Parser)]
#[command(
    name = "mediacheck",
    version,
    about = "Display and audio output self-test daemon"
)]
struct Cli {
    /// Path to a TOML config file (a missing file falls back to defaults).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Skip the self-test and go straight to idling.
    #[arg(long)]
    no_self_test: bool,

    /// Exit 0/1 after the self-test instead of idling.
    #[arg(long)]
    exit_after_self_test: bool,

    /// Full display command line; bypasses every other display strategy.
    #[arg(long, value_name = "CMD")]
    display_command: Option<String>,

    /// Full audio command line; bypasses every other audio strategy.
    #[arg(long, value_name = "CMD")]
    audio_command: Option<String>,

    /// Audio sample file to play.
    #[arg(long, value_name = "PATH")]
    audio_sample: Option<PathBuf>,

    /// Request looping playback where supported.
    #[arg(long)]
    audio_loop: bool,

    /// Output device passed to playback tools.
    #[arg(long, value_name = "DEVICE")]
    audio_device: Option<String>,

    /// Frequency for synthesized-tone fallbacks.
    #[arg(long, value_name = "HZ")]
    tone_hz: Option<u32>,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        process::exit(exit_codes::FAILED);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if config.self_test {
        let passed = run_self_test(&SystemRunner, &config);
        if config.exit_after_self_test {
            process::exit(if passed {
                exit_codes::OK
            } else {
                exit_codes::FAILED
            });
        }
    }

    info!("self-test daemon started");
    idle::run(Duration::from_secs(config.idle_interval_secs))
}

/// Defaults ← optional TOML file ← environment ← CLI flags.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;

    if cli.no_self_test {
        config.self_test = false;
    }
    if cli.exit_after_self_test {
        config.exit_after_self_test = true;
    }
    if let Some(command) = &cli.display_command {
        config.display_command = Some(command.clone());
    }
    if let Some(command) = &cli.audio_command {
        config.audio_command = Some(command.clone());
    }
    if let Some(sample) = &cli.audio_sample {
        config.audio_sample = sample.clone();
    }
    if cli.audio_loop {
        config.audio_loop = true;
    }
    if let Some(device) = &cli.audio_device {
        config.audio_device = device.clone();
    }
    if let Some(tone_hz) = cli.tone_hz {
        config.tone_hz = tone_hz;
    }

    config.validate()?;
    Ok(config)
}
