//! Audio probe: ordered fallback strategies for exercising an audio output
//! path, with an optional non-terminating ("looping") mode.
//!
//! Chain, first authoritative hit wins:
//! 1. configured command override (blocking, or detached in loop mode);
//! 2. looping sample/tone via ffplay, detached (only when loop requested);
//! 3. blocking sample playback via aplay, with exactly one retry on the
//!    well-known fallback device;
//! 4. speaker-test tone (blocking);
//! 5. ffplay synthesized tone (blocking);
//! 6. no path available.
//!
//! A missing tool fails a strategy's precondition and falls through
//! silently; a tool that ran and failed is authoritative and ends the chain
//! (except for the single aplay retry).

use std::path::Path;

use tracing::{debug, warn};

use crate::config::Config;
use crate::io::process::CommandRunner;
use crate::probe::ExecutionMode;

/// ALSA device tried once more when playback on the configured device fails.
const FALLBACK_DEVICE: &str = "pulse";

/// Run the audio fallback chain and return the probe verdict.
pub fn run<R: CommandRunner>(runner: &R, config: &Config) -> bool {
    notify_advisory(runner, config);

    if let Some(command) = config.audio_override() {
        let mode = if config.audio_loop {
            ExecutionMode::Detached
        } else {
            ExecutionMode::Blocking
        };
        return runner
            .execute(&command, &[], "custom audio command", mode)
            .succeeded;
    }

    if config.audio_loop
        && let Some(ffplay) = runner.resolve("ffplay")
    {
        return start_loop(runner, config, &ffplay);
    }

    if config.audio_sample.exists() {
        return play_sample(runner, config);
    }

    if let Some(speaker_test) = runner.resolve("speaker-test") {
        let command = vec![
            speaker_test.to_string_lossy().into_owned(),
            "-t".to_string(),
            "sine".to_string(),
            "-f".to_string(),
            config.tone_hz.to_string(),
            "-l".to_string(),
            "1".to_string(),
        ];
        return runner
            .execute(&command, &[], "speaker-test tone", ExecutionMode::Blocking)
            .succeeded;
    }

    if let Some(ffplay) = runner.resolve("ffplay") {
        let command = vec![
            ffplay.to_string_lossy().into_owned(),
            "-autoexit".to_string(),
            "-nodisp".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            format!("sine=frequency={}:duration=2", config.tone_hz),
        ];
        return runner
            .execute(&command, &[], "ffplay sine tone", ExecutionMode::Blocking)
            .succeeded;
    }

    warn!("no audio playback command available (set audio_command or provide a sample file)");
    false
}

/// Looping playback: the configured sample if it exists, else a synthesized
/// tone. Launched detached; launch success is the verdict.
fn start_loop<R: CommandRunner>(runner: &R, config: &Config, ffplay: &Path) -> bool {
    let mut command = vec![
        ffplay.to_string_lossy().into_owned(),
        "-loop".to_string(),
        "0".to_string(),
        "-nodisp".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
    ];
    if config.audio_sample.exists() {
        command.push(config.audio_sample.to_string_lossy().into_owned());
    } else {
        command.push("-f".to_string());
        command.push("lavfi".to_string());
        command.push("-i".to_string());
        command.push(format!("sine=frequency={}", config.tone_hz));
    }
    runner
        .execute(&command, &[], "ffplay loop", ExecutionMode::Detached)
        .succeeded
}

/// Blocking sample playback with exactly one retry on [`FALLBACK_DEVICE`].
///
/// The retry fires on any failure of the first attempt and is skipped when
/// the configured device already is the fallback device.
fn play_sample<R: CommandRunner>(runner: &R, config: &Config) -> bool {
    let first = aplay_command(config, &config.audio_device);
    let description = format!("aplay sample on {}", config.audio_device);
    if runner
        .execute(&first, &[], &description, ExecutionMode::Blocking)
        .succeeded
    {
        return true;
    }
    if config.audio_device == FALLBACK_DEVICE {
        return false;
    }
    debug!(device = FALLBACK_DEVICE, "retrying sample playback on fallback device");
    let retry = aplay_command(config, FALLBACK_DEVICE);
    runner
        .execute(
            &retry,
            &[],
            &format!("aplay sample on {FALLBACK_DEVICE}"),
            ExecutionMode::Blocking,
        )
        .succeeded
}

fn aplay_command(config: &Config, device: &str) -> Vec<String> {
    vec![
        "aplay".to_string(),
        "-D".to_string(),
        device.to_string(),
        config.audio_sample.to_string_lossy().into_owned(),
    ]
}

/// Best-effort desktop notification naming the device and sample about to be
/// exercised. Advisory: launched detached, never part of the verdict.
fn notify_advisory<R: CommandRunner>(runner: &R, config: &Config) {
    if !config.graphical_session {
        return;
    }
    let Some(notify_send) = runner.resolve("notify-send") else {
        return;
    };
    let body = if config.audio_sample.exists() {
        format!(
            "Playing {} on device {}",
            config.audio_sample.display(),
            config.audio_device
        )
    } else {
        format!(
            "Playing {} Hz tone on device {}",
            config.tone_hz, config.audio_device
        )
    };
    let command = vec![
        notify_send.to_string_lossy().into_owned(),
        "Audio self-test".to_string(),
        body,
    ];
    runner.execute(&command, &[], "audio test notification", ExecutionMode::Detached);
}
