//! Self-test coordinator: runs the display probe, then the audio probe, and
//! reduces the pair to a single verdict.

use tracing::{info, warn};

use crate::config::Config;
use crate::io::process::CommandRunner;
use crate::probe::{audio, display};

/// Run both probes in fixed order and return the logical AND of their
/// verdicts.
///
/// Display always resolves first, including its detached launches; audio
/// starts only after the display chain has returned. No retries happen at
/// this layer.
pub fn run_self_test<R: CommandRunner>(runner: &R, config: &Config) -> bool {
    info!("running media self-test (display + audio)");
    let display_ok = display::run(runner, config);
    let audio_ok = audio::run(runner, config);
    if display_ok && audio_ok {
        info!(display_ok, audio_ok, "media self-test passed");
    } else {
        warn!(display_ok, audio_ok, "media self-test incomplete");
    }
    display_ok && audio_ok
}
