//! Display probe: ordered fallback strategies for exercising a visual
//! output path.
//!
//! Chain, first authoritative hit wins:
//! 1. configured command override (blocking, terminal);
//! 2. zenity dialog when a graphical session is present — advisory only,
//!    launched detached, always falls through;
//! 3. direct write to the console device node;
//! 4. ffplay synthetic test pattern (blocking, terminal either way);
//! 5. no path available.

use tracing::{info, warn};

use crate::config::Config;
use crate::io::console::{self, ConsoleWrite};
use crate::io::process::CommandRunner;
use crate::probe::ExecutionMode;

/// Run the display fallback chain and return the probe verdict.
pub fn run<R: CommandRunner>(runner: &R, config: &Config) -> bool {
    if let Some(command) = config.display_override() {
        return runner
            .execute(&command, &[], "custom display command", ExecutionMode::Blocking)
            .succeeded;
    }

    trigger_dialog(runner, config);

    if config.display_tty.exists() {
        match console::write_status(&config.display_tty, &config.display_message) {
            ConsoleWrite::Written => return true,
            // logged at the write site; keep walking the chain
            ConsoleWrite::PermissionDenied | ConsoleWrite::Failed => {}
        }
    }

    if let Some(ffplay) = runner.resolve("ffplay") {
        let command = vec![
            ffplay.to_string_lossy().into_owned(),
            "-autoexit".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            "testsrc=size=640x480:rate=30".to_string(),
            "-t".to_string(),
            config.pattern_duration_secs().to_string(),
        ];
        return runner
            .execute(&command, &[], "ffplay display pattern", ExecutionMode::Blocking)
            .succeeded;
    }

    warn!(
        tty = %config.display_tty.display(),
        "no display command available (set display_command or grant access to the console node)"
    );
    false
}

/// Best-effort zenity info dialog.
///
/// Advisory: the dialog is launched detached and its outcome never feeds the
/// probe verdict, so the chain always continues to the console-write
/// strategy regardless of what happens here.
fn trigger_dialog<R: CommandRunner>(runner: &R, config: &Config) {
    if !config.graphical_session {
        return;
    }
    let Some(zenity) = runner.resolve("zenity") else {
        return;
    };
    let command = vec![
        zenity.to_string_lossy().into_owned(),
        "--info".to_string(),
        "--text".to_string(),
        config.display_message.clone(),
        "--timeout".to_string(),
        config.dialog_timeout_secs().to_string(),
    ];
    let envs = [("DISPLAY".to_string(), ":0".to_string())];
    let outcome = runner.execute(&command, &envs, "zenity info dialog", ExecutionMode::Detached);
    if outcome.succeeded {
        info!("triggered zenity info dialog on DISPLAY :0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;
    use std::fs;
    use std::path::PathBuf;

    fn config_with_tty(tty: PathBuf) -> Config {
        Config {
            display_tty: tty,
            ..Config::default()
        }
    }

    /// A path that exists nowhere, so the console strategy never applies.
    fn no_tty_config() -> Config {
        config_with_tty(PathBuf::from("/nonexistent/mediacheck/tty"))
    }

    #[test]
    fn override_bypasses_every_other_strategy() {
        let runner = ScriptedRunner::with_tools(&["zenity", "ffplay"]);
        runner.script("probe-display", &[true]);
        let config = Config {
            display_command: Some("probe-display --full".to_string()),
            graphical_session: true,
            ..no_tty_config()
        };

        assert!(run(&runner, &config));
        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].command, vec!["probe-display", "--full"]);
        assert_eq!(recorded[0].mode, ExecutionMode::Blocking);
    }

    #[test]
    fn override_failure_is_the_probe_verdict() {
        let runner = ScriptedRunner::with_tools(&["ffplay"]);
        runner.script("probe-display", &[false]);
        let config = Config {
            display_command: Some("probe-display".to_string()),
            ..no_tty_config()
        };

        assert!(!run(&runner, &config));
        assert_eq!(runner.recorded().len(), 1);
    }

    #[test]
    fn dialog_is_advisory_and_falls_through_to_console_write() {
        let temp = tempfile::tempdir().expect("tempdir");
        let tty = temp.path().join("tty");
        fs::write(&tty, "").expect("create tty");

        let runner = ScriptedRunner::with_tools(&["zenity"]);
        let config = Config {
            graphical_session: true,
            ..config_with_tty(tty.clone())
        };

        assert!(run(&runner, &config));

        // The dialog launched detached with DISPLAY=:0, then the console
        // write decided the verdict.
        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].command[0].ends_with("zenity"));
        assert_eq!(recorded[0].mode, ExecutionMode::Detached);
        assert!(
            recorded[0]
                .envs
                .contains(&("DISPLAY".to_string(), ":0".to_string()))
        );
        assert!(fs::read_to_string(&tty).expect("tty").contains(&config.display_message));
    }

    #[test]
    fn dialog_is_skipped_without_graphical_session() {
        let temp = tempfile::tempdir().expect("tempdir");
        let tty = temp.path().join("tty");
        fs::write(&tty, "").expect("create tty");

        let runner = ScriptedRunner::with_tools(&["zenity"]);
        let config = config_with_tty(tty);

        assert!(run(&runner, &config));
        assert!(runner.recorded().is_empty());
    }

    #[test]
    fn console_write_failure_falls_through_to_pattern() {
        // A directory opens but cannot be written, exercising the
        // fall-through without depending on permission bits.
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::with_tools(&["ffplay"]);
        runner.script("ffplay", &[true]);
        let config = config_with_tty(temp.path().to_path_buf());

        assert!(run(&runner, &config));
        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].command[0].ends_with("ffplay"));
        assert!(
            recorded[0]
                .command
                .contains(&"testsrc=size=640x480:rate=30".to_string())
        );
    }

    #[test]
    fn pattern_exit_code_is_the_verdict() {
        let runner = ScriptedRunner::with_tools(&["ffplay"]);
        runner.script("ffplay", &[false]);

        assert!(!run(&runner, &no_tty_config()));
        assert_eq!(runner.recorded().len(), 1);
    }

    #[test]
    fn pattern_duration_tracks_config() {
        let runner = ScriptedRunner::with_tools(&["ffplay"]);
        let config = Config {
            display_duration_secs: Some(7),
            ..no_tty_config()
        };

        assert!(run(&runner, &config));
        let command = &runner.recorded()[0].command;
        let t_pos = command.iter().position(|arg| arg == "-t").expect("-t flag");
        assert_eq!(command[t_pos + 1], "7");
    }

    #[test]
    fn no_strategy_available_fails() {
        let runner = ScriptedRunner::new();

        assert!(!run(&runner, &no_tty_config()));
        assert!(runner.recorded().is_empty());
    }

    #[test]
    fn probe_is_idempotent_in_a_stable_environment() {
        let runner = ScriptedRunner::with_tools(&["ffplay"]);
        let config = no_tty_config();

        assert_eq!(run(&runner, &config), run(&runner, &config));
    }
}
