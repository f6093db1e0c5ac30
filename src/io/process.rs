//! Child process execution for probe strategies.
//!
//! Probes never spawn directly: they go through [`CommandRunner`], which
//! exists so chains can be exercised in tests with scripted runners that
//! return predetermined outcomes without launching anything.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::probe::{ExecutionMode, ProbeOutcome};

/// Executes external tools on behalf of probe strategies.
pub trait CommandRunner {
    /// Run `command` (argv; element 0 is the executable name or path) with
    /// `envs` added to the child environment.
    ///
    /// Blocking mode waits for exit and captures stdout/stderr without
    /// displaying them live. Detached mode reports launch success and
    /// abandons the child. No retries happen at this layer; fallback is the
    /// caller's responsibility.
    fn execute(
        &self,
        command: &[String],
        envs: &[(String, String)],
        description: &str,
        mode: ExecutionMode,
    ) -> ProbeOutcome;

    /// Locate `tool` on `PATH`. `None` fails the strategy's precondition.
    fn resolve(&self, tool: &str) -> Option<PathBuf>;
}

/// The real runner backed by `std::process::Command`.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn execute(
        &self,
        command: &[String],
        envs: &[(String, String)],
        description: &str,
        mode: ExecutionMode,
    ) -> ProbeOutcome {
        let Some((program, args)) = command.split_first() else {
            warn!("{description} failed: empty command");
            return ProbeOutcome::failure(format!("{description} failed: empty command"));
        };
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (key, value) in envs {
            cmd.env(key, value);
        }
        match mode {
            ExecutionMode::Blocking => run_blocking(cmd, program, description),
            ExecutionMode::Detached => spawn_detached(cmd, program, description),
        }
    }

    fn resolve(&self, tool: &str) -> Option<PathBuf> {
        resolve_on_path(tool)
    }
}

fn run_blocking(mut cmd: Command, program: &str, description: &str) -> ProbeOutcome {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    debug!(program, "running blocking command");
    let output = match cmd.output() {
        Ok(output) => output,
        Err(err) => return classify_spawn_error(&err, program, description),
    };
    if output.status.success() {
        info!(program, "{description} succeeded");
        return ProbeOutcome::success(format!("{description} succeeded"));
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let code = describe_exit(output.status.code());
    warn!(
        program,
        exit_code = %code,
        stderr,
        "{description} failed"
    );
    ProbeOutcome::failure(format!(
        "{description} failed with exit code {code}. stderr: {stderr}"
    ))
}

fn spawn_detached(mut cmd: Command, program: &str, description: &str) -> ProbeOutcome {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    debug!(program, "launching detached command");
    match cmd.spawn() {
        Ok(child) => {
            // The child is intentionally non-owned: looping playback and
            // dialogs must not block the probe, and nothing ever waits on or
            // kills them.
            drop(child);
            info!(program, "{description} started in background");
            ProbeOutcome::success(format!("{description} started in background"))
        }
        Err(err) => classify_spawn_error(&err, program, description),
    }
}

/// A missing executable signals a missing host dependency, not a runtime
/// fault, and must stay distinguishable from an exit-code failure in logs.
fn classify_spawn_error(err: &std::io::Error, program: &str, description: &str) -> ProbeOutcome {
    if err.kind() == ErrorKind::NotFound {
        warn!(program, "{description} failed: command not found");
        ProbeOutcome::failure(format!(
            "{description} failed: command not found ({program})"
        ))
    } else {
        warn!(program, err = %err, "{description} failed to start");
        ProbeOutcome::failure(format!("{description} failed to start: {err}"))
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown (terminated by signal)".to_string(),
    }
}

/// `which`-style lookup. Names containing a path separator are checked
/// directly; bare names are searched on `PATH`.
fn resolve_on_path(tool: &str) -> Option<PathBuf> {
    let direct = Path::new(tool);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
