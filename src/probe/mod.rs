//! Probe data model shared by the display and audio fallback chains.
//!
//! A *probe* exercises one peripheral by walking an ordered list of
//! strategies; a *strategy* is one concrete external-tool invocation. The
//! first strategy whose preconditions hold and whose execution is
//! authoritative ends the chain. Advisory strategies (the zenity dialog, the
//! audio notification) run fire-and-forget and never feed the verdict.

pub mod audio;
pub mod display;

/// Whether the runner waits for the child process or abandons it at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Wait for exit; the exit code decides success.
    Blocking,
    /// Launch and report "started"; the child's eventual exit is never
    /// observed. Used for looping playback and transient dialogs.
    Detached,
}

/// Result of one attempted strategy. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub succeeded: bool,
    pub description: String,
}

impl ProbeOutcome {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            description: description.into(),
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            description: description.into(),
        }
    }
}
