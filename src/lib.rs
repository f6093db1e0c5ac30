//! Boot-time media self-test daemon.
//!
//! Verifies that the host's display and audio output paths are reachable by
//! driving ordered fallback chains of external tools (zenity, ffplay, aplay,
//! speaker-test, ...), then keeps the process alive as a background daemon.
//! The architecture separates:
//!
//! - **[`probe`]**: the display and audio fallback chains plus their shared
//!   data model. This is where all decision logic lives.
//! - **[`io`]**: side-effecting collaborators (process execution, console
//!   device writes). Process execution sits behind the
//!   [`io::process::CommandRunner`] trait so the chains are testable without
//!   spawning anything.
//! - **[`selftest`]**: sequences the probes and reduces them to one verdict.
//!
//! Every strategy failure is absorbed at the probe level and reduced to a
//! boolean; the only fatal errors are startup errors (bad CLI or config).

pub mod config;
pub mod exit_codes;
pub mod idle;
pub mod io;
pub mod logging;
pub mod probe;
pub mod selftest;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
