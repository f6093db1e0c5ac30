//! Status text output to a console-like device node.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::{info, warn};

/// Result of a console write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleWrite {
    Written,
    /// The process may not own the console on this host; reported distinctly
    /// so the display chain can fall through.
    PermissionDenied,
    Failed,
}

/// Write `message` (newline-framed) to the device node at `path`.
pub fn write_status(path: &Path, message: &str) -> ConsoleWrite {
    let mut file = match OpenOptions::new().write(true).open(path) {
        Ok(file) => file,
        Err(err) => return classify(&err, path),
    };
    match write!(file, "\n{message}\n") {
        Ok(()) => {
            info!(tty = %path.display(), "wrote display message");
            ConsoleWrite::Written
        }
        Err(err) => classify(&err, path),
    }
}

fn classify(err: &std::io::Error, path: &Path) -> ConsoleWrite {
    if err.kind() == ErrorKind::PermissionDenied {
        warn!(tty = %path.display(), err = %err, "permission denied writing display message");
        ConsoleWrite::PermissionDenied
    } else {
        warn!(tty = %path.display(), err = %err, "failed to write display message");
        ConsoleWrite::Failed
    }
}
