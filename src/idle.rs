//! Keep-alive loop for the daemon after the self-test.

use std::thread;
use std::time::Duration;

use tracing::info;

/// Emit a liveness line every `interval`, forever.
pub fn run(interval: Duration) -> ! {
    loop {
        info!("running, waiting for events");
        thread::sleep(interval);
    }
}
