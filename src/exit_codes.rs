//! Stable exit codes for the self-test driver.

/// Both probes passed (only observable with `exit_after_self_test`).
pub const OK: i32 = 0;
/// At least one probe failed, or startup failed (bad CLI/config).
pub const FAILED: i32 = 1;
