//! Side-effecting collaborators for the probe chains.

pub mod console;
pub mod process;
