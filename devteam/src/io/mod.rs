//! I/O collaborators for devteam runs.

pub mod artifacts;
pub mod config;
pub mod generator;
pub mod memory;
pub mod prompt;
pub mod requirements;
pub mod run_log;
