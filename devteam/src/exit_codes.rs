//! Stable exit codes for devteam CLI commands.

/// Run completed (including runs with no requirements).
pub const OK: i32 = 0;
/// Invalid requirements input, configuration, or other usage errors.
pub const INVALID: i32 = 1;
/// A generation or persistence collaborator failed and stopped the run.
pub const FAILED: i32 = 2;
