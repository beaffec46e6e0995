//! Sequential "software team" driven by language-model prompt calls.
//!
//! For every requirement in a FIFO queue the team generates application code,
//! generates a test for that code, and writes both to files. The crate keeps a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (queue, phases, counters, code-block
//!   extraction). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting collaborators (model backend, artifact files,
//!   config and requirement loading). Behind traits so tests can script them.
//!
//! [`team`] coordinates core logic with the collaborators to implement a run.

pub mod core;
pub mod errors;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod team;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
