//! Deterministic, pure logic shared by the processor.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod extract;
pub mod machine;
pub mod queue;
pub mod types;
