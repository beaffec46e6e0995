//! Error taxonomy for a processor run.
//!
//! Each error is a concrete type wrapped into `anyhow::Error` at the point of
//! failure, so callers classify failures with `err.downcast_ref::<T>()`. None of
//! them is recovered inside the processor.

use std::error::Error;
use std::fmt;

use crate::core::types::GenerationStep;

/// The initial requirement input was not a list of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInputError {
    pub reason: String,
}

impl InvalidInputError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InvalidInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid requirements input: {}", self.reason)
    }
}

impl Error for InvalidInputError {}

/// The text-generation collaborator failed. The cause is kept opaque.
#[derive(Debug)]
pub struct GenerationFailure {
    pub step: GenerationStep,
    /// Story being processed when the call failed (0 outside the item loop).
    pub story: u32,
    pub cause: anyhow::Error,
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} generation failed for story {}: {:#}",
            self.step, self.story, self.cause
        )
    }
}

impl Error for GenerationFailure {}

/// The file-write collaborator failed. The cause is kept opaque.
#[derive(Debug)]
pub struct PersistenceFailure {
    pub name: String,
    pub cause: anyhow::Error,
}

impl fmt::Display for PersistenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to persist {}: {:#}", self.name, self.cause)
    }
}

impl Error for PersistenceFailure {}

/// An operation other than `end` was attempted after the run terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlreadyTerminatedError {
    pub operation: &'static str,
}

impl fmt::Display for AlreadyTerminatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} called after the run terminated", self.operation)
    }
}

impl Error for AlreadyTerminatedError {}
