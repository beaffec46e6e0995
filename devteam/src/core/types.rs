//! Shared deterministic types for the processing core.
//!
//! These types define stable contracts between the processor and its
//! collaborators. They do not depend on external state or I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a [`SequentialRequirementProcessor`] run.
///
/// [`SequentialRequirementProcessor`]: crate::team::SequentialRequirementProcessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Constructed, `start` not yet called.
    Idle,
    /// Popping the next requirement off the queue.
    GatheringNext,
    /// Waiting on the code-generation collaborator.
    GeneratingCode,
    /// Waiting on the test-generation collaborator.
    GeneratingTests,
    /// Absorbing terminal phase.
    Terminated,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::GatheringNext => "gathering_next",
            Phase::GeneratingCode => "generating_code",
            Phase::GeneratingTests => "generating_tests",
            Phase::Terminated => "terminated",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Terminated
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-lifetime counters. Neither is ever reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Number of requirements popped off the queue (1-based after the first pop).
    pub story_count: u32,
    /// Number of requirements whose test generation completed.
    pub testing_rounds: u32,
}

/// The two artifacts produced for every requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    AppCode,
    TestCode,
}

impl ArtifactKind {
    fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::AppCode => "app_code",
            ArtifactKind::TestCode => "test_code",
        }
    }

    /// Artifact name for the given story, without extension (`app_code_3`).
    pub fn artifact_name(self, story_count: u32) -> String {
        format!("{}_{story_count}", self.prefix())
    }
}

/// Which generation chain a collaborator call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStep {
    /// Project-manager elaboration of a requirement into a user story.
    Requirements,
    /// Application code from a requirement.
    AppCode,
    /// Test code from generated application code.
    TestCode,
}

impl GenerationStep {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationStep::Requirements => "requirements",
            GenerationStep::AppCode => "app_code",
            GenerationStep::TestCode => "test_code",
        }
    }
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
