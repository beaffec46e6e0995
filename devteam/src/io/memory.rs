//! Shared conversation context for every generation call of a run.
//!
//! The memory is owned by the run and passed by reference into each chain
//! invocation. It only grows: every call appends the prompt it sent and the
//! text it received, and later calls see the whole history.

use serde::{Deserialize, Serialize};

use crate::core::types::GenerationStep;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Human,
    Ai,
}

/// One message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub step: GenerationStep,
    pub text: String,
}

/// Append-only conversation buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Record one completed exchange.
    pub fn save_exchange(&mut self, step: GenerationStep, prompt: &str, output: &str) {
        self.turns.push(Turn {
            speaker: Speaker::Human,
            step,
            text: prompt.to_string(),
        });
        self.turns.push(Turn {
            speaker: Speaker::Ai,
            step,
            text: output.to_string(),
        });
    }
}
