//! Test-only collaborators: scripted generation and in-memory artifact writes.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::types::GenerationStep;
use crate::errors::PersistenceFailure;
use crate::io::artifacts::ArtifactWriter;
use crate::io::generator::{GenerationRequest, Generator};

/// A generation call as seen by [`ScriptedGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub step: GenerationStep,
    pub story: u32,
    pub prompt: String,
    /// Number of history turns passed with the call.
    pub history_len: usize,
}

/// Generator that replays queued outputs, then optionally echoes.
///
/// Echo output is `echo[<step>#<story>] after <n> turns`, so it changes as the
/// shared history grows.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    outputs: RefCell<VecDeque<Result<String, String>>>,
    echo: bool,
    fail_at: Option<(GenerationStep, u32)>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedGenerator {
    /// Replay `outputs` in order; `Err` entries fail the corresponding call.
    pub fn new(outputs: Vec<Result<String, String>>) -> Self {
        Self {
            outputs: RefCell::new(outputs.into()),
            ..Self::default()
        }
    }

    /// Answer every call with an echo of its step, story and history size.
    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Fail the call for `step` while processing `story`.
    pub fn failing_at(mut self, step: GenerationStep, story: u32) -> Self {
        self.fail_at = Some((step, story));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        self.calls.borrow_mut().push(RecordedCall {
            step: request.step,
            story: request.story,
            prompt: request.prompt.to_string(),
            history_len: request.history.len(),
        });
        if self.fail_at == Some((request.step, request.story)) {
            return Err(anyhow!("scripted failure at {} #{}", request.step, request.story));
        }
        match self.outputs.borrow_mut().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(anyhow!(msg)),
            None if self.echo => Ok(format!(
                "echo[{}#{}] after {} turns",
                request.step,
                request.story,
                request.history.len()
            )),
            None => Err(anyhow!("scripted generator exhausted")),
        }
    }
}

/// Writer that keeps every write in memory, in call order.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    writes: RefCell<Vec<(String, String)>>,
    fail_on: Option<String>,
}

impl RecordingWriter {
    /// Reject writes to `name` with a [`PersistenceFailure`].
    pub fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.borrow().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.writes
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Latest contents written under `name`.
    pub fn contents(&self, name: &str) -> Option<String> {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|(written, _)| written == name)
            .map(|(_, contents)| contents.clone())
    }
}

impl ArtifactWriter for RecordingWriter {
    fn write(&self, name: &str, contents: &str) -> Result<()> {
        if self.fail_on.as_deref() == Some(name) {
            return Err(PersistenceFailure {
                name: name.to_string(),
                cause: anyhow!("permission denied"),
            }
            .into());
        }
        self.writes
            .borrow_mut()
            .push((name.to_string(), contents.to_string()));
        Ok(())
    }
}
