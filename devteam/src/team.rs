//! Orchestration for a sequential requirement → code → test run.
//!
//! The processor pops requirements off a FIFO queue and, for each one, asks the
//! generation collaborator for application code, persists it, asks for a test of
//! that code, and persists the test. One [`ConversationMemory`] is shared by all
//! generation calls of the run, so later items see the history of earlier ones.
//!
//! Collaborator failures are never caught here: they propagate to the caller
//! and the run stops where it is.

use std::fmt;

use anyhow::{Result, anyhow};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::extract::code_or_text;
use crate::core::machine::{ProcessingState, validate_counters};
use crate::core::queue::RequirementQueue;
use crate::core::types::{ArtifactKind, Counters, GenerationStep, Phase};
use crate::errors::AlreadyTerminatedError;
use crate::io::artifacts::ArtifactWriter;
use crate::io::generator::{Generator, run_chain};
use crate::io::memory::ConversationMemory;
use crate::io::prompt::PromptEngine;
use crate::io::requirements::requirements_from_value;
use crate::io::run_log::{RunSummary, StoryRecord};

/// Behavior switches for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorOptions {
    /// Run the requirements-elaboration chain per item and generate code from
    /// its output. Off by default: the raw requirement text is used.
    pub elaborate_requirements: bool,
    /// Persist and forward only the first fenced code block of each output.
    pub extract_code_blocks: bool,
}

/// Progress reported to the caller before/after each major step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorEvent {
    NoRequirements,
    StoryStarted { story: u32, requirement: String },
    RequirementsElaborated { story: u32 },
    /// A popped item left no working requirement. Processing stops without error.
    MissingRequirement { story: u32 },
    CodeSaved { story: u32, name: String },
    TestSaved { story: u32, name: String },
    Completed { counters: Counters },
}

impl fmt::Display for ProcessorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorEvent::NoRequirements => f.write_str("No requirements to process."),
            ProcessorEvent::StoryStarted { story, requirement } => {
                write!(f, "\nProcessing Story {story}...\n\nUser Story:\n{requirement}")
            }
            ProcessorEvent::RequirementsElaborated { story } => {
                write!(f, "User story {story} elaborated.")
            }
            ProcessorEvent::MissingRequirement { .. } => {
                f.write_str("No user story found to generate code.")
            }
            ProcessorEvent::CodeSaved { .. } => f.write_str("Application code generated and saved."),
            ProcessorEvent::TestSaved { .. } => f.write_str("Test code generated and saved."),
            ProcessorEvent::Completed { .. } => f.write_str("Processing complete."),
        }
    }
}

/// Drives the per-item sequence over a [`RequirementQueue`].
pub struct SequentialRequirementProcessor<'a, G, W> {
    generator: &'a G,
    writer: &'a W,
    prompts: PromptEngine,
    options: ProcessorOptions,
    queue: RequirementQueue,
    state: ProcessingState,
    memory: ConversationMemory,
    popped: u32,
    stories: Vec<StoryRecord>,
    completion_reported: bool,
}

impl<'a, G: Generator, W: ArtifactWriter> SequentialRequirementProcessor<'a, G, W> {
    pub fn new(
        queue: RequirementQueue,
        generator: &'a G,
        writer: &'a W,
        options: ProcessorOptions,
    ) -> Result<Self> {
        Ok(Self {
            generator,
            writer,
            prompts: PromptEngine::new()?,
            options,
            queue,
            state: ProcessingState::default(),
            memory: ConversationMemory::new(),
            popped: 0,
            stories: Vec::new(),
            completion_reported: false,
        })
    }

    /// Validated factory for untyped input.
    ///
    /// Fails with [`InvalidInputError`](crate::errors::InvalidInputError) unless
    /// `value` is a list of strings. Nothing is constructed on failure.
    pub fn from_value(
        value: &Value,
        generator: &'a G,
        writer: &'a W,
        options: ProcessorOptions,
    ) -> Result<Self> {
        let queue = requirements_from_value(value)?;
        Self::new(queue, generator, writer, options)
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn counters(&self) -> Counters {
        self.state.counters()
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Start, process every queued item in order, and terminate.
    #[instrument(skip_all, fields(items = self.queue.len()))]
    pub fn run<F: FnMut(&ProcessorEvent)>(&mut self, mut on_event: F) -> Result<RunSummary> {
        let mut phase = self.start(&mut on_event)?;
        while phase == Phase::GatheringNext {
            phase = self.process_next(&mut on_event)?;
        }
        Ok(self.summary())
    }

    /// Leave `Idle`. An empty queue is reported and terminates immediately.
    pub fn start<F: FnMut(&ProcessorEvent)>(&mut self, on_event: &mut F) -> Result<Phase> {
        self.ensure_not_terminated("start")?;
        self.state.begin(self.queue.is_empty())?;
        info!(items = self.queue.len(), "run started");
        if self.state.phase().is_terminal() {
            on_event(&ProcessorEvent::NoRequirements);
            self.end(on_event)?;
        }
        Ok(self.state.phase())
    }

    /// Process exactly one queued requirement and return the next phase.
    #[instrument(skip_all, fields(story = self.state.counters().story_count + 1))]
    pub fn process_next<F: FnMut(&ProcessorEvent)>(&mut self, on_event: &mut F) -> Result<Phase> {
        self.ensure_not_terminated("process_next")?;
        if self.state.phase() != Phase::GatheringNext {
            return Err(anyhow!(
                "process_next requires phase gathering_next, found {}",
                self.state.phase()
            ));
        }
        let requirement = self
            .queue
            .pop_front()
            .ok_or_else(|| anyhow!("process_next called with an empty queue"))?;
        self.popped += 1;
        let story = self.state.record_pop(requirement)?;
        let Some(requirement) = self.state.current_requirement().map(str::to_owned) else {
            warn!(story, "no working requirement after pop");
            on_event(&ProcessorEvent::MissingRequirement { story });
            self.state.terminate();
            return Ok(self.state.phase());
        };
        on_event(&ProcessorEvent::StoryStarted {
            story,
            requirement: requirement.clone(),
        });
        self.stories.push(StoryRecord::new(story, &requirement));

        let requirement = if self.options.elaborate_requirements {
            let prompt = self.prompts.render_requirements(Some(requirement.as_str()))?;
            let user_story = run_chain(
                self.generator,
                &mut self.memory,
                GenerationStep::Requirements,
                story,
                &prompt,
            )?;
            self.state.replace_requirement(user_story.clone())?;
            on_event(&ProcessorEvent::RequirementsElaborated { story });
            user_story
        } else {
            requirement
        };

        let prompt = self.prompts.render_app_code(&requirement)?;
        let output = run_chain(
            self.generator,
            &mut self.memory,
            GenerationStep::AppCode,
            story,
            &prompt,
        )?;
        let generated_code = self.artifact_text(&output);
        let app_name = ArtifactKind::AppCode.artifact_name(story);
        self.writer.write(&app_name, &generated_code)?;
        self.state.record_code_saved()?;
        on_event(&ProcessorEvent::CodeSaved {
            story,
            name: app_name,
        });

        let prompt = self.prompts.render_test_code(&generated_code)?;
        let output = run_chain(
            self.generator,
            &mut self.memory,
            GenerationStep::TestCode,
            story,
            &prompt,
        )?;
        let test_code = self.artifact_text(&output);
        let test_name = ArtifactKind::TestCode.artifact_name(story);
        self.writer.write(&test_name, &test_code)?;
        let next = self.state.record_tests_saved(self.queue.is_empty())?;
        on_event(&ProcessorEvent::TestSaved {
            story,
            name: test_name,
        });
        debug!(story, next = %next, remaining = self.queue.len(), "story processed");

        if next.is_terminal() {
            self.end(on_event)?;
        }
        Ok(next)
    }

    /// Report completion. Further calls are no-ops.
    pub fn end<F: FnMut(&ProcessorEvent)>(&mut self, on_event: &mut F) -> Result<()> {
        if self.completion_reported {
            debug!("end called again, ignoring");
            return Ok(());
        }
        let errors = validate_counters(self.state.counters(), self.popped);
        if !errors.is_empty() {
            return Err(anyhow!("counter invariants violated: {}", errors.join("; ")));
        }
        self.state.terminate();
        self.completion_reported = true;
        let counters = self.state.counters();
        info!(
            story_count = counters.story_count,
            testing_rounds = counters.testing_rounds,
            "run complete"
        );
        on_event(&ProcessorEvent::Completed { counters });
        Ok(())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            counters: self.state.counters(),
            elaborated: self.options.elaborate_requirements,
            stories: self.stories.clone(),
        }
    }

    fn artifact_text(&self, output: &str) -> String {
        if self.options.extract_code_blocks {
            return code_or_text(output).to_string();
        }
        output.to_string()
    }

    fn ensure_not_terminated(&self, operation: &'static str) -> Result<()> {
        if self.state.phase().is_terminal() {
            return Err(AlreadyTerminatedError { operation }.into());
        }
        Ok(())
    }
}
