//! Generation collaborator abstraction.
//!
//! The [`Generator`] trait decouples the processor from the model backend
//! (currently an OpenAI-compatible chat-completions endpoint). Tests use
//! scripted generators that return predetermined outputs without network I/O.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::types::GenerationStep;
use crate::errors::GenerationFailure;
use crate::io::config::ModelConfig;
use crate::io::memory::{ConversationMemory, Speaker, Turn};

/// Parameters for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub step: GenerationStep,
    /// Story being processed (0 when outside the item loop).
    pub story: u32,
    /// Rendered prompt for this call.
    pub prompt: &'a str,
    /// Every exchange of the run so far, oldest first.
    pub history: &'a [Turn],
}

/// Abstraction over text-generation backends.
pub trait Generator {
    /// Produce text for the request. Errors are treated as fatal by callers.
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

/// Run one chain: send `prompt` with the shared history, then record the
/// exchange in `memory`.
///
/// Any backend error is wrapped in [`GenerationFailure`] and nothing is
/// recorded.
#[instrument(skip_all, fields(step = %step, story = story, history_turns = memory.len()))]
pub fn run_chain<G: Generator>(
    generator: &G,
    memory: &mut ConversationMemory,
    step: GenerationStep,
    story: u32,
    prompt: &str,
) -> Result<String> {
    let request = GenerationRequest {
        step,
        story,
        prompt,
        history: memory.turns(),
    };
    let output = generator
        .generate(&request)
        .map_err(|cause| GenerationFailure { step, story, cause })?;
    debug!(output_bytes = output.len(), "generation completed");
    memory.save_exchange(step, prompt, &output);
    Ok(output)
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Generator backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiGenerator {
    client: Client,
    config: ModelConfig,
    api_key: Option<String>,
}

impl OpenAiGenerator {
    /// Build the HTTP client and read the API key from `config.api_key_env`.
    ///
    /// A missing key is reported on the first call so runs that never reach a
    /// generation step do not need one.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build HTTP client")?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }
}

impl Generator for OpenAiGenerator {
    #[instrument(skip_all, fields(step = %request.step, story = request.story, model = %self.config.model))]
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("missing API key (set {})", self.config.api_key_env))?;

        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: build_messages(request),
            max_tokens: self.config.max_tokens,
        };
        info!(
            endpoint = %self.config.endpoint,
            messages = body.messages.len(),
            "sending chat completion"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .context("chat completion request")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            warn!(%status, "chat completion rejected");
            return Err(anyhow!(
                "chat completion failed with status {status}: {}",
                truncate(&text, 320)
            ));
        }

        let parsed: ChatResponse = response.json().context("parse chat completion")?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("chat completion returned no choices"))?;
        debug!(finish_reason = ?choice.finish_reason, "chat completion received");
        choice
            .message
            .content
            .ok_or_else(|| anyhow!("chat completion returned empty content"))
    }
}

/// Map the shared history plus the new prompt onto chat messages.
fn build_messages<'a>(request: &GenerationRequest<'a>) -> Vec<ChatMessage<'a>> {
    let mut messages: Vec<ChatMessage<'a>> = request
        .history
        .iter()
        .map(|turn| ChatMessage {
            role: match turn.speaker {
                Speaker::Human => "user",
                Speaker::Ai => "assistant",
            },
            content: turn.text.as_str(),
        })
        .collect();
    messages.push(ChatMessage {
        role: "user",
        content: request.prompt,
    });
    messages
}

fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
