//! Team configuration stored in `devteam.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "devteam.toml";

/// Devteam configuration (TOML).
///
/// Missing fields default to the behavior of the original three-step team:
/// no requirement elaboration, raw generation output, `.py` artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TeamConfig {
    /// Directory that receives `app_code_N` / `test_code_N` artifacts.
    pub output_dir: PathBuf,

    /// Extension appended to every artifact name (without the dot).
    pub extension: String,

    /// Run the project-manager elaboration chain for every requirement and feed
    /// its output to code generation instead of the raw requirement.
    pub elaborate_requirements: bool,

    /// Persist only the first fenced code block of each generation output.
    pub extract_code_blocks: bool,

    /// Write `devteam_run.json` into `output_dir` after a completed run.
    pub run_summary: bool,

    pub model: ModelConfig,
}

/// Settings for the OpenAI-compatible chat backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub max_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
            max_tokens: None,
        }
    }
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            extension: "py".to_string(),
            elaborate_requirements: false,
            extract_code_blocks: false,
            run_summary: true,
            model: ModelConfig::default(),
        }
    }
}

impl TeamConfig {
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("output_dir must not be empty"));
        }
        if self.extension.contains(['/', '\\', '.']) {
            return Err(anyhow!(
                "extension must be a bare suffix like \"py\", got {:?}",
                self.extension
            ));
        }
        if self.model.endpoint.trim().is_empty() {
            return Err(anyhow!("model.endpoint must not be empty"));
        }
        if self.model.model.trim().is_empty() {
            return Err(anyhow!("model.model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(anyhow!("model.temperature must be within 0.0..=2.0"));
        }
        if self.model.api_key_env.trim().is_empty() {
            return Err(anyhow!("model.api_key_env must not be empty"));
        }
        if self.model.timeout_secs == 0 {
            return Err(anyhow!("model.timeout_secs must be > 0"));
        }
        if self.model.max_tokens == Some(0) {
            return Err(anyhow!("model.max_tokens must be > 0 when set"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `TeamConfig::default()`.
pub fn load_config(path: &Path) -> Result<TeamConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = TeamConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TeamConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &TeamConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
