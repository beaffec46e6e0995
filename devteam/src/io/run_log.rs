//! Run summary written after a completed run (`devteam_run.json`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::types::{ArtifactKind, Counters};

pub const RUN_SUMMARY_FILE: &str = "devteam_run.json";

/// One processed requirement and the artifacts it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub story: u32,
    pub requirement: String,
    pub app_code: String,
    pub test_code: String,
}

impl StoryRecord {
    pub fn new(story: u32, requirement: &str) -> Self {
        Self {
            story,
            requirement: requirement.to_string(),
            app_code: ArtifactKind::AppCode.artifact_name(story),
            test_code: ArtifactKind::TestCode.artifact_name(story),
        }
    }
}

/// Summary of a run that reached the terminal phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub counters: Counters,
    pub elaborated: bool,
    pub stories: Vec<StoryRecord>,
}

pub fn summary_path(output_dir: &Path) -> PathBuf {
    output_dir.join(RUN_SUMMARY_FILE)
}

/// Write the summary as pretty JSON with a trailing newline.
pub fn write_run_summary(output_dir: &Path, summary: &RunSummary) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;
    let path = summary_path(output_dir);
    let mut buf = serde_json::to_string_pretty(summary).context("serialize run summary")?;
    buf.push('\n');
    fs::write(&path, buf).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub fn load_run_summary(path: &Path) -> Result<RunSummary> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read run summary {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}
