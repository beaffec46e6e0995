//! Loading the requirement list for a run.
//!
//! Requirements come either from the built-in list or from a JSON / TOML file.
//! Files are checked against `schemas/requirements.schema.json` before a queue
//! is built, so a string or mapping never reaches the processor.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use jsonschema::Draft;
use serde_json::Value;
use tracing::debug;

use crate::core::queue::RequirementQueue;
use crate::errors::InvalidInputError;

const REQUIREMENTS_SCHEMA: &str = include_str!("../../schemas/requirements.schema.json");

/// The requirement list used when no file is given.
pub const DEFAULT_REQUIREMENTS: [&str; 3] = [
    "Create a Flask web application with one endpoint `/hello` that returns 'Hello, World!'.",
    "Add an endpoint `/goodbye` that returns 'Goodbye, World!'.",
    "Implement error handling for undefined routes.",
];

pub fn default_requirements() -> RequirementQueue {
    RequirementQueue::new(DEFAULT_REQUIREMENTS)
}

/// Load requirements from `path`.
///
/// `.toml` files must hold a top-level `requirements` key; anything else is
/// parsed as a JSON document whose root is the list itself. Shape violations
/// surface as [`InvalidInputError`].
pub fn load_requirements(path: &Path) -> Result<RequirementQueue> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read requirements {}", path.display()))?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let value = if is_toml {
        parse_toml_requirements(&contents)?
    } else {
        serde_json::from_str::<Value>(&contents).map_err(|err| {
            InvalidInputError::new(format!("{} is not valid JSON: {err}", path.display()))
        })?
    };
    let queue = requirements_from_value(&value)?;
    debug!(path = %path.display(), items = queue.len(), "requirements loaded");
    Ok(queue)
}

/// Validate an untyped value against the requirements schema and build a queue.
pub fn requirements_from_value(value: &Value) -> Result<RequirementQueue> {
    validate_schema(value)?;
    Ok(RequirementQueue::from_value(value)?)
}

fn parse_toml_requirements(contents: &str) -> Result<Value> {
    let doc: toml::Table = toml::from_str(contents)
        .map_err(|err| InvalidInputError::new(format!("not valid TOML: {err}")))?;
    let Some(requirements) = doc.get("requirements") else {
        return Err(InvalidInputError::new("missing top-level `requirements` key").into());
    };
    let value = serde_json::to_value(requirements).context("convert toml requirements")?;
    Ok(value)
}

/// Validate JSON instance against the requirements schema (Draft 2020-12).
fn validate_schema(instance: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(REQUIREMENTS_SCHEMA).context("parse requirements schema")?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .context("compile requirements schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        return Err(InvalidInputError::new(format!(
            "requirements must be a list of strings:\n- {}",
            messages.join("\n- ")
        ))
        .into());
    }
    Ok(())
}
