//! Prompt templates for the three generation chains.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::types::GenerationStep;

const REQUIREMENTS_TEMPLATE: &str = include_str!("prompts/requirements.md");
const APP_CODE_TEMPLATE: &str = include_str!("prompts/app_code.md");
const TEST_CODE_TEMPLATE: &str = include_str!("prompts/test_code.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(GenerationStep::Requirements.as_str(), REQUIREMENTS_TEMPLATE)
            .context("requirements template")?;
        env.add_template(GenerationStep::AppCode.as_str(), APP_CODE_TEMPLATE)
            .context("app_code template")?;
        env.add_template(GenerationStep::TestCode.as_str(), TEST_CODE_TEMPLATE)
            .context("test_code template")?;
        Ok(Self { env })
    }

    /// Project-manager prompt. `requirement` is optional context for the story.
    pub fn render_requirements(&self, requirement: Option<&str>) -> Result<String> {
        let template = self.env.get_template(GenerationStep::Requirements.as_str())?;
        let rendered = template.render(context! {
            requirement => requirement.map(str::trim).filter(|s| !s.is_empty()),
        })?;
        Ok(rendered)
    }

    pub fn render_app_code(&self, requirements: &str) -> Result<String> {
        let template = self.env.get_template(GenerationStep::AppCode.as_str())?;
        let rendered = template.render(context! {
            requirements => requirements.trim(),
        })?;
        Ok(rendered)
    }

    pub fn render_test_code(&self, generated_code: &str) -> Result<String> {
        let template = self.env.get_template(GenerationStep::TestCode.as_str())?;
        let rendered = template.render(context! {
            generated_code => generated_code.trim(),
        })?;
        Ok(rendered)
    }
}
