//! Validated FIFO queue of requirement descriptions.

use std::collections::VecDeque;

use serde_json::Value;

use crate::errors::InvalidInputError;

/// Ordered requirement descriptions, consumed from the front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementQueue {
    items: VecDeque<String>,
}

impl RequirementQueue {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a queue from an untyped value.
    ///
    /// Only an array of strings is accepted. Strings, mappings, numbers and
    /// arrays holding non-string entries are rejected before anything is built.
    pub fn from_value(value: &Value) -> Result<Self, InvalidInputError> {
        let Value::Array(entries) = value else {
            return Err(InvalidInputError::new(format!(
                "requirements must be a list, got {}",
                value_kind(value)
            )));
        };
        let mut items = VecDeque::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            match entry {
                Value::String(text) => items.push_back(text.clone()),
                other => {
                    return Err(InvalidInputError::new(format!(
                        "requirements[{idx}] must be a string, got {}",
                        value_kind(other)
                    )));
                }
            }
        }
        Ok(Self { items })
    }

    pub fn pop_front(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
