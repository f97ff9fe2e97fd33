//! Prompt templates by name, loaded from YAML with in-binary defaults.
//!
//! See [`PromptTemplates`], [`load`] and [`load_or_default`]. Template names used by the
//! orchestrator are the `*` constants below.

mod load;

use std::collections::BTreeMap;

pub use load::{default_from_embedded, load, load_or_default, LoadError};

use crate::error::EvalError;

/// Greeting shown when a user (re)starts a conversation.
pub const GREETING: &str = "greeting";
/// System prompt for drafting.
pub const DRAFT_SYSTEM: &str = "draft_system";
/// User prompt for drafting; `{task}` is replaced with the task description.
pub const DRAFT_USER: &str = "draft_user";
/// Rubric the drafted prompt is evaluated against.
pub const EVALUATION_RUBRIC: &str = "evaluation_rubric";
/// System prompt for refinement.
pub const REFINE_SYSTEM: &str = "refine_system";
/// User prompt for refinement; `{instruction}` and `{prompt}` are replaced.
pub const REFINE_USER: &str = "refine_user";
/// Lead-in for the list of weaknesses in a targeted refinement instruction.
pub const REFINE_TARGETED_HEADER: &str = "refine_targeted_header";
/// Refinement instruction used when no targeted one can be built.
pub const REFINE_GENERIC: &str = "refine_generic";

/// Named prompt templates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptTemplates {
    templates: BTreeMap<String, String>,
}

impl PromptTemplates {
    /// Templates from an explicit map (tests, embedding callers).
    pub fn from_map(templates: BTreeMap<String, String>) -> Self {
        Self { templates }
    }

    /// Returns the template text, or `None` when `name` is not configured.
    pub fn load_template(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    /// Borrowing variant of [`load_template`](Self::load_template).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Like [`get`](Self::get) but a missing template is a configuration error.
    pub fn require(&self, name: &str) -> Result<&str, EvalError> {
        self.get(name)
            .ok_or_else(|| EvalError::TemplateMissing(name.to_string()))
    }

    /// Sets or replaces one template.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(name.into(), text.into());
    }

    /// Removes one template; returns its previous text.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.templates.remove(name)
    }

    /// Overlays `other`: its templates replace ours with the same name.
    pub fn merge(&mut self, other: PromptTemplates) {
        self.templates.extend(other.templates);
    }

    /// Configured template names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

/// Replaces every `{key}` placeholder in `template` with its value in a single pass.
///
/// Inserted values are never scanned again, so a value containing `{prompt}` stays literal.
/// Unknown placeholders and stray braces are kept.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let known = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match known {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
