//! Tutorial definition format.
//!
//! The on-disk format is JSON:
//!
//! ```json
//! {
//!   "steps": [
//!     {
//!       "label": "Add a note",
//!       "descFile": "steps/01/desc.html",
//!       "xmlFile": "steps/01/content.xml",
//!       "prefillFile": "steps/01/prefill.xml",
//!       "editorLines": 4,
//!       "xpaths": [
//!         { "rule": "count(//mei:note) = 1", "hint": "Add exactly one note.", "renderanyway": true }
//!       ]
//!     }
//!   ],
//!   "outro": "<p>Well done.</p>"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A structural rule checked against the parsed validation document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Opaque structural query; only its boolean outcome matters.
    #[serde(rename = "rule")]
    pub predicate: String,

    /// Hint shown when this rule is the first one to fail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    /// Whether the document is still rendered when this rule fails.
    #[serde(rename = "renderanyway", default = "default_render_anyway")]
    pub render_anyway: bool,
}

fn default_render_anyway() -> bool {
    true
}

impl Rule {
    pub fn new(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            hint: None,
            render_anyway: true,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_render_anyway(mut self, render_anyway: bool) -> Self {
        self.render_anyway = render_anyway;
        self
    }

    /// The hint to surface, if any. Empty hints count as absent.
    pub fn visible_hint(&self) -> Option<&str> {
        self.hint.as_deref().filter(|hint| !hint.is_empty())
    }
}

/// One unit of tutorial progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub label: String,

    /// Instruction asset shown alongside the editor.
    #[serde(rename = "descFile", default, skip_serializing_if = "Option::is_none")]
    pub description_ref: Option<String>,

    /// Content asset carrying the snippet and preview markers.
    #[serde(rename = "xmlFile")]
    pub content_ref: String,

    /// Fragment placed in the editor when the step loads.
    #[serde(rename = "prefillFile", default, skip_serializing_if = "Option::is_none")]
    pub prefill_ref: Option<String>,

    /// Number of editor lines to size the editor for.
    #[serde(rename = "editorLines", default, skip_serializing_if = "Option::is_none")]
    pub editor_line_hint: Option<u16>,

    /// Rules evaluated in declared order.
    #[serde(rename = "xpaths", default)]
    pub rules: Vec<Rule>,
}

impl Step {
    pub fn new(content_ref: impl Into<String>) -> Self {
        Self {
            label: String::new(),
            description_ref: None,
            content_ref: content_ref.into(),
            prefill_ref: None,
            editor_line_hint: None,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_prefill(mut self, prefill_ref: impl Into<String>) -> Self {
        self.prefill_ref = Some(prefill_ref.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description_ref: impl Into<String>) -> Self {
        self.description_ref = Some(description_ref.into());
        self
    }

    #[must_use]
    pub fn with_editor_lines(mut self, lines: u16) -> Self {
        self.editor_line_hint = Some(lines);
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Label shown for the step at `index` (0-based); falls back to `Step N`.
    pub fn display_label(&self, index: usize) -> String {
        if self.label.is_empty() {
            format!("Step {}", index + 1)
        } else {
            self.label.clone()
        }
    }

    /// Empty asset references are treated as absent.
    fn normalize(&mut self) {
        if self.prefill_ref.as_deref().is_some_and(str::is_empty) {
            self.prefill_ref = None;
        }
        if self.description_ref.as_deref().is_some_and(str::is_empty) {
            self.description_ref = None;
        }
    }
}

/// A complete tutorial: ordered steps plus the text shown after the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialDefinition {
    pub steps: Vec<Step>,
    #[serde(default)]
    pub outro: String,
}

impl TutorialDefinition {
    pub fn new(steps: Vec<Step>, outro: impl Into<String>) -> Self {
        Self {
            steps,
            outro: outro.into(),
        }
    }

    /// Parse and check a definition from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut definition: TutorialDefinition = serde_json::from_str(json)?;
        for step in &mut definition.steps {
            step.normalize();
        }
        definition.check()?;
        Ok(definition)
    }

    /// Structural checks that do not need any asset.
    pub fn check(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(ModelError::NoSteps);
        }
        for (step_index, step) in self.steps.iter().enumerate() {
            if step.content_ref.trim().is_empty() {
                return Err(ModelError::MissingContent { step: step_index });
            }
            if let Some(rule_index) = step
                .rules
                .iter()
                .position(|rule| rule.predicate.trim().is_empty())
            {
                return Err(ModelError::EmptyPredicate {
                    step: step_index,
                    rule: rule_index,
                });
            }
        }
        Ok(())
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Labels for every step, in order.
    pub fn labels(&self) -> Vec<String> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| step.display_label(index))
            .collect()
    }
}

/// Load a tutorial definition from a JSON file.
pub fn load_tutorial(path: &Path) -> Result<TutorialDefinition> {
    let json = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    TutorialDefinition::from_json_str(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_falls_back_to_step_number() {
        let step = Step::new("a.xml");
        assert_eq!(step.display_label(0), "Step 1");
        assert_eq!(step.display_label(4), "Step 5");
        let step = step.with_label("Clefs");
        assert_eq!(step.display_label(4), "Clefs");
    }

    #[test]
    fn visible_hint_ignores_empty() {
        assert_eq!(Rule::new("true()").with_hint("").visible_hint(), None);
        assert_eq!(
            Rule::new("true()").with_hint("fix it").visible_hint(),
            Some("fix it")
        );
    }
}
