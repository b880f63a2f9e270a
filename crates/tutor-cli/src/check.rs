//! Authoring checks run without an interactive session.

use tracing::warn;
use tutor_core::{ContentFetcher, fetch_with_timeout};
use tutor_model::{TutorOptions, TutorialDefinition};
use tutor_regions::extract_regions;
use tutor_xml::XPathEvaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

/// Outcome of checking one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCheck {
    pub index: usize,
    pub label: String,
    pub rules: usize,
    /// Byte length of the editable snippet, when the regions could be cut.
    pub snippet_bytes: Option<usize>,
    pub issues: Vec<Issue>,
}

impl StepCheck {
    fn push(&mut self, severity: Severity, message: String) {
        warn!(step = self.index, ?severity, %message, "authoring issue");
        self.issues.push(Issue { severity, message });
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckReport {
    pub steps: Vec<StepCheck>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.steps.iter().any(|step| step.error_count() > 0)
    }

    pub fn error_count(&self) -> usize {
        self.steps.iter().map(StepCheck::error_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.steps.iter().map(StepCheck::warning_count).sum()
    }
}

/// Fetch every step's assets, cut its regions and compile its rules.
///
/// Missing content or prefill assets, marker layout errors and rules that do
/// not compile are errors; a missing description is a warning. Every fetch
/// is bounded by the configured timeout.
pub async fn check_tutorial<F: ContentFetcher>(
    definition: &TutorialDefinition,
    options: &TutorOptions,
    fetcher: &F,
) -> CheckReport {
    let evaluator = XPathEvaluator::with_namespaces(options.namespaces.clone());
    let timeout = options.fetch_timeout();
    let mut report = CheckReport::default();

    for (index, step) in definition.steps.iter().enumerate() {
        let mut check = StepCheck {
            index,
            label: step.display_label(index),
            rules: step.rules.len(),
            snippet_bytes: None,
            issues: Vec::new(),
        };

        match fetch_with_timeout(fetcher, &step.content_ref, timeout).await {
            Ok(content) => match extract_regions(&content, options) {
                Ok(regions) => check.snippet_bytes = Some(regions.core.len()),
                Err(error) => check.push(Severity::Error, error.to_string()),
            },
            Err(error) => check.push(Severity::Error, error.to_string()),
        }
        if let Some(prefill) = &step.prefill_ref
            && let Err(error) = fetch_with_timeout(fetcher, prefill, timeout).await
        {
            check.push(Severity::Error, error.to_string());
        }
        if let Some(description) = &step.description_ref
            && let Err(error) = fetch_with_timeout(fetcher, description, timeout).await
        {
            check.push(Severity::Warning, error.to_string());
        }
        for (rule_index, rule) in step.rules.iter().enumerate() {
            if let Err(error) = evaluator.compile(&rule.predicate) {
                check.push(Severity::Error, format!("rule {}: {error}", rule_index + 1));
            }
        }

        report.steps.push(check);
    }

    report
}
