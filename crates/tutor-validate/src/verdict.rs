//! Outcome of one validation pass.

/// Overall classification of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    /// The candidate did not parse; no rule was evaluated.
    Malformed,
    /// A rule failed or could not be evaluated.
    Invalid,
    /// Every rule passed.
    Valid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    /// Cleared only when the failing rule opted out of rendering.
    pub render_anyway: bool,
    /// Hint of the failing rule, if it has one.
    pub hint: Option<String>,
    /// Index of the rule that decided an `Invalid` verdict.
    pub failed_rule: Option<usize>,
}

impl Verdict {
    pub fn malformed() -> Self {
        Self {
            status: VerdictStatus::Malformed,
            render_anyway: false,
            hint: None,
            failed_rule: None,
        }
    }

    pub fn valid() -> Self {
        Self {
            status: VerdictStatus::Valid,
            render_anyway: true,
            hint: None,
            failed_rule: None,
        }
    }

    pub fn invalid(rule: usize, render_anyway: bool, hint: Option<String>) -> Self {
        Self {
            status: VerdictStatus::Invalid,
            render_anyway,
            hint,
            failed_rule: Some(rule),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == VerdictStatus::Valid
    }

    pub fn is_malformed(&self) -> bool {
        self.status == VerdictStatus::Malformed
    }

    /// Whether the candidate should be handed to the renderer.
    pub fn should_render(&self) -> bool {
        match self.status {
            VerdictStatus::Malformed => false,
            VerdictStatus::Invalid => self.render_anyway,
            VerdictStatus::Valid => true,
        }
    }
}
