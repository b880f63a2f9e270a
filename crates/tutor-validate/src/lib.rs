//! Validation of candidate documents against a step's ordered rules.
//!
//! [`ValidationEngine::validate`] parses the candidate with a
//! [`DocumentParser`] and evaluates each [`Rule`](tutor_model::Rule) in
//! declared order with a [`RuleEvaluator`]. The first failing rule decides the
//! [`Verdict`]: its hint is the only one surfaced and later rules never run.
//!
//! ```
//! use tutor_model::{Rule, TutorOptions};
//! use tutor_validate::{ValidationEngine, VerdictStatus};
//!
//! let engine = ValidationEngine::from_options(&TutorOptions::default());
//! let rules = [Rule::new("count(//mei:note) = 1").with_hint("Add one note.")];
//!
//! let verdict = engine.validate(r#"<mei xmlns="http://www.music-encoding.org/ns/mei"/>"#, &rules);
//! assert_eq!(verdict.status, VerdictStatus::Invalid);
//! assert_eq!(verdict.hint.as_deref(), Some("Add one note."));
//! ```

mod engine;
mod error;
mod seams;
mod verdict;

pub use engine::ValidationEngine;
pub use error::{ParseError, RuleEvaluationError};
pub use seams::{DocumentParser, RuleEvaluator};
pub use verdict::{Verdict, VerdictStatus};
