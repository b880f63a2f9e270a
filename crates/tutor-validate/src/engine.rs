//! First-failure-wins rule evaluation.

use tracing::{debug, trace, warn};
use tutor_model::{Rule, TutorOptions};
use tutor_xml::{XPathEvaluator, XmlParser};

use crate::seams::{DocumentParser, RuleEvaluator};
use crate::verdict::Verdict;

/// Parses a candidate and runs a step's rules against it.
pub struct ValidationEngine {
    parser: Box<dyn DocumentParser>,
    evaluator: Box<dyn RuleEvaluator>,
}

impl ValidationEngine {
    pub fn new(
        parser: impl DocumentParser + 'static,
        evaluator: impl RuleEvaluator + 'static,
    ) -> Self {
        Self {
            parser: Box::new(parser),
            evaluator: Box::new(evaluator),
        }
    }

    pub fn from_boxed(parser: Box<dyn DocumentParser>, evaluator: Box<dyn RuleEvaluator>) -> Self {
        Self { parser, evaluator }
    }

    /// XML parser plus an XPath evaluator over the configured namespaces.
    pub fn from_options(options: &TutorOptions) -> Self {
        Self::new(
            XmlParser,
            XPathEvaluator::with_namespaces(options.namespaces.clone()),
        )
    }

    /// Classify `candidate` against `rules`, stopping at the first failure.
    ///
    /// A rule that cannot be evaluated counts as failed but carries no hint
    /// and leaves rendering enabled.
    pub fn validate(&self, candidate: &str, rules: &[Rule]) -> Verdict {
        trace!(candidate, "validating candidate");
        let document = match self.parser.parse(candidate) {
            Ok(document) => document,
            Err(error) => {
                debug!(%error, "candidate is malformed");
                return Verdict::malformed();
            }
        };

        for (index, rule) in rules.iter().enumerate() {
            match self.evaluator.evaluate(&document, &rule.predicate) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(rule = index, predicate = %rule.predicate, "rule failed");
                    return Verdict::invalid(
                        index,
                        rule.render_anyway,
                        rule.visible_hint().map(str::to_string),
                    );
                }
                Err(error) => {
                    warn!(rule = index, %error, "rule could not be evaluated");
                    return Verdict::invalid(index, true, None);
                }
            }
        }

        debug!(rules = rules.len(), "all rules passed");
        Verdict::valid()
    }
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine").finish_non_exhaustive()
    }
}
