//! Parser and evaluator seams with their XML/XPath implementations.

use tutor_xml::{XPathEvaluator, XmlDocument, XmlParser};

use crate::error::{ParseError, RuleEvaluationError};

/// Turns candidate text into a document tree.
pub trait DocumentParser {
    fn parse(&self, text: &str) -> Result<XmlDocument, ParseError>;
}

/// Evaluates one rule predicate against a parsed document.
pub trait RuleEvaluator {
    fn evaluate(&self, document: &XmlDocument, predicate: &str)
    -> Result<bool, RuleEvaluationError>;
}

impl DocumentParser for XmlParser {
    fn parse(&self, text: &str) -> Result<XmlDocument, ParseError> {
        Ok(XmlParser::parse(self, text)?)
    }
}

impl RuleEvaluator for XPathEvaluator {
    fn evaluate(
        &self,
        document: &XmlDocument,
        predicate: &str,
    ) -> Result<bool, RuleEvaluationError> {
        XPathEvaluator::evaluate(self, document, predicate).map_err(|source| {
            RuleEvaluationError::XPath {
                predicate: predicate.to_string(),
                source,
            }
        })
    }
}
