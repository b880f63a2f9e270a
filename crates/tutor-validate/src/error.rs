//! Error types for parsing candidates and evaluating rules.

use thiserror::Error;
use tutor_xml::{XPathError, XmlParseError};

/// The candidate text is not well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Xml(#[from] XmlParseError),

    /// Rejected by a parser other than the built-in XML parser.
    #[error("candidate rejected: {0}")]
    Rejected(String),
}

/// A rule predicate could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleEvaluationError {
    #[error("rule `{predicate}` cannot be evaluated: {source}")]
    XPath {
        predicate: String,
        #[source]
        source: XPathError,
    },

    /// Rejected by an evaluator other than the built-in XPath evaluator.
    #[error("rule `{predicate}` cannot be evaluated: {message}")]
    Unsupported { predicate: String, message: String },
}

impl RuleEvaluationError {
    pub fn predicate(&self) -> &str {
        match self {
            Self::XPath { predicate, .. } | Self::Unsupported { predicate, .. } => predicate,
        }
    }
}
