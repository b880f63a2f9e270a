//! XPath 1.0 core for rule predicates.
//!
//! Supported: location paths (absolute, relative, `//`), every axis except
//! `namespace` with the usual abbreviations, name tests (`*`, `prefix:*`,
//! `prefix:local`) and node-type tests (`text()`, `node()`, `comment()`,
//! `processing-instruction()`), predicates, unions, `or`/`and`, comparisons,
//! `+`, `-`, `*`, `div` and `mod`, and the core function library: node-set
//! (`last`, `position`, `count`, `id`, `local-name`, `namespace-uri`, `name`),
//! string (`string`, `concat`, `starts-with`, `contains`, `substring-before`,
//! `substring-after`, `substring`, `string-length`, `normalize-space`,
//! `translate`), boolean (`boolean`, `not`, `true`, `false`, `lang`) and
//! number (`number`, `sum`, `floor`, `ceiling`, `round`). Variables are not
//! supported; `id()` matches `xml:id` attributes.
//!
//! Name-test prefixes are resolved against the evaluator's namespace map, not
//! against the document's own declarations; `xml` is always bound.
//!
//! ```
//! use tutor_xml::{XPathEvaluator, parse_document};
//!
//! let doc = parse_document(r#"<mei xmlns="urn:mei"><note pname="c"/><note pname="d"/></mei>"#).unwrap();
//! let xpath = XPathEvaluator::new().with_namespace("mei", "urn:mei");
//! assert!(xpath.evaluate(&doc, "count(//mei:note) = 2").unwrap());
//! assert!(!xpath.evaluate(&doc, "//mei:note[@pname = 'e']").unwrap());
//! ```

mod ast;
mod eval;
mod lexer;
mod parser;

use std::collections::BTreeMap;

use crate::document::XmlDocument;
use crate::error::XPathError;

pub use eval::{NodeRef, Value};

/// A parsed expression with its prefixes resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    source: String,
    expr: ast::Expr,
}

impl CompiledExpr {
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Evaluates XPath expressions against an [`XmlDocument`].
#[derive(Debug, Clone, Default)]
pub struct XPathEvaluator {
    namespaces: BTreeMap<String, String>,
}

impl XPathEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespaces(namespaces: BTreeMap<String, String>) -> Self {
        Self { namespaces }
    }

    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// Parse an expression without evaluating it.
    pub fn compile(&self, source: &str) -> Result<CompiledExpr, XPathError> {
        let tokens = lexer::tokenize(source)?;
        let expr = parser::parse(&tokens, &self.namespaces)?;
        Ok(CompiledExpr {
            source: source.to_string(),
            expr,
        })
    }

    /// Evaluate `source` with the document node as context.
    pub fn evaluate_value(&self, document: &XmlDocument, source: &str) -> Result<Value, XPathError> {
        let compiled = self.compile(source)?;
        self.evaluate_compiled(document, &compiled)
    }

    pub fn evaluate_compiled(
        &self,
        document: &XmlDocument,
        compiled: &CompiledExpr,
    ) -> Result<Value, XPathError> {
        eval::evaluate(document, &compiled.expr)
    }

    /// Evaluate `source` and convert the result with `boolean()` semantics.
    pub fn evaluate(&self, document: &XmlDocument, source: &str) -> Result<bool, XPathError> {
        Ok(self.evaluate_value(document, source)?.to_boolean())
    }
}
