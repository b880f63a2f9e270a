//! XML support for tutorial documents.
//!
//! - [`parse_document`] checks well-formedness and builds an [`XmlDocument`]
//!   element tree with resolved namespaces.
//! - [`XPathEvaluator`] evaluates XPath 1.0 rule predicates against that tree.
//! - [`render_outline`] re-serialises a document with indentation.

mod document;
mod error;
mod parser;
mod render;
pub mod xpath;

pub use document::{Attribute, Element, NodeId, NodeKind, QualifiedName, XmlDocument, XML_NAMESPACE};
pub use error::{RenderFailure, XPathError, XmlParseError};
pub use parser::{XmlParser, parse_document};
pub use render::{OutlineRenderer, render_outline};
pub use xpath::{CompiledExpr, NodeRef, Value, XPathEvaluator};
