//! Error types for XML parsing, XPath evaluation and rendering.

use thiserror::Error;

/// The candidate text is not a well-formed XML document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlParseError {
    /// Tokenizer-level syntax error.
    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// A closing tag does not match the open element.
    #[error("closing tag </{found}> does not match <{expected}> at byte {position}")]
    MismatchedTag {
        expected: String,
        found: String,
        position: u64,
    },

    /// A closing tag with no open element.
    #[error("unexpected closing tag </{name}> at byte {position}")]
    UnexpectedClose { name: String, position: u64 },

    /// Elements left open at the end of input.
    #[error("element <{name}> is never closed")]
    Unclosed { name: String },

    /// A second root element.
    #[error("document has more than one root element (second is <{name}>)")]
    MultipleRoots { name: String },

    /// Character data outside the root element.
    #[error("text outside the root element at byte {position}")]
    TextOutsideRoot { position: u64 },

    /// No root element at all.
    #[error("document has no root element")]
    NoRootElement,

    /// An element or attribute uses an undeclared namespace prefix.
    #[error("namespace prefix '{prefix}' is not declared")]
    UnboundPrefix { prefix: String },

    /// An entity reference that is neither predefined nor a character reference.
    #[error("undefined entity &{name};")]
    UndefinedEntity { name: String },

    /// An element, attribute or processing-instruction name that is not a valid XML name.
    #[error("invalid name '{name}' at byte {position}")]
    InvalidName { name: String, position: u64 },

    /// A character outside the XML `Char` production, literal or referenced.
    #[error("character U+{code:04X} is not allowed in XML")]
    IllegalCharacter { code: u32 },

    /// A markup-significant character where only data may appear.
    #[error("'{found}' is not allowed {context} at byte {position}")]
    UnexpectedMarkup {
        found: &'static str,
        context: &'static str,
        position: u64,
    },

    /// An XML declaration (or `xml`-named processing instruction) after the document start.
    #[error("XML declaration must be at the very start of the document (found at byte {position})")]
    MisplacedDeclaration { position: u64 },

    /// A document type declaration inside or after the root element.
    #[error("document type declaration after the root element at byte {position}")]
    MisplacedDoctype { position: u64 },

    /// Two attributes of one element share an expanded name.
    #[error("attribute '{name}' appears more than once")]
    DuplicateAttribute { name: String },

    /// Bytes that are not valid UTF-8.
    #[error("invalid UTF-8 in document")]
    InvalidUtf8,
}

/// Errors from compiling or evaluating an XPath expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XPathError {
    /// The expression does not parse.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A name test uses a prefix with no configured namespace.
    #[error("unknown namespace prefix '{0}'")]
    UnknownPrefix(String),

    /// Unsupported or unknown function.
    #[error("unknown function '{0}()'")]
    UnknownFunction(String),

    /// Unsupported axis name.
    #[error("unknown axis '{0}'")]
    UnknownAxis(String),

    /// Wrong number of arguments.
    #[error("function '{name}()' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: &'static str,
        found: usize,
    },

    /// A node-set was required.
    #[error("'{0}' requires a node-set")]
    NotANodeSet(String),
}

/// The document could not be re-serialised for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderFailure {
    #[error("cannot read document: {0}")]
    Read(String),
    #[error("cannot write document: {0}")]
    Write(String),
}
