//! Well-formedness parsing into an [`XmlDocument`].

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use crate::document::{
    Attribute, Element, Node, NodeId, NodeKind, QualifiedName, XML_NAMESPACE, XmlDocument,
};
use crate::error::XmlParseError;

type Result<T> = std::result::Result<T, XmlParseError>;

/// Strict well-formedness parser; the default document parser for rule checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl XmlParser {
    pub fn parse(&self, text: &str) -> Result<XmlDocument> {
        parse_document(text)
    }
}

/// Parse `text` into an element tree, rejecting anything that is not well-formed.
pub fn parse_document(text: &str) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_comments = true;
    let mut builder = TreeBuilder::new();

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|error| XmlParseError::Syntax {
                position: reader.error_position(),
                message: error.to_string(),
            })?;
        match event {
            Event::Start(start) => builder.open(&start, position)?,
            Event::Empty(start) => {
                builder.open(&start, position)?;
                builder.close_current();
            }
            Event::End(end) => builder.close(utf8(end.name().as_ref())?, position)?,
            Event::Text(content) => {
                let raw = utf8(&content)?;
                if raw.contains("]]>") {
                    return Err(XmlParseError::UnexpectedMarkup {
                        found: "]]>",
                        context: "in character data",
                        position,
                    });
                }
                check_chars(raw)?;
                builder.text(&normalize_line_ends(raw), position)?;
            }
            Event::CData(content) => {
                let raw = utf8(&content)?;
                check_chars(raw)?;
                builder.text(&normalize_line_ends(raw), position)?;
            }
            Event::GeneralRef(reference) => {
                let resolved = resolve_entity(utf8(&reference)?)?;
                builder.text(&resolved, position)?;
            }
            Event::Comment(content) => {
                let raw = utf8(&content)?;
                check_chars(raw)?;
                builder.comment(&normalize_line_ends(raw));
            }
            Event::PI(instruction) => {
                let target = utf8(instruction.target())?;
                if target.eq_ignore_ascii_case("xml") {
                    return Err(XmlParseError::MisplacedDeclaration { position });
                }
                check_name(target, position)?;
                let data = utf8(instruction.content())?;
                check_chars(data)?;
                builder.instruction(target, &normalize_line_ends(data.trim_start()));
            }
            Event::Decl(_) => {
                let before = text.get(..position as usize).unwrap_or_default();
                if !before.trim_start_matches('\u{feff}').is_empty() {
                    return Err(XmlParseError::MisplacedDeclaration { position });
                }
            }
            Event::DocType(_) => {
                if builder.root_element.is_some() {
                    return Err(XmlParseError::MisplacedDoctype { position });
                }
            }
            Event::Eof => break,
        }
    }

    let document = builder.finish()?;
    trace!(nodes = document.len(), "parsed document");
    Ok(document)
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| XmlParseError::InvalidUtf8)
}

/// `Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn check_chars(raw: &str) -> Result<()> {
    match raw.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(XmlParseError::IllegalCharacter { code: c as u32 }),
        None => Ok(()),
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c, '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

/// Names must be `NCName` or `NCName:NCName`.
fn check_name(name: &str, position: u64) -> Result<()> {
    let valid = match name.split_once(':') {
        Some((prefix, local)) => is_ncname(prefix) && is_ncname(local),
        None => is_ncname(name),
    };
    if valid {
        Ok(())
    } else {
        Err(XmlParseError::InvalidName {
            name: name.to_string(),
            position,
        })
    }
}

/// Line-end handling: `\r\n` and lone `\r` both become `\n`.
fn normalize_line_ends(raw: &str) -> String {
    if raw.contains('\r') {
        raw.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        raw.to_string()
    }
}

/// Resolve references in a raw attribute value and normalize literal whitespace to spaces.
fn unescape_value(raw: &str, position: u64) -> Result<String> {
    let raw = normalize_line_ends(raw);
    let mut value = String::with_capacity(raw.len());
    let mut rest = raw.as_str();
    while let Some(index) = rest.find(['&', '<']) {
        push_normalized(&mut value, &rest[..index])?;
        if rest[index..].starts_with('<') {
            return Err(XmlParseError::UnexpectedMarkup {
                found: "<",
                context: "in an attribute value",
                position,
            });
        }
        let after = &rest[index + 1..];
        let end = after.find(';').ok_or_else(|| XmlParseError::Syntax {
            position,
            message: "unterminated reference in attribute value".to_string(),
        })?;
        value.push_str(&resolve_entity(&after[..end])?);
        rest = &after[end + 1..];
    }
    push_normalized(&mut value, rest)?;
    Ok(value)
}

fn push_normalized(value: &mut String, literal: &str) -> Result<()> {
    check_chars(literal)?;
    value.extend(
        literal
            .chars()
            .map(|c| if matches!(c, '\t' | '\n') { ' ' } else { c }),
    );
    Ok(())
}

fn resolve_entity(name: &str) -> Result<String> {
    let resolved = match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => match name.strip_prefix('#') {
            Some(code) => {
                let c = parse_char_ref(code).ok_or_else(|| XmlParseError::UndefinedEntity {
                    name: name.to_string(),
                })?;
                if !is_xml_char(c) {
                    return Err(XmlParseError::IllegalCharacter { code: c as u32 });
                }
                Some(c)
            }
            None => None,
        },
    };
    resolved
        .map(String::from)
        .ok_or_else(|| XmlParseError::UndefinedEntity {
            name: name.to_string(),
        })
}

fn parse_char_ref(code: &str) -> Option<char> {
    let value = match code.strip_prefix('x') {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u32::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) => code.parse().ok()?,
        None => return None,
    };
    char::from_u32(value)
}

/// Namespace declarations of one element: `(prefix, uri)`, `None` for the default namespace.
type Scope = Vec<(Option<String>, String)>;

struct TreeBuilder {
    nodes: Vec<Node>,
    /// Open elements with the names they were opened with.
    stack: Vec<(NodeId, String)>,
    scopes: Vec<Scope>,
    root_element: Option<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            stack: Vec::new(),
            scopes: Vec::new(),
            root_element: None,
        }
    }

    fn current(&self) -> NodeId {
        self.stack
            .last()
            .map_or(XmlDocument::ROOT, |(id, _)| *id)
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn open(&mut self, start: &BytesStart<'_>, position: u64) -> Result<()> {
        let raw_name = utf8(start.name().as_ref())?.to_string();
        check_name(&raw_name, position)?;
        if self.stack.is_empty() && self.root_element.is_some() {
            return Err(XmlParseError::MultipleRoots { name: raw_name });
        }

        let mut declarations = Scope::new();
        let mut raw_attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|error| XmlParseError::Syntax {
                position,
                message: error.to_string(),
            })?;
            let key = utf8(attribute.key.as_ref())?.to_string();
            check_name(&key, position)?;
            let value = unescape_value(utf8(&attribute.value)?, position)?;
            if key == "xmlns" {
                declarations.push((None, value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declarations.push((Some(prefix.to_string()), value));
            } else {
                raw_attributes.push((key, value));
            }
        }
        self.scopes.push(declarations);

        let name = self.resolve(&raw_name, true)?;
        let attributes = raw_attributes
            .into_iter()
            .map(|(key, value)| {
                Ok(Attribute {
                    name: self.resolve(&key, false)?,
                    value,
                })
            })
            .collect::<Result<Vec<Attribute>>>()?;
        for (index, attribute) in attributes.iter().enumerate() {
            let repeated = attributes[..index].iter().any(|earlier| {
                earlier.name.local == attribute.name.local
                    && earlier.name.namespace == attribute.name.namespace
            });
            if repeated {
                return Err(XmlParseError::DuplicateAttribute {
                    name: attribute.name.qualified(),
                });
            }
        }

        let parent = self.current();
        let id = self.push_node(parent, NodeKind::Element(Element { name, attributes }));
        if self.stack.is_empty() {
            self.root_element = Some(id);
        }
        self.stack.push((id, raw_name));
        Ok(())
    }

    fn close(&mut self, name: &str, position: u64) -> Result<()> {
        match self.stack.last() {
            None => Err(XmlParseError::UnexpectedClose {
                name: name.to_string(),
                position,
            }),
            Some((_, open)) if open != name => Err(XmlParseError::MismatchedTag {
                expected: open.clone(),
                found: name.to_string(),
                position,
            }),
            Some(_) => {
                self.close_current();
                Ok(())
            }
        }
    }

    fn close_current(&mut self) {
        self.stack.pop();
        self.scopes.pop();
    }

    fn text(&mut self, content: &str, position: u64) -> Result<()> {
        if self.stack.is_empty() {
            if content.trim().is_empty() {
                return Ok(());
            }
            return Err(XmlParseError::TextOutsideRoot { position });
        }
        let parent = self.current();
        // Entity references arrive as separate events; keep one text node per run.
        if let Some(&last) = self.nodes[parent].children.last()
            && let NodeKind::Text(existing) = &mut self.nodes[last].kind
        {
            existing.push_str(content);
            return Ok(());
        }
        self.push_node(parent, NodeKind::Text(content.to_string()));
        Ok(())
    }

    fn comment(&mut self, content: &str) {
        let parent = self.current();
        self.push_node(parent, NodeKind::Comment(content.to_string()));
    }

    fn instruction(&mut self, target: &str, data: &str) {
        let parent = self.current();
        self.push_node(
            parent,
            NodeKind::ProcessingInstruction {
                target: target.to_string(),
                data: data.to_string(),
            },
        );
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(declared, _)| declared.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn resolve(&self, raw: &str, is_element: bool) -> Result<QualifiedName> {
        let (prefix, local) = match raw.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, raw),
        };
        let namespace = match prefix {
            Some("xml") => Some(XML_NAMESPACE.to_string()),
            Some(prefix) => Some(
                self.lookup(Some(prefix))
                    .filter(|uri| !uri.is_empty())
                    .ok_or_else(|| XmlParseError::UnboundPrefix {
                        prefix: prefix.to_string(),
                    })?
                    .to_string(),
            ),
            None if is_element => self
                .lookup(None)
                .filter(|uri| !uri.is_empty())
                .map(str::to_string),
            None => None,
        };
        Ok(QualifiedName {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
            namespace,
        })
    }

    fn finish(self) -> Result<XmlDocument> {
        if let Some((_, name)) = self.stack.last() {
            return Err(XmlParseError::Unclosed { name: name.clone() });
        }
        let root_element = self.root_element.ok_or(XmlParseError::NoRootElement)?;
        Ok(XmlDocument::from_nodes(self.nodes, root_element))
    }
}
