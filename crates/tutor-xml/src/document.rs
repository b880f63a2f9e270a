//! Arena-backed element tree.

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Index of a node in its document. Ids follow document order.
pub type NodeId = usize;

/// Element or attribute name with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl QualifiedName {
    /// Name as written in the source, `prefix:local` or `local`.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualifiedName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QualifiedName,
    /// Attributes in source order; namespace declarations are not included.
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// Value of the first attribute with this local name and no namespace.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.namespace.is_none() && attr.name.local == local)
            .map(|attr| attr.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

/// A parsed, well-formed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    nodes: Vec<Node>,
    root_element: NodeId,
}

impl XmlDocument {
    /// Id of the document node.
    pub const ROOT: NodeId = 0;

    pub(crate) fn from_nodes(nodes: Vec<Node>, root_element: NodeId) -> Self {
        Self {
            nodes,
            root_element,
        }
    }

    /// The single top-level element.
    pub fn root_element(&self) -> NodeId {
        self.root_element
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Elements anywhere in the document with the given namespace and local name.
    pub fn elements_named(&self, namespace: Option<&str>, local: &str) -> Vec<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .filter(|&id| {
                self.element(id).is_some_and(|element| {
                    element.name.local == local && element.name.namespace.as_deref() == namespace
                })
            })
            .collect()
    }

    /// XPath string-value: concatenated descendant text for elements and the document.
    pub fn string_value(&self, id: NodeId) -> String {
        match &self.nodes[id].kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.clone(),
            NodeKind::ProcessingInstruction { data, .. } => data.clone(),
            NodeKind::Document | NodeKind::Element(_) => self
                .descendants(id)
                .into_iter()
                .filter_map(|child| match &self.nodes[child].kind {
                    NodeKind::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeKind, XmlDocument};
    use crate::parse_document;

    #[test]
    fn descendants_follow_document_order() {
        let doc = parse_document("<a><b><c/></b><d>text</d></a>").unwrap();
        let names: Vec<String> = doc
            .descendants(doc.root_element())
            .into_iter()
            .filter_map(|id| doc.element(id).map(|e| e.name.local.clone()))
            .collect();
        assert_eq!(names, vec!["b", "c", "d"]);
        assert_eq!(doc.string_value(doc.root_element()), "text");
    }

    #[test]
    fn comments_and_instructions_are_nodes_without_text() {
        let doc = parse_document("<!-- head --><a>x<!-- note -->y<?render fast?></a>").unwrap();
        assert_eq!(doc.children(XmlDocument::ROOT).len(), 2);
        let children = doc.children(doc.root_element());
        assert_eq!(children.len(), 4);
        assert_eq!(doc.kind(children[1]), &NodeKind::Comment(" note ".to_string()));
        assert_eq!(
            doc.kind(children[3]),
            &NodeKind::ProcessingInstruction {
                target: "render".to_string(),
                data: "fast".to_string()
            }
        );
        assert_eq!(doc.string_value(doc.root_element()), "xy");
    }

    #[test]
    fn attribute_lookup_ignores_namespaced_attributes() {
        let doc = parse_document(r#"<a xmlns:x="urn:x" x:n="1" n="2"/>"#).unwrap();
        let root = doc.element(doc.root_element()).unwrap();
        assert_eq!(root.attribute("n"), Some("2"));
        assert_eq!(root.attributes.len(), 2);
    }
}
