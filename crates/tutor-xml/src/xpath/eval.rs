//! Tree-walking evaluation of [`Expr`] against an [`XmlDocument`].

use super::ast::{ArithOp, Axis, CompareOp, Expr, Function, NodeTest, Step};
use crate::document::{NodeId, NodeKind, QualifiedName, XML_NAMESPACE, XmlDocument};
use crate::error::XPathError;

type Result<T> = std::result::Result<T, XPathError>;

/// A node in a node-set: a tree node, or the `index`th attribute of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Node(NodeId),
    Attribute(NodeId, usize),
}

impl NodeRef {
    /// Attributes sort after their element and before its children.
    fn order_key(self) -> (NodeId, usize) {
        match self {
            Self::Node(id) => (id, 0),
            Self::Attribute(id, index) => (id, index + 1),
        }
    }
}

/// Result of an XPath expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Node-set in document order.
    Nodes(Vec<NodeRef>),
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// XPath `boolean()` conversion.
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Nodes(nodes) => !nodes.is_empty(),
            Self::Boolean(value) => *value,
            Self::Number(number) => *number != 0.0 && !number.is_nan(),
            Self::Text(text) => !text.is_empty(),
        }
    }
}

pub fn evaluate(document: &XmlDocument, expr: &Expr) -> Result<Value> {
    let context = Context {
        node: NodeRef::Node(XmlDocument::ROOT),
        position: 1,
        size: 1,
    };
    Evaluator { document }.eval(expr, &context)
}

struct Context {
    node: NodeRef,
    position: usize,
    size: usize,
}

struct Evaluator<'a> {
    document: &'a XmlDocument,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr, context: &Context) -> Result<Value> {
        match expr {
            Expr::Or(left, right) => Ok(Value::Boolean(
                self.eval(left, context)?.to_boolean() || self.eval(right, context)?.to_boolean(),
            )),
            Expr::And(left, right) => Ok(Value::Boolean(
                self.eval(left, context)?.to_boolean() && self.eval(right, context)?.to_boolean(),
            )),
            Expr::Compare(op, left, right) => {
                let left = self.eval(left, context)?;
                let right = self.eval(right, context)?;
                Ok(Value::Boolean(self.compare(*op, &left, &right)))
            }
            Expr::Arith(op, left, right) => {
                let left = self.number(&self.eval(left, context)?);
                let right = self.number(&self.eval(right, context)?);
                Ok(Value::Number(match op {
                    ArithOp::Add => left + right,
                    ArithOp::Sub => left - right,
                    ArithOp::Mul => left * right,
                    ArithOp::Div => left / right,
                    // Truncating remainder, the sign follows the dividend.
                    ArithOp::Mod => left % right,
                }))
            }
            Expr::Negate(inner) => Ok(Value::Number(-self.number(&self.eval(inner, context)?))),
            Expr::Union(left, right) => {
                let (Value::Nodes(mut left), Value::Nodes(right)) =
                    (self.eval(left, context)?, self.eval(right, context)?)
                else {
                    return Err(XPathError::NotANodeSet("|".to_string()));
                };
                left.extend(right);
                Ok(Value::Nodes(document_order(left)))
            }
            Expr::Literal(text) => Ok(Value::Text(text.clone())),
            Expr::Number(number) => Ok(Value::Number(*number)),
            Expr::Call(function, args) => self.call(*function, args, context),
            Expr::Path { absolute, steps } => {
                let start = if *absolute {
                    NodeRef::Node(XmlDocument::ROOT)
                } else {
                    context.node
                };
                Ok(Value::Nodes(self.apply_steps(vec![start], steps)?))
            }
            Expr::Filter {
                primary,
                predicates,
                steps,
            } => {
                let Value::Nodes(mut nodes) = self.eval(primary, context)? else {
                    return Err(XPathError::NotANodeSet("filter expression".to_string()));
                };
                for predicate in predicates {
                    nodes = self.filter(nodes, predicate)?;
                }
                Ok(Value::Nodes(self.apply_steps(nodes, steps)?))
            }
        }
    }

    fn apply_steps(&self, start: Vec<NodeRef>, steps: &[Step]) -> Result<Vec<NodeRef>> {
        let mut current = start;
        for step in steps {
            let mut next = Vec::new();
            for &node in &current {
                let mut selected: Vec<NodeRef> = self
                    .axis(step.axis, node)
                    .into_iter()
                    .filter(|&candidate| self.matches(step.axis, &step.test, candidate))
                    .collect();
                if step.axis.is_reverse() {
                    selected.reverse();
                }
                for predicate in &step.predicates {
                    selected = self.filter(selected, predicate)?;
                }
                next.extend(selected);
            }
            current = document_order(next);
        }
        Ok(current)
    }

    /// Keep nodes for which `predicate` holds; numeric predicates select by position.
    fn filter(&self, nodes: Vec<NodeRef>, predicate: &Expr) -> Result<Vec<NodeRef>> {
        let size = nodes.len();
        let mut kept = Vec::new();
        for (index, node) in nodes.into_iter().enumerate() {
            let context = Context {
                node,
                position: index + 1,
                size,
            };
            let keep = match self.eval(predicate, &context)? {
                Value::Number(number) => number == (index + 1) as f64,
                other => other.to_boolean(),
            };
            if keep {
                kept.push(node);
            }
        }
        Ok(kept)
    }

    /// Nodes along `axis` from `node`, in document order.
    fn axis(&self, axis: Axis, node: NodeRef) -> Vec<NodeRef> {
        let doc = self.document;
        match (axis, node) {
            (Axis::SelfAxis, _) => vec![node],
            (Axis::Attribute, NodeRef::Node(id)) => doc
                .element(id)
                .map(|element| {
                    (0..element.attributes.len())
                        .map(|index| NodeRef::Attribute(id, index))
                        .collect()
                })
                .unwrap_or_default(),
            (Axis::Child, NodeRef::Node(id)) => {
                doc.children(id).iter().map(|&child| NodeRef::Node(child)).collect()
            }
            (Axis::Descendant, NodeRef::Node(id)) => {
                doc.descendants(id).into_iter().map(NodeRef::Node).collect()
            }
            (Axis::DescendantOrSelf, NodeRef::Node(id)) => std::iter::once(node)
                .chain(doc.descendants(id).into_iter().map(NodeRef::Node))
                .collect(),
            (Axis::DescendantOrSelf, NodeRef::Attribute(..)) => vec![node],
            (Axis::Parent, NodeRef::Node(id)) => doc.parent(id).map(NodeRef::Node).into_iter().collect(),
            (Axis::Parent, NodeRef::Attribute(owner, _)) => vec![NodeRef::Node(owner)],
            (Axis::Ancestor, _) => self.ancestors(node).into_iter().map(NodeRef::Node).collect(),
            (Axis::AncestorOrSelf, _) => self
                .ancestors(node)
                .into_iter()
                .map(NodeRef::Node)
                .chain(std::iter::once(node))
                .collect(),
            (Axis::FollowingSibling, NodeRef::Node(id)) => {
                let siblings = self.siblings(id);
                let start = siblings
                    .iter()
                    .position(|&sibling| sibling == id)
                    .map_or(siblings.len(), |index| index + 1);
                siblings[start..].iter().map(|&sibling| NodeRef::Node(sibling)).collect()
            }
            (Axis::PrecedingSibling, NodeRef::Node(id)) => {
                let siblings = self.siblings(id);
                let end = siblings.iter().position(|&sibling| sibling == id).unwrap_or(0);
                siblings[..end].iter().map(|&sibling| NodeRef::Node(sibling)).collect()
            }
            (Axis::Following, _) => {
                // Ids are preorder, so everything past the last descendant follows.
                let after = match node {
                    NodeRef::Node(id) => doc.descendants(id).last().copied().unwrap_or(id),
                    NodeRef::Attribute(owner, _) => owner,
                };
                (after + 1..doc.len()).map(NodeRef::Node).collect()
            }
            (Axis::Preceding, _) => {
                let before = match node {
                    NodeRef::Node(id) => id,
                    NodeRef::Attribute(owner, _) => owner,
                };
                let ancestors = self.ancestors(node);
                (0..before)
                    .filter(|id| !ancestors.contains(id))
                    .map(NodeRef::Node)
                    .collect()
            }
            (
                Axis::Attribute
                | Axis::Child
                | Axis::Descendant
                | Axis::FollowingSibling
                | Axis::PrecedingSibling,
                NodeRef::Attribute(..),
            ) => Vec::new(),
        }
    }

    /// Ancestors of `node` in document order; an attribute's owner is its parent.
    fn ancestors(&self, node: NodeRef) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut next = match node {
            NodeRef::Node(id) => self.document.parent(id),
            NodeRef::Attribute(owner, _) => Some(owner),
        };
        while let Some(id) = next {
            out.push(id);
            next = self.document.parent(id);
        }
        out.reverse();
        out
    }

    fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.document.parent(id) {
            Some(parent) => self.document.children(parent),
            None => &[],
        }
    }

    fn matches(&self, axis: Axis, test: &NodeTest, node: NodeRef) -> bool {
        let attribute_axis = axis == Axis::Attribute;
        match test {
            NodeTest::Node => true,
            NodeTest::Text => matches!(
                node,
                NodeRef::Node(id) if matches!(self.document.kind(id), NodeKind::Text(_))
            ),
            NodeTest::Comment => matches!(
                node,
                NodeRef::Node(id) if matches!(self.document.kind(id), NodeKind::Comment(_))
            ),
            NodeTest::ProcessingInstruction(wanted) => match node {
                NodeRef::Node(id) => match self.document.kind(id) {
                    NodeKind::ProcessingInstruction { target, .. } => {
                        wanted.as_ref().is_none_or(|wanted| wanted == target)
                    }
                    _ => false,
                },
                NodeRef::Attribute(..) => false,
            },
            NodeTest::AnyName => self.principal_name(node, attribute_axis).is_some(),
            NodeTest::AnyInNamespace(uri) => self
                .principal_name(node, attribute_axis)
                .is_some_and(|name| name.namespace.as_deref() == Some(uri.as_str())),
            NodeTest::Name { namespace, local } => self
                .principal_name(node, attribute_axis)
                .is_some_and(|name| name.local == *local && name.namespace == *namespace),
        }
    }

    /// Name of `node` if it is of the axis' principal node type.
    fn principal_name(&self, node: NodeRef, attribute_axis: bool) -> Option<&QualifiedName> {
        match node {
            NodeRef::Attribute(id, index) if attribute_axis => self
                .document
                .element(id)
                .and_then(|element| element.attributes.get(index))
                .map(|attribute| &attribute.name),
            NodeRef::Node(id) if !attribute_axis => {
                self.document.element(id).map(|element| &element.name)
            }
            _ => None,
        }
    }

    /// Expanded name as `(qualified, local, namespace)`; a processing instruction is named by its target.
    fn expanded_name(&self, node: NodeRef) -> Option<(String, &str, Option<&str>)> {
        if let NodeRef::Node(id) = node
            && let NodeKind::ProcessingInstruction { target, .. } = self.document.kind(id)
        {
            return Some((target.clone(), target.as_str(), None));
        }
        self.principal_name(node, matches!(node, NodeRef::Attribute(..)))
            .map(|name| (name.qualified(), name.local.as_str(), name.namespace.as_deref()))
    }

    fn attribute_value(&self, id: NodeId, namespace: &str, local: &str) -> Option<&str> {
        self.document.element(id)?.attributes.iter().find_map(|attribute| {
            (attribute.name.namespace.as_deref() == Some(namespace) && attribute.name.local == local)
                .then_some(attribute.value.as_str())
        })
    }

    /// `lang()`: the nearest `xml:lang` matches `wanted` exactly or as a `wanted-` subtag prefix.
    fn lang_matches(&self, node: NodeRef, wanted: &str) -> bool {
        let start = match node {
            NodeRef::Node(id) => id,
            NodeRef::Attribute(owner, _) => owner,
        };
        let declared = std::iter::successors(Some(start), |&id| self.document.parent(id))
            .find_map(|id| self.attribute_value(id, XML_NAMESPACE, "lang"));
        let Some(declared) = declared else {
            return false;
        };
        let declared = declared.to_lowercase();
        let wanted = wanted.to_lowercase();
        declared == wanted
            || declared
                .strip_prefix(&wanted)
                .is_some_and(|rest| rest.starts_with('-'))
    }

    /// `id()`: elements whose `xml:id` is one of the whitespace-separated tokens.
    fn elements_by_id(&self, tokens: &[String]) -> Vec<NodeRef> {
        self.document
            .descendants(XmlDocument::ROOT)
            .into_iter()
            .filter(|&id| {
                self.attribute_value(id, XML_NAMESPACE, "id")
                    .is_some_and(|value| tokens.iter().any(|token| token == value))
            })
            .map(NodeRef::Node)
            .collect()
    }

    fn string_value(&self, node: NodeRef) -> String {
        match node {
            NodeRef::Node(id) => self.document.string_value(id),
            NodeRef::Attribute(id, index) => self
                .document
                .element(id)
                .and_then(|element| element.attributes.get(index))
                .map(|attribute| attribute.value.clone())
                .unwrap_or_default(),
        }
    }

    fn string(&self, value: &Value) -> String {
        match value {
            Value::Nodes(nodes) => nodes
                .first()
                .map(|&node| self.string_value(node))
                .unwrap_or_default(),
            Value::Boolean(flag) => flag.to_string(),
            Value::Number(number) => format_number(*number),
            Value::Text(text) => text.clone(),
        }
    }

    fn number(&self, value: &Value) -> f64 {
        match value {
            Value::Nodes(_) => parse_number(&self.string(value)),
            Value::Boolean(flag) => f64::from(u8::from(*flag)),
            Value::Number(number) => *number,
            Value::Text(text) => parse_number(text),
        }
    }

    fn compare(&self, op: CompareOp, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Nodes(left), Value::Nodes(right)) => left.iter().any(|&a| {
                let a = Value::Text(self.string_value(a));
                right
                    .iter()
                    .any(|&b| self.compare_atoms(op, &a, &Value::Text(self.string_value(b))))
            }),
            (Value::Nodes(nodes), Value::Boolean(flag)) => {
                self.compare_atoms(op, &Value::Boolean(!nodes.is_empty()), &Value::Boolean(*flag))
            }
            (Value::Boolean(flag), Value::Nodes(nodes)) => {
                self.compare_atoms(op, &Value::Boolean(*flag), &Value::Boolean(!nodes.is_empty()))
            }
            (Value::Nodes(nodes), other) => nodes
                .iter()
                .any(|&node| self.compare_atoms(op, &Value::Text(self.string_value(node)), other)),
            (other, Value::Nodes(nodes)) => nodes
                .iter()
                .any(|&node| self.compare_atoms(op, other, &Value::Text(self.string_value(node)))),
            _ => self.compare_atoms(op, left, right),
        }
    }

    fn compare_atoms(&self, op: CompareOp, left: &Value, right: &Value) -> bool {
        match op {
            CompareOp::Eq | CompareOp::NotEq => {
                let equal = if matches!(left, Value::Boolean(_)) || matches!(right, Value::Boolean(_)) {
                    left.to_boolean() == right.to_boolean()
                } else if matches!(left, Value::Number(_)) || matches!(right, Value::Number(_)) {
                    self.number(left) == self.number(right)
                } else {
                    self.string(left) == self.string(right)
                };
                equal == (op == CompareOp::Eq)
            }
            CompareOp::Lt => self.number(left) < self.number(right),
            CompareOp::Le => self.number(left) <= self.number(right),
            CompareOp::Gt => self.number(left) > self.number(right),
            CompareOp::Ge => self.number(left) >= self.number(right),
        }
    }

    fn call(&self, function: Function, args: &[Expr], context: &Context) -> Result<Value> {
        let arg = |index: usize| self.eval(&args[index], context);
        let arg_or_context = || match args.first() {
            Some(expr) => self.eval(expr, context),
            None => Ok(Value::Nodes(vec![context.node])),
        };

        Ok(match function {
            Function::Count => match arg(0)? {
                Value::Nodes(nodes) => Value::Number(nodes.len() as f64),
                _ => return Err(XPathError::NotANodeSet("count".to_string())),
            },
            Function::Not => Value::Boolean(!arg(0)?.to_boolean()),
            Function::Boolean => Value::Boolean(arg(0)?.to_boolean()),
            Function::True => Value::Boolean(true),
            Function::False => Value::Boolean(false),
            Function::String => Value::Text(self.string(&arg_or_context()?)),
            Function::Number => Value::Number(self.number(&arg_or_context()?)),
            Function::Contains => {
                Value::Boolean(self.string(&arg(0)?).contains(&self.string(&arg(1)?)))
            }
            Function::StartsWith => {
                Value::Boolean(self.string(&arg(0)?).starts_with(&self.string(&arg(1)?)))
            }
            Function::StringLength => {
                Value::Number(self.string(&arg_or_context()?).chars().count() as f64)
            }
            Function::NormalizeSpace => Value::Text(
                self.string(&arg_or_context()?)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Function::LocalName | Function::Name | Function::NamespaceUri => {
                let Value::Nodes(nodes) = arg_or_context()? else {
                    let label = match function {
                        Function::Name => "name",
                        Function::NamespaceUri => "namespace-uri",
                        _ => "local-name",
                    };
                    return Err(XPathError::NotANodeSet(label.to_string()));
                };
                let names = nodes.first().and_then(|&node| self.expanded_name(node));
                Value::Text(match (function, names) {
                    (_, None) => String::new(),
                    (Function::Name, Some((qualified, _, _))) => qualified,
                    (Function::NamespaceUri, Some((_, _, namespace))) => {
                        namespace.unwrap_or_default().to_string()
                    }
                    (_, Some((_, local, _))) => local.to_string(),
                })
            }
            Function::Position => Value::Number(context.position as f64),
            Function::Last => Value::Number(context.size as f64),
            Function::Concat => {
                let mut joined = String::new();
                for expr in args {
                    joined.push_str(&self.string(&self.eval(expr, context)?));
                }
                Value::Text(joined)
            }
            Function::Substring => {
                let text = self.string(&arg(0)?);
                let start = self.number(&arg(1)?);
                let length = match args.get(2) {
                    Some(_) => Some(self.number(&arg(2)?)),
                    None => None,
                };
                Value::Text(substring(&text, start, length))
            }
            Function::SubstringBefore => {
                let text = self.string(&arg(0)?);
                let pattern = self.string(&arg(1)?);
                Value::Text(
                    text.find(&pattern)
                        .map(|index| text[..index].to_string())
                        .unwrap_or_default(),
                )
            }
            Function::SubstringAfter => {
                let text = self.string(&arg(0)?);
                let pattern = self.string(&arg(1)?);
                Value::Text(
                    text.find(&pattern)
                        .map(|index| text[index + pattern.len()..].to_string())
                        .unwrap_or_default(),
                )
            }
            Function::Translate => {
                let text = self.string(&arg(0)?);
                let from: Vec<char> = self.string(&arg(1)?).chars().collect();
                let to: Vec<char> = self.string(&arg(2)?).chars().collect();
                Value::Text(
                    text.chars()
                        .filter_map(|c| match from.iter().position(|&f| f == c) {
                            Some(index) => to.get(index).copied(),
                            None => Some(c),
                        })
                        .collect(),
                )
            }
            Function::Sum => match arg(0)? {
                Value::Nodes(nodes) => Value::Number(
                    nodes
                        .iter()
                        .map(|&node| parse_number(&self.string_value(node)))
                        .sum(),
                ),
                _ => return Err(XPathError::NotANodeSet("sum".to_string())),
            },
            Function::Floor => Value::Number(self.number(&arg(0)?).floor()),
            Function::Ceiling => Value::Number(self.number(&arg(0)?).ceil()),
            Function::Round => Value::Number(round(self.number(&arg(0)?))),
            Function::Lang => {
                let wanted = self.string(&arg(0)?);
                Value::Boolean(self.lang_matches(context.node, &wanted))
            }
            Function::Id => {
                let tokens: Vec<String> = match arg(0)? {
                    Value::Nodes(nodes) => nodes
                        .iter()
                        .flat_map(|&node| {
                            self.string_value(node)
                                .split_whitespace()
                                .map(str::to_string)
                                .collect::<Vec<_>>()
                        })
                        .collect(),
                    other => self
                        .string(&other)
                        .split_whitespace()
                        .map(str::to_string)
                        .collect(),
                };
                Value::Nodes(self.elements_by_id(&tokens))
            }
        })
    }
}

/// XPath `round()`: halves go towards positive infinity; NaN and infinities pass through.
fn round(number: f64) -> f64 {
    if number.is_finite() {
        (number + 0.5).floor()
    } else {
        number
    }
}

/// Characters at 1-based positions `p` with `round(start) <= p < round(start) + round(length)`.
fn substring(text: &str, start: f64, length: Option<f64>) -> String {
    let first = round(start);
    let end = length.map_or(f64::INFINITY, |length| first + round(length));
    text.chars()
        .enumerate()
        .filter(|&(index, _)| {
            let position = (index + 1) as f64;
            position >= first && position < end
        })
        .map(|(_, c)| c)
        .collect()
}

fn document_order(mut nodes: Vec<NodeRef>) -> Vec<NodeRef> {
    nodes.sort_by_key(|node| node.order_key());
    nodes.dedup();
    nodes
}

fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    let plain = !trimmed.is_empty()
        && trimmed
            .strip_prefix('-')
            .unwrap_or(trimmed)
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.');
    if plain {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        (if number > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if number == number.trunc() && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}
