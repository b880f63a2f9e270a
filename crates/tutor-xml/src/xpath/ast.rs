//! Expression tree.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    SelfAxis,
    Parent,
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Following,
    FollowingSibling,
    Preceding,
    PrecedingSibling,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Self::Child,
            "descendant" => Self::Descendant,
            "descendant-or-self" => Self::DescendantOrSelf,
            "self" => Self::SelfAxis,
            "parent" => Self::Parent,
            "ancestor" => Self::Ancestor,
            "ancestor-or-self" => Self::AncestorOrSelf,
            "attribute" => Self::Attribute,
            "following" => Self::Following,
            "following-sibling" => Self::FollowingSibling,
            "preceding" => Self::Preceding,
            "preceding-sibling" => Self::PrecedingSibling,
            _ => return None,
        })
    }

    /// Reverse axes number their nodes nearest-first.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Self::Ancestor
                | Self::AncestorOrSelf
                | Self::Preceding
                | Self::PrecedingSibling
                | Self::Parent
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `*`
    AnyName,
    /// `prefix:*`
    AnyInNamespace(String),
    /// `local` or `prefix:local`; the namespace is already resolved.
    Name {
        namespace: Option<String>,
        local: String,
    },
    /// `text()`
    Text,
    /// `node()`
    Node,
    /// `comment()`
    Comment,
    /// `processing-instruction()`, optionally restricted to one target.
    ProcessingInstruction(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Count,
    Not,
    Boolean,
    True,
    False,
    String,
    Number,
    Contains,
    StartsWith,
    StringLength,
    NormalizeSpace,
    LocalName,
    Name,
    NamespaceUri,
    Position,
    Last,
    Concat,
    Substring,
    SubstringBefore,
    SubstringAfter,
    Translate,
    Sum,
    Floor,
    Ceiling,
    Round,
    Lang,
    Id,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "count" => Self::Count,
            "not" => Self::Not,
            "boolean" => Self::Boolean,
            "true" => Self::True,
            "false" => Self::False,
            "string" => Self::String,
            "number" => Self::Number,
            "contains" => Self::Contains,
            "starts-with" => Self::StartsWith,
            "string-length" => Self::StringLength,
            "normalize-space" => Self::NormalizeSpace,
            "local-name" => Self::LocalName,
            "name" => Self::Name,
            "namespace-uri" => Self::NamespaceUri,
            "position" => Self::Position,
            "last" => Self::Last,
            "concat" => Self::Concat,
            "substring" => Self::Substring,
            "substring-before" => Self::SubstringBefore,
            "substring-after" => Self::SubstringAfter,
            "translate" => Self::Translate,
            "sum" => Self::Sum,
            "floor" => Self::Floor,
            "ceiling" => Self::Ceiling,
            "round" => Self::Round,
            "lang" => Self::Lang,
            "id" => Self::Id,
            _ => return None,
        })
    }

    /// Accepted argument counts, inclusive, with a description for errors.
    pub fn arity(self) -> (usize, usize, &'static str) {
        match self {
            Self::True | Self::False | Self::Position | Self::Last => (0, 0, "0"),
            Self::Count
            | Self::Not
            | Self::Boolean
            | Self::Sum
            | Self::Floor
            | Self::Ceiling
            | Self::Round
            | Self::Lang
            | Self::Id => (1, 1, "1"),
            Self::String
            | Self::Number
            | Self::StringLength
            | Self::NormalizeSpace
            | Self::LocalName
            | Self::Name
            | Self::NamespaceUri => (0, 1, "0 or 1"),
            Self::Contains | Self::StartsWith | Self::SubstringBefore | Self::SubstringAfter => {
                (2, 2, "2")
            }
            Self::Substring => (2, 3, "2 or 3"),
            Self::Translate => (3, 3, "3"),
            Self::Concat => (2, usize::MAX, "2 or more"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    Negate(Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Literal(String),
    Number(f64),
    Call(Function, Vec<Expr>),
    /// Location path; `absolute` paths start at the document node.
    Path { absolute: bool, steps: Vec<Step> },
    /// Primary expression followed by predicates and an optional relative path.
    Filter {
        primary: Box<Expr>,
        predicates: Vec<Expr>,
        steps: Vec<Step>,
    },
}
