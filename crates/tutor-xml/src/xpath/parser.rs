//! Recursive-descent parser producing [`Expr`].

use std::collections::BTreeMap;

use super::ast::{ArithOp, Axis, CompareOp, Expr, Function, NodeTest, Step};
use super::lexer::{Spanned, Token};
use crate::document::XML_NAMESPACE;
use crate::error::XPathError;

type Result<T> = std::result::Result<T, XPathError>;

pub fn parse(tokens: &[Spanned], namespaces: &BTreeMap<String, String>) -> Result<Expr> {
    let mut parser = Parser {
        tokens,
        position: 0,
        namespaces,
    };
    if tokens.is_empty() {
        return Err(parser.error("empty expression"));
    }
    let expr = parser.parse_or()?;
    if parser.peek().is_some() {
        return Err(parser.error("unexpected token"));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    position: usize,
    namespaces: &'a BTreeMap<String, String>,
}

fn is_node_type(name: &str) -> bool {
    matches!(name, "text" | "node" | "comment" | "processing-instruction")
}

fn descendant_or_self() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        test: NodeTest::Node,
        predicates: Vec::new(),
    }
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens
            .get(self.position + ahead)
            .map(|spanned| &spanned.token)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.peek().cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    fn error(&self, message: &str) -> XPathError {
        let offset = self
            .tokens
            .get(self.position)
            .or(self.tokens.last())
            .map_or(0, |spanned| spanned.offset);
        XPathError::Syntax {
            offset,
            message: message.to_string(),
        }
    }

    fn at_operator_name(&self, name: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(found)) if found == name)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.at_operator_name("or") {
            self.position += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_equality()?;
        while self.at_operator_name("and") {
            self.position += 1;
            let right = self.parse_equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => CompareOp::Eq,
                Some(Token::NotEq) => CompareOp::NotEq,
                _ => break,
            };
            self.position += 1;
            let right = self.parse_relational()?;
            left = Expr::Compare(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => CompareOp::Lt,
                Some(Token::Le) => CompareOp::Le,
                Some(Token::Gt) => CompareOp::Gt,
                Some(Token::Ge) => CompareOp::Ge,
                _ => break,
            };
            self.position += 1;
            let right = self.parse_additive()?;
            left = Expr::Compare(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.position += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// Following an operand, `*` is multiplication and `div`/`mod` are operators.
    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                _ if self.at_operator_name("div") => ArithOp::Div,
                _ if self.at_operator_name("mod") => ArithOp::Mod,
                _ => break,
            };
            self.position += 1;
            let right = self.parse_unary()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Negate(Box::new(self.parse_unary()?)));
        }
        self.parse_union()
    }

    fn parse_union(&mut self) -> Result<Expr> {
        let mut left = self.parse_path_expr()?;
        while self.eat(&Token::Pipe) {
            let right = self.parse_path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn starts_step(&self) -> bool {
        match self.peek() {
            Some(Token::At | Token::Dot | Token::DotDot | Token::Star) => true,
            Some(Token::Name(name)) => {
                self.peek_at(1) != Some(&Token::LParen) || is_node_type(name)
            }
            _ => false,
        }
    }

    fn parse_path_expr(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Slash) => {
                self.position += 1;
                let steps = if self.starts_step() {
                    self.parse_relative_steps()?
                } else {
                    Vec::new()
                };
                Ok(Expr::Path {
                    absolute: true,
                    steps,
                })
            }
            Some(Token::DoubleSlash) => {
                self.position += 1;
                let mut steps = vec![descendant_or_self()];
                steps.extend(self.parse_relative_steps()?);
                Ok(Expr::Path {
                    absolute: true,
                    steps,
                })
            }
            _ if self.starts_step() => Ok(Expr::Path {
                absolute: false,
                steps: self.parse_relative_steps()?,
            }),
            _ => self.parse_filter_expr(),
        }
    }

    fn parse_relative_steps(&mut self) -> Result<Vec<Step>> {
        let mut steps = vec![self.parse_step()?];
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.parse_step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(descendant_or_self());
                steps.push(self.parse_step()?);
            } else {
                break;
            }
        }
        Ok(steps)
    }

    fn parse_step(&mut self) -> Result<Step> {
        if self.eat(&Token::Dot) {
            return Ok(Step {
                axis: Axis::SelfAxis,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step {
                axis: Axis::Parent,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }

        let axis = if self.eat(&Token::At) {
            Axis::Attribute
        } else if let (Some(Token::Name(name)), Some(Token::ColonColon)) =
            (self.peek(), self.peek_at(1))
        {
            let axis = Axis::from_name(name).ok_or_else(|| XPathError::UnknownAxis(name.clone()))?;
            self.position += 2;
            axis
        } else {
            Axis::Child
        };

        let test = self.parse_node_test()?;
        let predicates = self.parse_predicates()?;
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn parse_node_test(&mut self) -> Result<NodeTest> {
        match self.next_token() {
            Some(Token::Star) => Ok(NodeTest::AnyName),
            Some(Token::Name(name)) if is_node_type(&name) && self.peek() == Some(&Token::LParen) => {
                self.expect(&Token::LParen, "'('")?;
                let test = match name.as_str() {
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    "processing-instruction" => match self.peek() {
                        Some(Token::Literal(target)) => {
                            let target = target.clone();
                            self.position += 1;
                            NodeTest::ProcessingInstruction(Some(target))
                        }
                        _ => NodeTest::ProcessingInstruction(None),
                    },
                    _ => NodeTest::Node,
                };
                self.expect(&Token::RParen, "')'")?;
                Ok(test)
            }
            Some(Token::Name(name)) => self.resolve_name_test(&name),
            _ => {
                self.position = self.position.saturating_sub(1);
                Err(self.error("expected a node test"))
            }
        }
    }

    fn resolve_name_test(&self, name: &str) -> Result<NodeTest> {
        let Some((prefix, local)) = name.split_once(':') else {
            return Ok(NodeTest::Name {
                namespace: None,
                local: name.to_string(),
            });
        };
        let uri = match self.namespaces.get(prefix) {
            Some(uri) => uri.clone(),
            None if prefix == "xml" => XML_NAMESPACE.to_string(),
            None => return Err(XPathError::UnknownPrefix(prefix.to_string())),
        };
        if local == "*" {
            Ok(NodeTest::AnyInNamespace(uri))
        } else {
            Ok(NodeTest::Name {
                namespace: Some(uri),
                local: local.to_string(),
            })
        }
    }

    fn parse_predicates(&mut self) -> Result<Vec<Expr>> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LBracket) {
            predicates.push(self.parse_or()?);
            self.expect(&Token::RBracket, "']'")?;
        }
        Ok(predicates)
    }

    fn parse_filter_expr(&mut self) -> Result<Expr> {
        let primary = self.parse_primary()?;
        let predicates = self.parse_predicates()?;
        let mut steps = Vec::new();
        if self.eat(&Token::Slash) {
            steps = self.parse_relative_steps()?;
        } else if self.eat(&Token::DoubleSlash) {
            steps.push(descendant_or_self());
            steps.extend(self.parse_relative_steps()?);
        }
        if predicates.is_empty() && steps.is_empty() {
            Ok(primary)
        } else {
            Ok(Expr::Filter {
                primary: Box::new(primary),
                predicates,
                steps,
            })
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.next_token() {
            Some(Token::Literal(text)) => Ok(Expr::Literal(text)),
            Some(Token::Number(number)) => Ok(Expr::Number(number)),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => {
                let function =
                    Function::from_name(&name).ok_or_else(|| XPathError::UnknownFunction(name.clone()))?;
                self.position += 1;
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.parse_or()?);
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        self.expect(&Token::RParen, "')'")?;
                        break;
                    }
                }
                let (min, max, expected) = function.arity();
                if args.len() < min || args.len() > max {
                    return Err(XPathError::Arity {
                        name,
                        expected,
                        found: args.len(),
                    });
                }
                Ok(Expr::Call(function, args))
            }
            _ => {
                self.position = self.position.saturating_sub(1);
                Err(self.error("expected an expression"))
            }
        }
    }
}
