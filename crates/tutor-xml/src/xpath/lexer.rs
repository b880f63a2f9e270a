//! Tokenizer.

use crate::error::XPathError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Dot,
    DotDot,
    Comma,
    Pipe,
    Star,
    Plus,
    Minus,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    ColonColon,
    Literal(String),
    Number(f64),
    /// NCName, `prefix:local` or `prefix:*`.
    Name(String),
}

/// A token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Spanned>, XPathError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < chars.len() {
        let (offset, ch) = chars[index];
        let next = chars.get(index + 1).map(|(_, c)| *c);
        let (token, width) = match ch {
            c if c.is_whitespace() => {
                index += 1;
                continue;
            }
            '/' if next == Some('/') => (Token::DoubleSlash, 2),
            '/' => (Token::Slash, 1),
            '[' => (Token::LBracket, 1),
            ']' => (Token::RBracket, 1),
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            '@' => (Token::At, 1),
            ',' => (Token::Comma, 1),
            '|' => (Token::Pipe, 1),
            '*' => (Token::Star, 1),
            '+' => (Token::Plus, 1),
            '-' => (Token::Minus, 1),
            '=' => (Token::Eq, 1),
            '!' if next == Some('=') => (Token::NotEq, 2),
            '<' if next == Some('=') => (Token::Le, 2),
            '<' => (Token::Lt, 1),
            '>' if next == Some('=') => (Token::Ge, 2),
            '>' => (Token::Gt, 1),
            ':' if next == Some(':') => (Token::ColonColon, 2),
            '.' if next == Some('.') => (Token::DotDot, 2),
            '.' if next.is_some_and(|c| c.is_ascii_digit()) => {
                let (number, width) = read_number(&chars[index..]);
                (Token::Number(number), width)
            }
            '.' => (Token::Dot, 1),
            '"' | '\'' => {
                let rest = &chars[index + 1..];
                let Some(end) = rest.iter().position(|(_, c)| *c == ch) else {
                    return Err(XPathError::Syntax {
                        offset,
                        message: "unterminated string literal".to_string(),
                    });
                };
                let literal: String = rest[..end].iter().map(|(_, c)| *c).collect();
                (Token::Literal(literal), end + 2)
            }
            c if c.is_ascii_digit() => {
                let (number, width) = read_number(&chars[index..]);
                (Token::Number(number), width)
            }
            c if is_name_start(c) => read_name(&chars[index..]),
            other => {
                return Err(XPathError::Syntax {
                    offset,
                    message: format!("unexpected character '{other}'"),
                });
            }
        };
        tokens.push(Spanned { token, offset });
        index += width;
    }

    Ok(tokens)
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn read_number(chars: &[(usize, char)]) -> (f64, usize) {
    let mut width = 0;
    let mut seen_dot = false;
    let mut text = String::new();
    for (_, c) in chars {
        match c {
            '0'..='9' => text.push(*c),
            '.' if !seen_dot => {
                seen_dot = true;
                text.push('.');
            }
            _ => break,
        }
        width += 1;
    }
    (text.parse().unwrap_or(f64::NAN), width)
}

/// Reads an NCName, optionally followed by `:local` or `:*` (but not `::`).
fn read_name(chars: &[(usize, char)]) -> (Token, usize) {
    let mut width = chars.iter().take_while(|(_, c)| is_name_char(*c)).count();
    let colon = chars.get(width).map(|(_, c)| *c);
    let after = chars.get(width + 1).map(|(_, c)| *c);
    if colon == Some(':') {
        match after {
            Some('*') => width += 2,
            Some(c) if is_name_start(c) => {
                width += 1;
                width += chars[width..]
                    .iter()
                    .take_while(|(_, c)| is_name_char(*c))
                    .count();
            }
            _ => {}
        }
    }
    let name: String = chars[..width].iter().map(|(_, c)| *c).collect();
    (Token::Name(name), width)
}
