//! Tokens of the relaxed JSON grammar.

use std::fmt;

use serde_json::Number;

use crate::span::Span;

/// A significant token. Whitespace and comments never become tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    /// A single- or double-quoted string with escapes resolved.
    String(String),
    Number(Number),
    /// A bare word: `true`, `false`, `null`, or an unquoted key.
    Word(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftBrace => write!(f, "`{{`"),
            Token::RightBrace => write!(f, "`}}`"),
            Token::LeftBracket => write!(f, "`[`"),
            Token::RightBracket => write!(f, "`]`"),
            Token::Colon => write!(f, "`:`"),
            Token::Comma => write!(f, "`,`"),
            Token::String(_) => write!(f, "string"),
            Token::Number(number) => write!(f, "number `{number}`"),
            Token::Word(word) => write!(f, "`{word}`"),
        }
    }
}

/// A token together with its location in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'a> {
    pub token: Token<'a>,
    pub span: Span,
}

impl<'a> PositionedToken<'a> {
    pub fn new(token: Token<'a>, span: Span) -> Self {
        Self { token, span }
    }
}
