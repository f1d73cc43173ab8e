//! Recursive descent over lexed tokens, building a [`serde_json::Value`].
//!
//! Accepts trailing commas in arrays and objects and unquoted (identifier)
//! object keys. Rejects `NaN`, `Infinity` and other bare words in value
//! position. Later duplicate keys overwrite earlier ones.

use serde_json::{Map, Value};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Deepest array/object nesting accepted.
pub const MAX_DEPTH: usize = 128;

struct Parser<'t, 'a> {
    tokens: &'t [PositionedToken<'a>],
    pos: usize,
    source_len: usize,
    depth: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(tokens: &'t [PositionedToken<'a>], source_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            source_len,
            depth: 0,
        }
    }

    fn next(&mut self) -> Option<&'t PositionedToken<'a>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&'t PositionedToken<'a>> {
        self.tokens.get(self.pos)
    }

    /// Consumes the next token when it equals `expected`.
    fn eat(&mut self, expected: &Token<'_>) -> bool {
        match self.peek() {
            Some(positioned) if positioned.token == *expected => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn eof_span(&self) -> Span {
        Span::new(self.source_len..self.source_len)
    }

    fn enter(&mut self, open: Span) -> Result<(), Diagnostic> {
        if self.depth >= MAX_DEPTH {
            return Err(Diagnostic::error("nesting too deep")
                .with_code(ErrorCode::E104)
                .with_label(open, format!("exceeds {MAX_DEPTH} levels of nesting")));
        }
        self.depth += 1;
        Ok(())
    }

    fn document(&mut self) -> Result<Value, Diagnostic> {
        if self.tokens.is_empty() {
            return Err(Diagnostic::error("empty document")
                .with_code(ErrorCode::E101)
                .with_label(self.eof_span(), "expected a value")
                .with_help("an importable file holds a JSON array"));
        }

        let value = self.value()?;

        if let Some(extra) = self.peek() {
            let end = self.tokens.last().map_or(extra.span, |last| last.span);
            return Err(Diagnostic::error("trailing content after the document")
                .with_code(ErrorCode::E103)
                .with_label(extra.span.union(end), "unexpected content")
                .with_help("a document holds exactly one value"));
        }

        Ok(value)
    }

    fn value(&mut self) -> Result<Value, Diagnostic> {
        let Some(positioned) = self.next() else {
            return Err(Diagnostic::error("unexpected end of input")
                .with_code(ErrorCode::E101)
                .with_label(self.eof_span(), "expected a value"));
        };

        match &positioned.token {
            Token::LeftBrace => self.object(positioned.span),
            Token::LeftBracket => self.array(positioned.span),
            Token::String(text) => Ok(Value::String(text.clone())),
            Token::Number(number) => Ok(Value::Number(number.clone())),
            Token::Word("true") => Ok(Value::Bool(true)),
            Token::Word("false") => Ok(Value::Bool(false)),
            Token::Word("null") => Ok(Value::Null),
            Token::Word(word @ ("NaN" | "Infinity")) => {
                Err(Diagnostic::error(format!("`{word}` is not supported"))
                    .with_code(ErrorCode::E102)
                    .with_label(positioned.span, "non-finite number")
                    .with_help("use a finite number or a string"))
            }
            Token::Word(word) => Err(Diagnostic::error(format!("unsupported literal `{word}`"))
                .with_code(ErrorCode::E102)
                .with_label(positioned.span, "bare word in value position")
                .with_help("quote strings with `\"` or `'`")),
            other => Err(Diagnostic::error("expected a value")
                .with_code(ErrorCode::E100)
                .with_label(positioned.span, format!("unexpected {other}"))),
        }
    }

    fn array(&mut self, open: Span) -> Result<Value, Diagnostic> {
        self.enter(open)?;
        let mut items = Vec::new();

        loop {
            if self.eat(&Token::RightBracket) {
                break;
            }
            items.push(self.value()?);

            match self.next() {
                Some(PositionedToken {
                    token: Token::Comma,
                    ..
                }) => {}
                Some(PositionedToken {
                    token: Token::RightBracket,
                    ..
                }) => break,
                Some(other) => {
                    return Err(Diagnostic::error("expected `,` or `]`")
                        .with_code(ErrorCode::E100)
                        .with_label(other.span, format!("unexpected {}", other.token))
                        .with_secondary_label(open, "array opened here"));
                }
                None => {
                    return Err(Diagnostic::error("unclosed array")
                        .with_code(ErrorCode::E101)
                        .with_label(self.eof_span(), "expected `]`")
                        .with_secondary_label(open, "array opened here"));
                }
            }
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn key(&mut self, open: Span) -> Result<String, Diagnostic> {
        match self.next() {
            Some(PositionedToken {
                token: Token::String(text),
                ..
            }) => Ok(text.clone()),
            Some(PositionedToken {
                token: Token::Word(word),
                ..
            }) => Ok((*word).to_string()),
            Some(other) => Err(Diagnostic::error("expected an object key")
                .with_code(ErrorCode::E100)
                .with_label(other.span, format!("unexpected {}", other.token))
                .with_help("keys are strings or identifiers")),
            None => Err(Diagnostic::error("unclosed object")
                .with_code(ErrorCode::E101)
                .with_label(self.eof_span(), "expected `}`")
                .with_secondary_label(open, "object opened here")),
        }
    }

    fn object(&mut self, open: Span) -> Result<Value, Diagnostic> {
        self.enter(open)?;
        let mut map = Map::new();

        loop {
            if self.eat(&Token::RightBrace) {
                break;
            }
            let key = self.key(open)?;

            match self.next() {
                Some(PositionedToken {
                    token: Token::Colon,
                    ..
                }) => {}
                Some(other) => {
                    return Err(Diagnostic::error(format!("expected `:` after key `{key}`"))
                        .with_code(ErrorCode::E100)
                        .with_label(other.span, format!("unexpected {}", other.token)));
                }
                None => {
                    return Err(Diagnostic::error("unclosed object")
                        .with_code(ErrorCode::E101)
                        .with_label(self.eof_span(), "expected `:`")
                        .with_secondary_label(open, "object opened here"));
                }
            }

            let value = self.value()?;
            map.insert(key, value);

            match self.next() {
                Some(PositionedToken {
                    token: Token::Comma,
                    ..
                }) => {}
                Some(PositionedToken {
                    token: Token::RightBrace,
                    ..
                }) => break,
                Some(other) => {
                    return Err(Diagnostic::error("expected `,` or `}`")
                        .with_code(ErrorCode::E100)
                        .with_label(other.span, format!("unexpected {}", other.token))
                        .with_secondary_label(open, "object opened here"));
                }
                None => {
                    return Err(Diagnostic::error("unclosed object")
                        .with_code(ErrorCode::E101)
                        .with_label(self.eof_span(), "expected `}`")
                        .with_secondary_label(open, "object opened here"));
                }
            }
        }

        self.depth -= 1;
        Ok(Value::Object(map))
    }
}

/// Builds a single JSON value from a token stream.
///
/// `source_len` positions end-of-input diagnostics.
pub fn build(tokens: &[PositionedToken<'_>], source_len: usize) -> Result<Value, Diagnostic> {
    Parser::new(tokens, source_len).document()
}
