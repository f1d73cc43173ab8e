//! Relaxed JSON reader for Flowpad import files.
//!
//! Node and edge files are written by hand as often as they are generated,
//! so the reader accepts a JSON5-style superset of JSON: comments, single
//! quoted strings, unquoted keys, trailing commas, hexadecimal numbers and
//! `+`/leading-dot numbers.
//!
//! Parsing runs in two stages:
//!
//! 1. **Lexing** ([`lexer`]) turns source text into tokens, recovering from
//!    errors so several problems can be reported at once.
//! 2. **Building** turns the tokens into a [`serde_json::Value`].
//!
//! Every failure is a [`ParseError`] holding source-located
//! [`Diagnostic`](error::Diagnostic)s.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod tokens;

use log::debug;
use serde_json::Value;

pub use error::ParseError;
pub use span::Span;

/// Parse relaxed JSON source text into a [`Value`].
///
/// # Errors
///
/// Returns a [`ParseError`] holding every lexical error found, or the first
/// structural error.
///
/// # Example
///
/// ```
/// let value = flowpad_parser::parse("[{ id: 'a', /* first */ }, ]").unwrap();
/// assert_eq!(value[0]["id"], "a");
/// ```
pub fn parse(source: &str) -> Result<Value, ParseError> {
    let tokens = lexer::tokenize(source)?;
    debug!(tokens = tokens.len(); "Source lexed");

    let value = parser::build(&tokens, source.len())?;
    Ok(value)
}
