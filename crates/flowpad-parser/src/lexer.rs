//! Lexical analyzer for relaxed JSON.
//!
//! Converts source text into [`PositionedToken`]s. Whitespace, `//` line
//! comments and `/* */` block comments are skipped. Strings may use single
//! or double quotes; numbers may carry a leading `+`, a leading or trailing
//! decimal point, or be written in hexadecimal.
//!
//! The public entry point is [`tokenize`], which recovers from errors and
//! reports every problem it finds in one pass.

use serde_json::Number;
use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, cut_err, not, opt, peek, preceded, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// What went wrong inside a lexeme.
///
/// Attached to winnow errors with `.context()`. The reported span runs from
/// `start` to wherever lexing gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    start: usize,
}

impl LexerDiagnostic {
    fn to_diagnostic(&self, error_pos: usize) -> Diagnostic {
        let span = Span::new(self.start..error_pos.max(self.start + 1));
        let diag = Diagnostic::error(self.message)
            .with_code(self.code)
            .with_label(span, self.code.description());
        match self.help {
            Some(help) => diag.with_help(help),
            None => diag,
        }
    }
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Fails with a committed error carrying `diagnostic`.
fn cut<O>(input: &Input<'_>, diagnostic: LexerDiagnostic) -> IResult<O> {
    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        diagnostic,
    )))
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whitespace, including the byte order mark and unicode spaces.
fn whitespace(input: &mut Input<'_>) -> IResult<()> {
    take_while(1.., |c: char| c.is_whitespace() || c == '\u{FEFF}')
        .void()
        .parse_next(input)
}

/// `// ...` up to the end of the line
fn line_comment(input: &mut Input<'_>) -> IResult<()> {
    preceded("//", take_while(0.., |c: char| c != '\n'))
        .void()
        .parse_next(input)
}

/// `/* ... */`, committed once the opener is seen
fn block_comment(input: &mut Input<'_>) -> IResult<()> {
    let start = input.current_token_start();

    preceded(
        "/*",
        cut_err(terminated(take_until(0.., "*/"), "*/")).context(LexerDiagnostic {
            code: ErrorCode::E006,
            message: "unterminated block comment",
            help: Some("close the comment with `*/`"),
            start,
        }),
    )
    .void()
    .parse_next(input)
}

/// Exactly `digits` hex digits as a number.
fn hex_value(input: &mut Input<'_>, digits: usize, diagnostic: LexerDiagnostic) -> IResult<u32> {
    cut_err(
        take_while(digits, |c: char| c.is_ascii_hexdigit())
            .verify_map(|hex: &str| u32::from_str_radix(hex, 16).ok()),
    )
    .context(diagnostic)
    .parse_next(input)
}

/// The part of `\uHHHH` after the `u`, combining surrogate pairs.
fn unicode_escape(input: &mut Input<'_>, escape_start: usize) -> IResult<char> {
    let invalid_codepoint = LexerDiagnostic {
        code: ErrorCode::E005,
        message: "invalid unicode codepoint",
        help: Some("surrogates must come in pairs: `\\uD83D\\uDE00`"),
        start: escape_start,
    };

    let high = hex_value(
        input,
        4,
        LexerDiagnostic {
            code: ErrorCode::E004,
            message: "invalid unicode escape",
            help: Some("use `\\u` followed by exactly four hex digits"),
            start: escape_start,
        },
    )?;

    if (0xD800..0xDC00).contains(&high) {
        let low: IResult<u32> = preceded(
            "\\u",
            take_while(4, |c: char| c.is_ascii_hexdigit())
                .verify_map(|hex: &str| u32::from_str_radix(hex, 16).ok()),
        )
        .parse_next(input);

        return match low {
            Ok(low) if (0xDC00..0xE000).contains(&low) => {
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                match char::from_u32(code) {
                    Some(ch) => Ok(ch),
                    None => cut(input, invalid_codepoint),
                }
            }
            _ => cut(input, invalid_codepoint),
        };
    }

    match char::from_u32(high) {
        Some(ch) => Ok(ch),
        None => cut(input, invalid_codepoint),
    }
}

/// An escape sequence after its backslash.
///
/// Returns `None` for a line continuation, which contributes nothing.
fn string_escape(input: &mut Input<'_>, escape_start: usize) -> IResult<Option<char>> {
    let invalid_escape = LexerDiagnostic {
        code: ErrorCode::E003,
        message: "invalid escape sequence",
        help: Some(
            "valid escapes: `\\n`, `\\r`, `\\t`, `\\b`, `\\f`, `\\v`, `\\0`, `\\\\`, `\\/`, `\\'`, `\\\"`, `\\xHH`, `\\uHHHH`",
        ),
        start: escape_start,
    };

    let Some(c) = input.next_token() else {
        return cut(input, invalid_escape);
    };

    let ch = match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'b' => '\u{08}',
        'f' => '\u{0C}',
        'v' => '\u{0B}',
        '0' => '\0',
        '\\' | '/' | '\'' | '"' => c,
        '\n' | '\u{2028}' | '\u{2029}' => return Ok(None),
        '\r' => {
            opt('\n').parse_next(input)?;
            return Ok(None);
        }
        'x' => {
            let value = hex_value(
                input,
                2,
                LexerDiagnostic {
                    code: ErrorCode::E003,
                    message: "invalid hex escape",
                    help: Some("use `\\x` followed by exactly two hex digits"),
                    start: escape_start,
                },
            )?;
            return match char::from_u32(value) {
                Some(ch) => Ok(Some(ch)),
                None => cut(input, invalid_escape),
            };
        }
        'u' => return unicode_escape(input, escape_start).map(Some),
        _ => return cut(input, invalid_escape),
    };

    Ok(Some(ch))
}

/// A string in single or double quotes. Raw line breaks are not allowed.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let quote = one_of(['"', '\'']).parse_next(input)?;

    let unterminated = LexerDiagnostic {
        code: ErrorCode::E001,
        message: "unterminated string literal",
        help: if quote == '"' {
            Some("add closing `\"`")
        } else {
            Some("add closing `'`")
        },
        start,
    };

    let mut value = String::new();
    loop {
        let checkpoint = input.checkpoint();
        let position = input.current_token_start();
        match input.next_token() {
            Some(c) if c == quote => return Ok(Token::String(value)),
            Some('\\') => {
                if let Some(ch) = string_escape(input, position)? {
                    value.push(ch);
                }
            }
            Some('\n') | Some('\r') => {
                input.reset(&checkpoint);
                return cut(input, unterminated);
            }
            Some(c) => value.push(c),
            None => return cut(input, unterminated),
        }
    }
}

/// Converts the text of a number literal into a JSON number.
///
/// Integers stay integers where they fit; everything else goes through
/// `f64`. Returns `None` when the value is not finite.
fn to_number(text: &str) -> Option<Number> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let integer = |magnitude: u64| -> Option<Number> {
        if !negative {
            return Some(Number::from(magnitude));
        }
        match 0i64.checked_sub_unsigned(magnitude) {
            Some(value) => Some(Number::from(value)),
            None => Number::from_f64(-(magnitude as f64)),
        }
    };

    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).ok().and_then(integer);
    }

    if !digits.contains(['.', 'e', 'E']) {
        if let Ok(magnitude) = digits.parse::<u64>() {
            return integer(magnitude);
        }
    }

    let value: f64 = digits.parse().ok()?;
    Number::from_f64(if negative { -value } else { value })
}

/// A number literal, not directly followed by a word character.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    let text = (
        opt(one_of(['+', '-'])),
        alt((
            (
                alt(("0x", "0X")),
                take_while(1.., |c: char| c.is_ascii_hexdigit()),
            )
                .void(),
            (digit1, opt(('.', digit0))).void(),
            ('.', digit1).void(),
        )),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)?;

    // Keeps `1abc` from lexing as `1` followed by `abc`
    peek(not(one_of(is_word_char))).parse_next(input)?;

    match to_number(text) {
        Some(number) => Ok(Token::Number(number)),
        None => cut(
            input,
            LexerDiagnostic {
                code: ErrorCode::E007,
                message: "number out of range",
                help: Some("numbers must fit a finite 64-bit float"),
                start,
            },
        ),
    }
}

/// A bare word such as `true` or an unquoted key
fn word<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (one_of(is_word_start), take_while(0.., is_word_char))
        .take()
        .map(Token::Word)
        .parse_next(input)
}

/// Structural single character tokens
fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ':'.value(Token::Colon),
        ','.value(Token::Comma),
    ))
    .parse_next(input)
}

/// One lexeme with position tracking. Trivia yields `None`.
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<Option<PositionedToken<'a>>> {
    let start = input.current_token_start();

    let token = alt((
        whitespace.value(None),
        line_comment.value(None), // Must come before block comments
        block_comment.value(None),
        string_literal.map(Some),
        number_literal.map(Some), // Must come before punctuation and words
        word.map(Some),
        punctuation.map(Some),
    ))
    .parse_next(input)?;

    let end = input.current_token_start();

    Ok(token.map(|token| PositionedToken::new(token, Span::new(start..end))))
}

/// Builds the report for a failed token that ended at `error_pos`.
///
/// Errors without a [`LexerDiagnostic`] attached mean no lexeme matches
/// here and are reported as a single unexpected character.
fn failure_to_diagnostic(
    failure: ErrMode<ContextError<LexerDiagnostic>>,
    error_pos: usize,
) -> Diagnostic {
    let context = match &failure {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx.context().next(),
        ErrMode::Incomplete(_) => None,
    };

    match context {
        Some(lexer_diag) => lexer_diag.to_diagnostic(error_pos),
        None => Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(
                Span::new(error_pos..error_pos + 1),
                ErrorCode::E002.description(),
            ),
    }
}

/// Tokenize relaxed JSON source, collecting every lexical error.
///
/// After a bad lexeme the lexer skips one character and keeps going, so
/// the error lists every problem in the input rather than just the first.
pub fn tokenize(source: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();
    let mut diagnostics = DiagnosticCollector::new();

    while !input.is_empty() {
        match positioned_token(&mut input) {
            Ok(token) => tokens.extend(token),
            Err(failure) => {
                let error_pos = input.current_token_start();
                diagnostics.emit(failure_to_diagnostic(failure, error_pos));
                if !input.is_empty() {
                    input.next_token();
                }
            }
        }
    }

    diagnostics.finish()?;
    Ok(tokens)
}
