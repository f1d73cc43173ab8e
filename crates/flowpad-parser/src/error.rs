//! Diagnostics reported while reading relaxed JSON.
//!
//! The lexer keeps going after a bad token, so one failed read can carry
//! several [`Diagnostic`]s. They travel together in a [`ParseError`].
//!
//! ```
//! # use flowpad_parser::error::{Diagnostic, ErrorCode};
//! # use flowpad_parser::Span;
//! let diag = Diagnostic::error("expected `,` or `]`")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(14..15), "unexpected `}`")
//!     .with_secondary_label(Span::new(0..1), "array opened here")
//!     .with_help("close the array with `]`");
//!
//! assert_eq!(diag.to_string(), "error[E100]: expected `,` or `]`");
//! ```

use std::fmt;

use crate::span::Span;

macro_rules! error_codes {
    ($($(#[$doc:meta])* $code:ident => $description:literal,)+) => {
        /// Stable identifier of a diagnostic. `E0xx` come from the lexer,
        /// `E1xx` from the parser.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $($(#[$doc])* $code,)+
        }

        impl ErrorCode {
            /// The code as written in reports, e.g. `"E001"`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$code => stringify!($code),)+
                }
            }

            /// Short lowercase summary used as the default label text.
            pub fn description(&self) -> &'static str {
                match self {
                    $(Self::$code => $description,)+
                }
            }
        }
    };
}

error_codes! {
    /// A quote was opened but the line or input ended first.
    E001 => "unterminated string literal",
    E002 => "unexpected character",
    /// Anything other than `\n \r \t \b \f \v \0 \\ \/ \' \"`, `\xHH`,
    /// `\uHHHH` or an escaped line break.
    E003 => "invalid escape sequence",
    /// `\u` not followed by four hex digits.
    E004 => "invalid unicode escape",
    /// Lone or mismatched surrogate.
    E005 => "invalid unicode codepoint",
    E006 => "unterminated block comment",
    /// Literal outside the finite `f64` range.
    E007 => "number out of range",
    E100 => "unexpected token",
    /// Input ended before the value did.
    E101 => "incomplete input",
    /// `NaN`, `Infinity` or a bare word other than `true`, `false`, `null`.
    E102 => "unsupported literal",
    E103 => "trailing content",
    E104 => "nesting too deep",
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text attached to a byte range of the input.
///
/// The primary label marks the problem itself. Secondary labels point at
/// related places, such as the bracket that opened an unclosed array.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    span: Span,
    message: String,
    primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            primary: false,
            ..Self::primary(span, message)
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }
}

/// One error found in the input, built up with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn with_code(self, code: ErrorCode) -> Self {
        Self {
            code: Some(code),
            ..self
        }
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..self
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Labels in the order they were added.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Where the problem is, if any label says so.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find_map(|label| label.is_primary().then_some(label.span()))
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

/// Renders as `error[E001]: message`, without the code when there is none.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "error[{code}]: {}", self.message),
            None => write!(f, "error: {}", self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// A failed read, carrying every diagnostic found along the way.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.diagnostics.split_first() else {
            return Ok(());
        };
        write!(f, "{first}")?;
        if !rest.is_empty() {
            write!(f, " (+{} more)", rest.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}

/// Gathers diagnostics during a pass; the pass fails if there are any.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn finish(self) -> Result<(), ParseError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(ParseError::new(self.diagnostics))
        }
    }
}
